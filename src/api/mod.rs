pub mod rates_client;

pub use rates_client::{RatesClient, RatesClientTrait};
