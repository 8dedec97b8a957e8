// Re-export model modules
mod conversion;
mod rates;

pub use conversion::*;
pub use rates::*;
