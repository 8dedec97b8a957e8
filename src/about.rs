pub const APP_NAME: &str = "USDConvert";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LICENSE: &str = "MIT";
pub const AUTHORS: &str = "Binyamin Green https://binyam.in";

/// Lines shown by `usdconvert about` and the TUI about popup.
pub fn about_lines() -> Vec<String> {
    vec![
        format!("{} {}", APP_NAME, VERSION),
        "Convert US dollars into other currencies".to_string(),
        format!("License: {}", LICENSE),
        format!("Authors: {}", AUTHORS),
    ]
}
