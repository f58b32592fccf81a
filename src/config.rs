use crate::error::CaraError;
use std::path::PathBuf;

pub const TOKEN_ENV_VAR: &str = "CARA_XTOKEN";
pub const DEFAULT_LOOKBACK_DAYS: u64 = 180;
pub const DEFAULT_PAGE_SIZE: u32 = 500;
pub const DEFAULT_IMAGE_FOLDER: &str = "images";
pub const DEFAULT_OUTPUT_PATH: &str = "index.html";

#[derive(Debug, Clone)]
pub struct Config {
    /// Value sent in the `x-token` header of every dashboard request.
    pub token: String,
    /// Days before today covered by the export window.
    pub lookback_days: u64,
    /// Entries requested in the single page fetched per run.
    pub page_size: u32,
    pub offset: u32,
    /// Folder holding `{id}.jpg` photos and `{id}.txt` failure markers.
    pub image_folder: PathBuf,
    /// Rendered report, overwritten on each run.
    pub output_path: PathBuf,
}

impl Config {
    /// Build the run configuration from the token, if one was supplied.
    /// An empty token counts as missing.
    pub fn new(token: Option<String>) -> Result<Self, CaraError> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(CaraError::MissingToken)?;
        Ok(Self {
            token,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
            offset: 0,
            image_folder: PathBuf::from(DEFAULT_IMAGE_FOLDER),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_constants() {
        let config = Config::new(Some("secret".into())).expect("config");
        assert_eq!(config.token, "secret");
        assert_eq!(config.lookback_days, 180);
        assert_eq!(config.page_size, 500);
        assert_eq!(config.offset, 0);
        assert_eq!(config.image_folder, PathBuf::from("images"));
        assert_eq!(config.output_path, PathBuf::from("index.html"));
    }

    #[test]
    fn missing_or_blank_token_is_rejected() {
        assert!(matches!(Config::new(None), Err(CaraError::MissingToken)));
        assert!(matches!(
            Config::new(Some("  ".into())),
            Err(CaraError::MissingToken)
        ));
    }
}
