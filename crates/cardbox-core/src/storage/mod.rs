mod config;
pub mod deck;

pub use config::{Config, DatePrecision, DeckConfig, ReviewConfig, SavePolicy};
pub use deck::DeckStore;

use std::path::PathBuf;

/// Returns `~/.config/cardbox[-dev]/` based on CARDBOX_ENV.
///
/// Set CARDBOX_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("CARDBOX_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("cardbox-dev")
    } else {
        base_dir.join("cardbox")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
