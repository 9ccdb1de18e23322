use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

/// Environment-driven configuration, resolved once at startup.
pub struct Config {
    pub port: u16,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RANCHBOOK_PORT", "3000"),
            data_dir: data_dir(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    env::var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// `RANCHBOOK_DATA_DIR`, defaulting to a `RanchBook` folder under the
/// user's Documents (falling back to home, then the working directory).
fn data_dir() -> PathBuf {
    if let Ok(dir) = env::var("RANCHBOOK_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let default = dirs::document_dir()
        .or_else(dirs::home_dir)
        .map(|base| base.join("RanchBook"))
        .unwrap_or_else(|| PathBuf::from("ranchbook-data"));
    info!(
        "RANCHBOOK_DATA_DIR not set, using default: {}",
        default.display()
    );
    default
}
