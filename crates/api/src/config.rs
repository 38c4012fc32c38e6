use std::path::PathBuf;

use agrisensa_core::leaf_color::{VegetationBand, DEFAULT_VEGETATION_BAND};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding the JSON model artifacts.
    pub model_dir: PathBuf,
    /// CSV dataset used by the yield planner.
    pub dataset_path: PathBuf,
    /// Directory for uploaded documents.
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// HSV region treated as leaf tissue.
    pub vegetation_band: VegetationBand,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `5000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `MODEL_DIR`            | `models`                   |
    /// | `DATASET_PATH`         | `EDA_500.csv`              |
    /// | `UPLOAD_DIR`           | `uploads/pdfs`             |
    /// | `MAX_UPLOAD_BYTES`     | `16777216`                 |
    /// | `LEAF_HUE_MIN`         | `30`                       |
    /// | `LEAF_HUE_MAX`         | `90`                       |
    /// | `LEAF_MIN_SATURATION`  | `40`                       |
    /// | `LEAF_MIN_VALUE`       | `40`                       |
    ///
    /// # Panics
    ///
    /// Panics on unparsable values or an impossible vegetation band.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_parse("PORT", 5000);

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_parse("REQUEST_TIMEOUT_SECS", 30);

        let model_dir = env_path("MODEL_DIR", "models");
        let dataset_path = env_path("DATASET_PATH", "EDA_500.csv");
        let upload_dir = env_path("UPLOAD_DIR", "uploads/pdfs");
        let max_upload_bytes: usize = env_parse("MAX_UPLOAD_BYTES", 16 * 1024 * 1024);

        let vegetation_band = VegetationBand {
            hue_min: env_parse("LEAF_HUE_MIN", DEFAULT_VEGETATION_BAND.hue_min),
            hue_max: env_parse("LEAF_HUE_MAX", DEFAULT_VEGETATION_BAND.hue_max),
            min_saturation: env_parse("LEAF_MIN_SATURATION", DEFAULT_VEGETATION_BAND.min_saturation),
            min_value: env_parse("LEAF_MIN_VALUE", DEFAULT_VEGETATION_BAND.min_value),
        };
        if let Err(e) = vegetation_band.validate() {
            panic!("Invalid LEAF_* configuration: {e}");
        }

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            model_dir,
            dataset_path,
            upload_dir,
            max_upload_bytes,
            vegetation_band,
            jwt,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be a valid {}: {e}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key).unwrap_or_else(|_| default.into()).into()
}
