pub mod settings;

pub use settings::{
    env_presence, AppConfig, ConfigError, DEFAULT_CONTRACTS_DIR, DEFAULT_MAX_UPLOAD_BYTES,
    REPORTED_ENV_VARS, REQUIRED_ENV_VARS,
};
