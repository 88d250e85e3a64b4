//! Demo error type

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("Store failed to load: {0}")]
    Load(String),
}
