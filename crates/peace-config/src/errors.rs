#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file at '{path}': {source}")]
    ParseError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error reading config: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to resolve config directory: {message}")]
    PathResolution { message: String },
}
