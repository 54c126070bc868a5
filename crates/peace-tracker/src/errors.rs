#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("tracker credentials are not configured")]
    NotConfigured,

    #[error("HTTP request to tracker failed: {source}")]
    Request {
        #[from]
        source: reqwest::Error,
    },

    #[error("failed to build tracker request URL: {message}")]
    InvalidUrl { message: String },
}
