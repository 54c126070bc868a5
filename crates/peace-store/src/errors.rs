#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {source}")]
    Sqlite {
        #[from]
        source: rusqlite::Error,
    },

    #[error("IO error opening database: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("repository not found: {path}")]
    RepositoryNotFound { path: String },

    #[error("session not found: {id}")]
    SessionNotFound { id: i64 },

    #[error("orphan record not found: {id}")]
    OrphanNotFound { id: i64 },
}
