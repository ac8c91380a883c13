#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("converting circular structure to JSON")]
    CircularStructure,

    #[error("invalid options: {reason}")]
    Options { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
