#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("payload too short: {len} bytes, need at least {required}")]
    PayloadTooShort { len: usize, required: usize },

    #[error("invalid hex message: {reason}")]
    InvalidHexMessage { reason: String },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("protocol error: {reason}")]
    Protocol { reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
