pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("schematic payload JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid schematic payload ({kind:?}): {message}")]
    InvalidPayload {
        kind: crate::model::ItemKind,
        message: String,
    },
}
