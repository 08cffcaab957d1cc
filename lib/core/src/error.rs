use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Not enough products left after filtering: {remaining} remaining, at least 2 required")]
    InsufficientCandidates { remaining: usize },

    /// The reference row was lost while building the similarity index.
    #[error("Reference product {0} has no row in the similarity index")]
    ReferenceNotFound(String),

    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    #[error("Invalid skin type: {0}")]
    InvalidSkinType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// True for failures caused by the request rather than by the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::ProductNotFound(_) | Error::InsufficientCandidates { .. } | Error::InvalidSkinType(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
