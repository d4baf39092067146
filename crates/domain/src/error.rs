use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("unknown pitch name: {0}")]
    UnknownPitchName(String),
    #[error("{catalog} index {index} out of range")]
    UnknownCatalogIndex { catalog: &'static str, index: usize },
    #[error("no {0} enabled")]
    EmptyEnabledSet(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl DomainError {
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    pub fn unknown_index(catalog: &'static str, index: usize) -> Self {
        Self::UnknownCatalogIndex { catalog, index }
    }
}
