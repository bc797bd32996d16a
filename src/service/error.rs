use crate::source::error::SourceError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("SourceError: {0}")]
    SourceError(#[from] SourceError),

    #[error("StoreError: {0}")]
    StoreError(#[from] StoreError),

    #[error("TemplateError: {0}")]
    TemplateError(#[from] minijinja::Error),
}
