use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feed has no \"profiles\" array")]
    MissingProfiles,

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0}")]
    UnknownDirection(String),

    #[error("unknown filter toggle: {0}")]
    UnknownToggle(String),

    #[error("unknown layout: {0}")]
    UnknownLayout(String),
}
