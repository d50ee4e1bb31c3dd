//! Error Types for Car Sales

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SalesError>;

#[derive(Error, Debug)]
pub enum SalesError {
    #[error("Search error: {0}")]
    Search(String),

    #[error("Search service returned {status}: {body}")]
    SearchStatus { status: u16, body: String },

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
