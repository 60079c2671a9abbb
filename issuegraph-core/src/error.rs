use thiserror::Error;

/// Failures while rendering an issue collection to DOT text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Link '{link}' references issue {key}, which is not part of the rendered issues")]
    MissingEndpoint { link: String, key: String },

    #[error("Issue {0} appears more than once in the rendered issues")]
    DuplicateKey(String),
}

#[derive(Error, Debug)]
pub enum IssueGraphError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Source error: {0}")]
    Source(String),
}
