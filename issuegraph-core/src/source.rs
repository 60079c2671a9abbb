//! Issue sources
//!
//! A source answers a search query with the issues to render. The server holds
//! one behind `Arc<dyn IssueSource>`, chosen from `[data]` config:
//! - `demo` = the fixed eight-issue dataset, whatever the query
//! - `file` = a JSON array of issues loaded once at startup, whatever the query

use crate::config::DataConfig;
use crate::error::IssueGraphError;
use crate::models::{Issue, IssueType, Link};
use std::path::{Path, PathBuf};

pub trait IssueSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Issues matching `query`. Callers only invoke this with a non-empty query.
    fn search(&self, query: &str) -> Result<Vec<Issue>, IssueGraphError>;
}

/// The fixed demonstration dataset.
///
/// Both links are stored on PROJ-123, including ITEM-432 -> ITEM-212.
pub fn demo_issues() -> Vec<Issue> {
    let mut issues = vec![
        Issue::new("PROJ-123", "Amazing issue").with_tags(["blah"]),
        Issue::new("PROJ-456", "something else"),
        Issue::new("ITEM-789", "different project"),
        Issue::new("ITEM-111", "different project").with_type(IssueType::Task),
        Issue::new("ITEM-432", "different project")
            .with_type(IssueType::Task)
            .with_tags(["blah"]),
        Issue::new("ITEM-212", "different project")
            .with_type(IssueType::Bug)
            .with_tags(["stuff"]),
        Issue::new("WORK-212", "doing work").with_type(IssueType::Story),
        Issue::new("WORK-454", "doing more work")
            .with_type(IssueType::Story)
            .with_tags(["blah", "stuff"]),
    ];

    let first = &mut issues[0];
    first.push_link(Link::new("Relates to...", "PROJ-123", "ITEM-789"));
    first.push_link(Link::new("Relates to...", "ITEM-432", "ITEM-212"));

    issues
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DemoSource;

impl IssueSource for DemoSource {
    fn name(&self) -> &str {
        "demo"
    }

    fn search(&self, query: &str) -> Result<Vec<Issue>, IssueGraphError> {
        tracing::debug!(query, "Serving demo dataset");
        Ok(demo_issues())
    }
}

/// Issues read from a JSON file (an array of issue objects).
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    issues: Vec<Issue>,
}

impl JsonFileSource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, IssueGraphError> {
        let path = path.as_ref().to_path_buf();
        let raw = std::fs::read_to_string(&path)?;
        let issues: Vec<Issue> = serde_json::from_str(&raw)?;
        tracing::info!("Loaded {} issues from {}", issues.len(), path.display());
        Ok(Self { path, issues })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IssueSource for JsonFileSource {
    fn name(&self) -> &str {
        "file"
    }

    fn search(&self, query: &str) -> Result<Vec<Issue>, IssueGraphError> {
        tracing::debug!(query, path = %self.path.display(), "Serving file dataset");
        Ok(self.issues.clone())
    }
}

/// Build the source named by `[data] source`.
pub fn source_from_config(config: &DataConfig) -> Result<Box<dyn IssueSource>, IssueGraphError> {
    match config.source.as_str() {
        "demo" => Ok(Box::new(DemoSource)),
        "file" => {
            let path = config.path.as_deref().ok_or_else(|| {
                IssueGraphError::Source("data.path is required when data.source = \"file\"".to_string())
            })?;
            Ok(Box::new(JsonFileSource::load(path)?))
        }
        other => Err(IssueGraphError::Source(format!(
            "Unknown data source '{}' (expected \"demo\" or \"file\")",
            other
        ))),
    }
}
