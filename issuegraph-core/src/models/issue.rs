use serde::{Deserialize, Serialize};

use super::link::Link;

/// Classification of an issue. Drives the node icon in the rendered graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Epic,
    Spike,
    Story,
    Bug,
    Task,
    /// Unset, empty or unrecognized type.
    #[default]
    #[serde(other)]
    Other,
}

impl IssueType {
    /// Image path used for the node of an issue of this type.
    pub fn icon(&self) -> &'static str {
        match self {
            IssueType::Epic => "img/epic.png",
            IssueType::Spike => "img/spike.png",
            IssueType::Story => "img/story.png",
            IssueType::Bug => "img/bug.png",
            IssueType::Task => "img/task.png",
            IssueType::Other => "img/ball.png",
        }
    }
}

/// A work item. Owns its outgoing links; tags are plain labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "type", default)]
    pub issue_type: IssueType,
}

impl Issue {
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            links: Vec::new(),
            tags: Vec::new(),
            issue_type: IssueType::Other,
        }
    }

    pub fn with_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = issue_type;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Store a link on this issue. The link's endpoints need not include `self`.
    pub fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }
}
