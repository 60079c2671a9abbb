use serde::{Deserialize, Serialize};

/// A named, directed relationship between two issues.
///
/// Endpoints are issue keys, not owned issues. They are resolved against the
/// rendered collection when the graph is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    pub left: String,
    pub right: String,
}

impl Link {
    pub fn new(
        name: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            left: left.into(),
            right: right.into(),
        }
    }
}
