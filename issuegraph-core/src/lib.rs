pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod source;

pub use config::IssueGraphConfig;
pub use error::{GraphError, IssueGraphError};
pub use graph::render_dot;
pub use models::{Issue, IssueType, Link};
pub use source::{DemoSource, IssueSource, JsonFileSource};
