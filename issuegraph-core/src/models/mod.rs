pub mod issue;
pub mod link;

pub use issue::{Issue, IssueType};
pub use link::Link;
