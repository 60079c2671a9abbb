//! DOT rendering of issue collections
//!
//! Turns a slice of issues into Graphviz `digraph` text with three sections:
//! - Nodes = one declaration per issue, with label, tooltip and type icon
//! - Links = one directed edge per stored link
//! - Invisible links = one hidden undirected edge per pair of issues sharing a tag,
//!   which pulls same-tagged nodes together without drawing a connector

use crate::error::GraphError;
use crate::models::Issue;
use std::collections::HashMap;

const NODES_HEADER: &str = "/* Nodes */";
const LINKS_HEADER: &str = "/* Links */";
const INVIS_HEADER: &str =
    "/* Invisible Links (Used to pull nodes together without a visible link) */";

/// Graph-safe node identifier for an issue key. DOT identifiers cannot contain `-`.
pub fn node_id(key: &str) -> String {
    key.replace('-', "_")
}

/// Escape double quotes for use inside a quoted DOT attribute.
pub fn escape_label(text: &str) -> String {
    text.replace('"', r#"\""#)
}

/// Render issues as DOT text
///
/// # Arguments
/// * `issues` - Issues to render, in output order. May be empty.
///
/// # Returns
/// * `Ok(String)` - The full `digraph { ... }` text, without a trailing newline
/// * `Err(GraphError)` - A link endpoint is not among `issues`, or a key repeats
///
/// # Ordering
/// Nodes follow input order. Links follow input order, then each issue's stored
/// link order; the edge uses the link's own endpoints, not the issue it is stored on.
/// Invisible links are grouped by tag in order of first appearance, and within a
/// tag pair keys in order of first appearance.
pub fn render_dot(issues: &[Issue]) -> Result<String, GraphError> {
    // key -> node id
    let mut ids: HashMap<&str, String> = HashMap::with_capacity(issues.len());
    let mut node_lines = Vec::with_capacity(issues.len());

    for issue in issues {
        let id = node_id(&issue.key);
        node_lines.push(format!(
            "{}[label=\"{}\" title=\"{}\" image=\"{}\"]",
            id,
            issue.key,
            escape_label(&issue.summary),
            issue.issue_type.icon()
        ));
        if ids.insert(issue.key.as_str(), id).is_some() {
            return Err(GraphError::DuplicateKey(issue.key.clone()));
        }
    }

    let mut link_lines = Vec::new();
    for issue in issues {
        for link in &issue.links {
            let left = resolve(&ids, &link.name, &link.left)?;
            let right = resolve(&ids, &link.name, &link.right)?;
            link_lines.push(format!("{} -> {}[title=\"{}\"]", left, right, link.name));
        }
    }

    let mut invis_lines = Vec::new();
    for (tag, keys) in group_by_tag(issues) {
        for (i, left) in keys.iter().enumerate() {
            for right in &keys[i + 1..] {
                invis_lines.push(format!(
                    "{} -- {}[title=\"{}\" hidden=\"true\" style=\"invis\"]",
                    ids[left], ids[right], tag
                ));
            }
        }
    }

    Ok(format!(
        "digraph {{\n{}\n{}\n{}\n{}\n{}\n{}\n}}",
        NODES_HEADER,
        node_lines.join("\n"),
        LINKS_HEADER,
        link_lines.join("\n"),
        INVIS_HEADER,
        invis_lines.join("\n"),
    ))
}

fn resolve<'a>(
    ids: &'a HashMap<&str, String>,
    link: &str,
    key: &str,
) -> Result<&'a str, GraphError> {
    ids.get(key)
        .map(String::as_str)
        .ok_or_else(|| GraphError::MissingEndpoint {
            link: link.to_string(),
            key: key.to_string(),
        })
}

/// Tag -> keys carrying it, both in order of first appearance, keys deduplicated.
fn group_by_tag(issues: &[Issue]) -> Vec<(&str, Vec<&str>)> {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for issue in issues {
        for tag in &issue.tags {
            let slot = *index.entry(tag.as_str()).or_insert_with(|| {
                groups.push((tag.as_str(), Vec::new()));
                groups.len() - 1
            });
            let keys = &mut groups[slot].1;
            if !keys.contains(&issue.key.as_str()) {
                keys.push(issue.key.as_str());
            }
        }
    }

    groups
}
