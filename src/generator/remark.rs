//! Remark processing utilities
//!
//! Node names double as references inside proxy groups, so every name in a
//! generated document has to be unique.

use std::collections::HashSet;

use log::debug;

use crate::models::{Proxy, BUILTIN_POLICIES};

/// Renames nodes so that no two share a name and none collides with a
/// reserved name. Built-in policies are always reserved.
///
/// A taken name `X` becomes `X_1`, `X_2`, ... (first free counter). Nodes
/// are processed in order, so the first occurrence keeps its name.
pub fn make_names_unique<'a, I, R, S>(nodes: I, reserved: R)
where
    I: IntoIterator<Item = &'a mut Proxy>,
    R: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut taken: HashSet<String> = reserved.into_iter().map(Into::into).collect();
    taken.extend(BUILTIN_POLICIES.iter().map(|s| s.to_string()));

    for node in nodes {
        let unique = unique_name(&node.remark, &taken);
        if unique != node.remark {
            debug!("Renaming duplicate node '{}' to '{}'", node.remark, unique);
            node.remark = unique;
        }
        taken.insert(node.remark.clone());
    }
}

/// `name` itself when free, otherwise `name_n` with the first free `n >= 1`
pub fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    let mut counter = 1;
    let mut candidate = format!("{}_{}", name, counter);
    while taken.contains(&candidate) {
        counter += 1;
        candidate = format!("{}_{}", name, counter);
    }
    candidate
}

/// File stem derived from a node name: alphanumerics, spaces, `-` and `_`
/// are kept, spaces become underscores. Falls back to `proxy_{index}`.
pub fn safe_file_stem(name: &str, index: usize) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let stem = kept.trim().replace(' ', "_");
    if stem.is_empty() {
        format!("proxy_{}", index)
    } else {
        stem
    }
}
