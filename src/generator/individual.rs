//! Per-node export: one complete configuration file for every node.

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde_yaml::Value;

use super::merge::sequence_entry;
use super::remark::{make_names_unique, safe_file_stem};
use super::{group_names, root_mapping};
use crate::error::Result;
use crate::generator::ClashProxy;
use crate::models::{Proxy, BUILTIN_POLICIES};
use crate::utils::file::{file_exists, file_write};
use crate::utils::yaml::{render_document, string_items};

/// A copy of `template` routing every group through `node` alone.
///
/// Groups keep only their built-in policies followed by the node name;
/// `rules` is moved to the end of the document. A node named like a group
/// or a built-in policy gets an `_n` suffix.
pub fn build_single_node_document(template: &Value, node: &Proxy) -> Result<Value> {
    let mut doc = template.clone();
    let root = root_mapping(&mut doc)?;

    // The node must not share a name with any group it is listed in
    let mut node = node.clone();
    make_names_unique(std::iter::once(&mut node), group_names(root));

    let entry = ClashProxy::from(&node).to_yaml_value()?;
    *sequence_entry(root, "proxies")? = vec![entry];

    for group in sequence_entry(root, "proxy-groups")?.iter_mut() {
        let group = match group.as_mapping_mut() {
            Some(group) => group,
            None => continue,
        };
        if let Some(Value::Sequence(members)) = group.get_mut("proxies") {
            let mut kept: Vec<Value> = string_items(members)
                .filter(|p| BUILTIN_POLICIES.contains(p))
                .map(Value::from)
                .collect();
            kept.push(Value::from(node.remark.as_str()));
            *members = kept;
        }
    }

    if let Some(rules) = root.shift_remove("rules") {
        root.insert("rules".into(), rules);
    }

    Ok(doc)
}

fn unique_output_path(output_dir: &Path, stem: &str) -> PathBuf {
    let mut path = output_dir.join(format!("{}.yaml", stem));
    let mut counter = 1;
    while file_exists(&path) {
        path = output_dir.join(format!("{}_{}.yaml", stem, counter));
        counter += 1;
    }
    path
}

/// Write one configuration per node into `output_dir`, named after the
/// node. Existing files are never overwritten.
///
/// Returns the written paths in node order.
pub fn generate_individual_yaml_files(
    proxies: &[Proxy],
    output_dir: &Path,
    template: &Value,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut generated = Vec::with_capacity(proxies.len());
    for node in proxies {
        let doc = build_single_node_document(template, node)?;
        let stem = safe_file_stem(&node.remark, generated.len() + 1);
        let path = unique_output_path(output_dir, &stem);
        debug!("Writing node '{}' to {}", node.remark, path.display());
        file_write(&path, &render_document(&doc)?)?;
        generated.push(path);
    }

    info!(
        "Generated {} configuration files in {}",
        generated.len(),
        output_dir.display()
    );
    Ok(generated)
}
