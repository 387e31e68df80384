//! Append merge: add nodes to an existing Clash configuration, keeping
//! everything the template already holds.

use std::path::{Path, PathBuf};

use log::info;
use serde_yaml::{Mapping, Value};

use super::remark::make_names_unique;
use super::{group_names, nodes_to_values, root_mapping};
use crate::error::{Result, SubmergeError};
use crate::models::{Proxy, ProxyGroupType};
use crate::utils::file::file_write;
use crate::utils::yaml::{get_str, load_template, render_document, type_name};

/// Which existing groups receive the new node names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Add names to every url-test, fallback and load-balance group
    pub add_to_speedtest: bool,
    /// Add names to every select group
    pub add_to_manual: bool,
}

/// Returns the sequence stored under `key`, creating an empty one when the
/// key is missing or null.
pub(crate) fn sequence_entry<'a>(root: &'a mut Mapping, key: &str) -> Result<&'a mut Vec<Value>> {
    let entry = root
        .entry(key.into())
        .or_insert(Value::Sequence(Vec::new()));
    if entry.is_null() {
        *entry = Value::Sequence(Vec::new());
    }
    match entry {
        Value::Sequence(seq) => Ok(seq),
        other => Err(SubmergeError::InvalidSection {
            key: key.to_string(),
            found: type_name(other),
        }),
    }
}

/// Appends `proxies` to the document's `proxies` section and, depending on
/// `options`, adds their names to the matching proxy groups.
///
/// Nodes are renamed in place where their name is already used in the
/// document.
pub fn merge_proxies(doc: &mut Value, proxies: &mut [Proxy], options: MergeOptions) -> Result<()> {
    let root = root_mapping(doc)?;

    let mut reserved = group_names(root);
    {
        let section = sequence_entry(root, "proxies")?;
        reserved.extend(
            section
                .iter()
                .filter_map(Value::as_mapping)
                .filter_map(|p| get_str(p, "name"))
                .map(str::to_string),
        );
    }
    make_names_unique(proxies.iter_mut(), reserved);

    let values = nodes_to_values(proxies)?;
    sequence_entry(root, "proxies")?.extend(values);

    if !(options.add_to_speedtest || options.add_to_manual) {
        return Ok(());
    }

    let groups = match root.get_mut("proxy-groups") {
        None | Some(Value::Null) => return Ok(()),
        Some(Value::Sequence(groups)) => groups,
        Some(other) => {
            return Err(SubmergeError::InvalidSection {
                key: "proxy-groups".to_string(),
                found: type_name(other),
            })
        }
    };
    let names: Vec<Value> = proxies.iter().map(|p| Value::from(p.remark.as_str())).collect();
    for group in groups.iter_mut() {
        let group = match group.as_mapping_mut() {
            Some(group) => group,
            None => continue,
        };
        let group_type = ProxyGroupType::from_type_str(get_str(group, "type").unwrap_or(""));
        let wanted = (options.add_to_speedtest && group_type.is_speed_test())
            || (options.add_to_manual && group_type == ProxyGroupType::Select);
        if !wanted {
            continue;
        }
        if let Some(Value::Sequence(members)) = group.get_mut("proxies") {
            for name in &names {
                if !members.contains(name) {
                    members.push(name.clone());
                }
            }
        }
    }

    Ok(())
}

/// `<stem>_merged<ext>` next to the template, `.yaml` when it has no extension
pub fn default_output_path(template_path: &Path) -> PathBuf {
    let stem = template_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    let ext = template_path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "yaml".to_string());
    template_path.with_file_name(format!("{}_merged.{}", stem, ext))
}

/// Merge proxies into a Clash configuration file and write the result.
///
/// Returns the path of the written file: `output_path`, or
/// [`default_output_path`] when none is given.
pub fn update_yaml(
    template_path: &Path,
    proxies: &mut [Proxy],
    options: MergeOptions,
    output_path: Option<&Path>,
) -> Result<PathBuf> {
    let mut doc = load_template(template_path)?;
    merge_proxies(&mut doc, proxies, options)?;

    let output = output_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(template_path));
    file_write(&output, &render_document(&doc)?)?;
    info!(
        "Merged {} nodes into {}",
        proxies.len(),
        output.display()
    );
    Ok(output)
}
