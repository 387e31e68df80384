pub mod groups;
pub mod individual;
pub mod merge;
pub mod remark;
pub mod yaml;

use serde_yaml::{Mapping, Value};

use crate::error::{Result, SubmergeError};
use crate::models::Proxy;
use crate::utils::yaml::{get_str, type_name};

pub use groups::{apply_group_layout, apply_overrides, TemplateOverrides};
pub use individual::generate_individual_yaml_files;
pub use merge::{merge_proxies, update_yaml, MergeOptions};
pub use yaml::ClashProxy;

/// The document root as a mapping; a null document becomes an empty one
pub(crate) fn root_mapping(doc: &mut Value) -> Result<&mut Mapping> {
    if doc.is_null() {
        *doc = Value::Mapping(Mapping::new());
    }
    match doc {
        Value::Mapping(map) => Ok(map),
        other => Err(SubmergeError::Template(format!(
            "expected a mapping at the document root, got {}",
            type_name(other)
        ))),
    }
}

/// Names of all proxy groups declared in the document
pub(crate) fn group_names(root: &Mapping) -> Vec<String> {
    root.get("proxy-groups")
        .and_then(Value::as_sequence)
        .map(|groups| {
            groups
                .iter()
                .filter_map(Value::as_mapping)
                .filter_map(|g| get_str(g, "name"))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Clash `proxies` entries for a list of nodes
pub fn nodes_to_values(nodes: &[Proxy]) -> Result<Vec<Value>> {
    nodes
        .iter()
        .map(|node| Ok(ClashProxy::from(node).to_yaml_value()?))
        .collect()
}
