//! Grouped layout: rebuild the node list and proxy groups of a template
//! from speed-test groups and individually selectable nodes.

use std::collections::HashSet;

use log::{debug, info};
use serde_yaml::{Mapping, Value};

use super::merge::sequence_entry;
use super::remark::{make_names_unique, unique_name};
use super::{group_names, nodes_to_values, root_mapping};
use crate::error::{Result, SubmergeError};
use crate::models::{GroupLayout, ProxyGroupType, SpeedTestGroup};
use crate::settings::Settings;
use crate::utils::yaml::{get_str, string_items, type_name};

/// Entries of the main select group that survive a rebuild
const KEPT_POLICIES: [&str; 2] = ["DIRECT", "REJECT"];

/// User edits of template sections, as YAML snippets
#[derive(Debug, Clone, Default)]
pub struct TemplateOverrides {
    /// Body of the `dns` section
    pub dns: Option<String>,
    /// The `rules` list
    pub rules: Option<String>,
}

/// Replace the `dns` and `rules` sections with the non-empty snippets in
/// `overrides`.
pub fn apply_overrides(doc: &mut Value, overrides: &TemplateOverrides) -> Result<()> {
    let root = root_mapping(doc)?;

    if let Some(dns) = overrides.dns.as_deref().filter(|s| !s.trim().is_empty()) {
        let dns: Value = serde_yaml::from_str(dns)?;
        debug!("Replacing dns section");
        root.insert("dns".into(), dns);
    }

    if let Some(rules) = overrides.rules.as_deref().filter(|s| !s.trim().is_empty()) {
        let rules: Value = serde_yaml::from_str(rules)?;
        if !rules.is_sequence() {
            return Err(SubmergeError::InvalidSection {
                key: "rules".to_string(),
                found: type_name(&rules),
            });
        }
        debug!("Replacing rules section");
        root.insert("rules".into(), rules);
    }

    Ok(())
}

/// Template groups that survive the layout: neither the main group nor a
/// speed-test group
fn kept_group_names<'a>(
    root: &'a Mapping,
    main_name: &'a str,
) -> impl Iterator<Item = String> + 'a {
    root.get("proxy-groups")
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping)
        .filter(|g| {
            !ProxyGroupType::from_type_str(get_str(g, "type").unwrap_or("")).is_speed_test()
        })
        .filter_map(|g| get_str(g, "name"))
        .filter(move |name| *name != main_name)
        .map(str::to_string)
}

fn url_test_group(group: &SpeedTestGroup, settings: &Settings) -> Value {
    let mut map = Mapping::new();
    map.insert("name".into(), group.name.as_str().into());
    map.insert("type".into(), ProxyGroupType::URLTest.as_str().into());
    map.insert("url".into(), settings.test_url.as_str().into());
    map.insert("interval".into(), settings.test_interval.into());
    map.insert(
        "proxies".into(),
        Value::Sequence(
            group
                .proxies
                .iter()
                .map(|p| p.remark.as_str().into())
                .collect(),
        ),
    );
    Value::Mapping(map)
}

fn select_group(name: &str) -> Mapping {
    let mut map = Mapping::new();
    map.insert("name".into(), name.into());
    map.insert("type".into(), ProxyGroupType::Select.as_str().into());
    map.insert("proxies".into(), Value::Sequence(Vec::new()));
    map
}

/// Rebuild the document's `proxies` and `proxy-groups` from `layout`.
///
/// - `proxies` becomes every group's nodes followed by the manual nodes;
/// - each speed-test group with nodes becomes a `url-test` group;
/// - the main select group lists its `DIRECT`/`REJECT` entries, the
///   speed-test groups and the manual nodes;
/// - other template groups are kept, except url-test, fallback and
///   load-balance groups, which the generated ones replace.
///
/// Node names in `layout` are made unique in place first.
pub fn apply_group_layout(
    doc: &mut Value,
    layout: &mut GroupLayout,
    settings: &Settings,
) -> Result<()> {
    let root = root_mapping(doc)?;
    let main_name = settings.main_group_name.as_str();

    // Speed-test groups must not shadow the main group, a kept template
    // group or each other
    let mut taken: HashSet<String> = kept_group_names(root, main_name).collect();
    taken.insert(main_name.to_string());
    for group in layout.groups.iter_mut() {
        let unique = unique_name(&group.name, &taken);
        if unique != group.name {
            debug!("Renaming speed-test group '{}' to '{}'", group.name, unique);
            group.name = unique;
        }
        taken.insert(group.name.clone());
    }

    let mut reserved = group_names(root);
    reserved.extend(layout.groups.iter().map(|g| g.name.clone()));
    reserved.push(main_name.to_string());
    make_names_unique(
        layout
            .groups
            .iter_mut()
            .flat_map(|g| g.proxies.iter_mut())
            .chain(layout.manual.iter_mut()),
        reserved,
    );

    let mut values = Vec::with_capacity(layout.node_count());
    for group in &layout.groups {
        values.extend(nodes_to_values(&group.proxies)?);
    }
    values.extend(nodes_to_values(&layout.manual)?);
    root.insert("proxies".into(), Value::Sequence(values));

    let mut main_group: Option<Mapping> = None;
    let mut other_groups = Vec::new();
    for group in sequence_entry(root, "proxy-groups")?.drain(..) {
        let map = match group {
            Value::Mapping(map) => map,
            _ => continue,
        };
        let group_type = ProxyGroupType::from_type_str(get_str(&map, "type").unwrap_or(""));
        let name = get_str(&map, "name").unwrap_or("");
        if name == main_name && group_type == ProxyGroupType::Select {
            if main_group.is_none() {
                main_group = Some(map);
            }
        } else if name != main_name && !group_type.is_speed_test() {
            other_groups.push(Value::Mapping(map));
        }
    }
    let mut main_group = main_group.unwrap_or_else(|| select_group(main_name));

    let speed_groups: Vec<&SpeedTestGroup> = layout
        .groups
        .iter()
        .filter(|g| !g.proxies.is_empty())
        .collect();

    let mut main_members: Vec<Value> = main_group
        .get("proxies")
        .and_then(Value::as_sequence)
        .map(|seq| {
            string_items(seq)
                .filter(|p| KEPT_POLICIES.contains(p))
                .map(Value::from)
                .collect()
        })
        .unwrap_or_default();
    main_members.extend(speed_groups.iter().map(|g| Value::from(g.name.as_str())));
    main_members.extend(layout.manual.iter().map(|p| Value::from(p.remark.as_str())));
    main_group.insert("proxies".into(), Value::Sequence(main_members));

    let mut final_groups: Vec<Value> = speed_groups
        .iter()
        .map(|g| url_test_group(g, settings))
        .collect();
    final_groups.push(Value::Mapping(main_group));
    final_groups.extend(other_groups);

    info!(
        "Laid out {} nodes in {} speed-test groups and {} manual nodes",
        layout.node_count(),
        layout.populated_groups(),
        layout.manual.len()
    );
    root.insert("proxy-groups".into(), Value::Sequence(final_groups));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Proxy;
    use crate::utils::yaml::parse_document;

    const TEMPLATE: &str = r#"
mixed-port: 7890
dns:
  enable: false
proxies:
  - {name: stale, type: ss, server: s, port: 1, cipher: aes-128-gcm, password: x}
proxy-groups:
  - name: Old Auto
    type: url-test
    url: http://example.com
    interval: 60
    proxies: [stale]
  - name: 🚀 PROXY
    type: select
    proxies: [Old Auto, stale, DIRECT, REJECT]
  - name: Streaming
    type: select
    proxies: [🚀 PROXY, DIRECT]
rules:
  - MATCH,🚀 PROXY
"#;

    fn node(name: &str, server: &str) -> Proxy {
        Proxy::trojan_construct(
            name.to_string(),
            server.to_string(),
            443,
            "pw".to_string(),
            None,
        )
    }

    fn strings(value: &Value) -> Vec<String> {
        value
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    fn layout() -> GroupLayout {
        GroupLayout {
            groups: vec![
                SpeedTestGroup::new("HK Auto", vec![node("HK", "a"), node("HK", "b")]),
                SpeedTestGroup::new("Empty", Vec::new()),
                SpeedTestGroup::new("JP Auto", vec![node("JP", "c")]),
            ],
            manual: vec![node("JP", "d"), node("Streaming", "e")],
        }
    }

    #[test]
    fn test_layout_rebuilds_groups() {
        let mut doc = parse_document(TEMPLATE).unwrap();
        let mut layout = layout();
        apply_group_layout(&mut doc, &mut layout, &Settings::default()).unwrap();

        let proxy_names: Vec<&str> = doc["proxies"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(proxy_names, vec!["HK", "HK_1", "JP", "JP_1", "Streaming_1"]);

        let groups = doc["proxy-groups"].as_sequence().unwrap();
        let group_names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(group_names, vec!["HK Auto", "JP Auto", "🚀 PROXY", "Streaming"]);

        assert_eq!(groups[0]["type"], "url-test");
        assert_eq!(groups[0]["url"], "http://www.gstatic.com/generate_204");
        assert_eq!(groups[0]["interval"], 900);
        assert_eq!(strings(&groups[0]["proxies"]), vec!["HK", "HK_1"]);
        assert_eq!(
            strings(&groups[2]["proxies"]),
            vec!["DIRECT", "REJECT", "HK Auto", "JP Auto", "JP_1", "Streaming_1"]
        );
        assert_eq!(strings(&groups[3]["proxies"]), vec!["🚀 PROXY", "DIRECT"]);
    }

    #[test]
    fn test_layout_renames_clashing_groups() {
        let mut doc = parse_document(TEMPLATE).unwrap();
        let mut layout = GroupLayout {
            groups: vec![
                SpeedTestGroup::new("Streaming", vec![node("S", "a")]),
                SpeedTestGroup::new("HK", vec![node("H1", "b")]),
                SpeedTestGroup::new("HK", vec![node("H2", "c")]),
                SpeedTestGroup::new("🚀 PROXY", vec![node("P", "d")]),
                SpeedTestGroup::new("Old Auto", vec![node("O", "e")]),
            ],
            manual: vec![node("HK", "f")],
        };
        apply_group_layout(&mut doc, &mut layout, &Settings::default()).unwrap();

        let groups = doc["proxy-groups"].as_sequence().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["Streaming_1", "HK", "HK_1", "🚀 PROXY_1", "Old Auto", "🚀 PROXY", "Streaming"]
        );
        assert_eq!(
            strings(&groups[5]["proxies"]),
            vec![
                "DIRECT",
                "REJECT",
                "Streaming_1",
                "HK",
                "HK_1",
                "🚀 PROXY_1",
                "Old Auto",
                "HK_2"
            ]
        );
        assert_eq!(doc["proxies"][5]["name"], "HK_2");
    }

    #[test]
    fn test_layout_drops_non_select_group_named_like_main() {
        let template = r#"
proxy-groups:
  - name: 🚀 PROXY
    type: fallback
    proxies: [DIRECT]
  - name: 🚀 PROXY
    type: relay
    proxies: [DIRECT]
  - name: Media
    type: select
    proxies: [DIRECT]
"#;
        let mut doc = parse_document(template).unwrap();
        let mut layout = GroupLayout {
            groups: Vec::new(),
            manual: vec![node("A", "a")],
        };
        apply_group_layout(&mut doc, &mut layout, &Settings::default()).unwrap();

        let groups = doc["proxy-groups"].as_sequence().unwrap();
        let names: Vec<&str> = groups.iter().map(|g| g["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["🚀 PROXY", "Media"]);
        assert_eq!(groups[0]["type"], "select");
        assert_eq!(strings(&groups[0]["proxies"]), vec!["A"]);
    }

    #[test]
    fn test_layout_creates_main_group() {
        let mut doc = parse_document("rules: []\n").unwrap();
        let mut layout = GroupLayout {
            groups: vec![SpeedTestGroup::new("Auto", vec![node("A", "a")])],
            manual: Vec::new(),
        };
        let settings = Settings {
            main_group_name: "Proxy".to_string(),
            test_interval: 300,
            ..Settings::default()
        };
        apply_group_layout(&mut doc, &mut layout, &settings).unwrap();

        let groups = doc["proxy-groups"].as_sequence().unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0]["interval"], 300);
        assert_eq!(groups[1]["name"], "Proxy");
        assert_eq!(groups[1]["type"], "select");
        assert_eq!(strings(&groups[1]["proxies"]), vec!["Auto"]);
    }

    #[test]
    fn test_layout_without_nodes_clears_proxies() {
        let mut doc = parse_document(TEMPLATE).unwrap();
        apply_group_layout(&mut doc, &mut GroupLayout::default(), &Settings::default()).unwrap();
        assert!(doc["proxies"].as_sequence().unwrap().is_empty());
        let groups = doc["proxy-groups"].as_sequence().unwrap();
        assert_eq!(strings(&groups[0]["proxies"]), vec!["DIRECT", "REJECT"]);
    }

    #[test]
    fn test_overrides() {
        let mut doc = parse_document(TEMPLATE).unwrap();
        let overrides = TemplateOverrides {
            dns: Some("enable: true\nnameserver:\n  - 223.5.5.5\n".to_string()),
            rules: Some("- DOMAIN-SUFFIX,example.com,DIRECT\n- MATCH,🚀 PROXY\n".to_string()),
        };
        apply_overrides(&mut doc, &overrides).unwrap();
        assert_eq!(doc["dns"]["enable"], true);
        assert_eq!(doc["dns"]["nameserver"][0], "223.5.5.5");
        assert_eq!(doc["rules"].as_sequence().unwrap().len(), 2);

        let keys: Vec<&str> = doc
            .as_mapping()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["mixed-port", "dns", "proxies", "proxy-groups", "rules"]);
    }

    #[test]
    fn test_overrides_blank_and_invalid() {
        let mut doc = parse_document(TEMPLATE).unwrap();
        let blank = TemplateOverrides {
            dns: Some("   ".to_string()),
            rules: None,
        };
        apply_overrides(&mut doc, &blank).unwrap();
        assert_eq!(doc["dns"]["enable"], false);

        let bad = TemplateOverrides {
            dns: None,
            rules: Some("not: a list".to_string()),
        };
        assert!(matches!(
            apply_overrides(&mut doc, &bad),
            Err(SubmergeError::InvalidSection { .. })
        ));
    }
}
