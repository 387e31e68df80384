use std::collections::HashSet;
use std::fs;

use serde_yaml::Value;
use submerge::generator::{
    apply_group_layout, apply_overrides, generate_individual_yaml_files, TemplateOverrides,
};
use submerge::models::{GroupLayout, SpeedTestGroup};
use submerge::parser::{parse_group_input, Fetch};
use submerge::settings::Settings;
use submerge::utils::base64::base64_encode;
use submerge::utils::yaml::{parse_document, render_document};
use submerge::{Result, SubmergeError};

const TEMPLATE: &str = r#"
mixed-port: 7890
dns:
  enable: false
proxies: []
proxy-groups:
  - name: 🚀 PROXY
    type: select
    proxies: [DIRECT]
  - name: ♻️ Auto
    type: url-test
    url: http://www.gstatic.com/generate_204
    interval: 300
    proxies: []
  - name: 🎯 Direct
    type: select
    proxies: [DIRECT, REJECT, PASS, 🚀 PROXY]
rules:
  - GEOIP,CN,🎯 Direct
  - MATCH,🚀 PROXY
"#;

/// Serves canned subscription bodies
struct StaticFetcher;

impl Fetch for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        match url {
            "https://sub.example.com/hk" => Ok(base64_encode(
                "trojan://pw@hk1.example.com:443#HK\ntrojan://pw@hk2.example.com:443#HK\n",
            )),
            _ => Err(SubmergeError::Fetch {
                url: url.to_string(),
                reason: "HTTP error: 404 Not Found".to_string(),
            }),
        }
    }
}

fn names(seq: &Value) -> Vec<String> {
    seq.as_sequence()
        .unwrap()
        .iter()
        .map(|v| match v.get("name") {
            Some(name) => name.as_str().unwrap().to_string(),
            None => v.as_str().unwrap().to_string(),
        })
        .collect()
}

#[test]
fn test_build_grouped_configuration() {
    let settings = Settings::load_from_content(
        r#"
[groups]
test_interval = 600
"#,
    )
    .unwrap();

    let hk = parse_group_input("https://sub.example.com/hk", &StaticFetcher, false).unwrap();
    let jp = parse_group_input(
        "trojan://pw@jp.example.com:443#JP\nssr://skipped\n",
        &StaticFetcher,
        false,
    )
    .unwrap();
    let manual = parse_group_input("trojan://pw@x.example.com:443#HK", &StaticFetcher, false).unwrap();

    let mut layout = GroupLayout {
        groups: vec![
            SpeedTestGroup::new("🇭🇰 HK", hk),
            SpeedTestGroup::new("🇯🇵 JP", jp),
            SpeedTestGroup::new("🇺🇸 US", Vec::new()),
        ],
        manual,
    };

    let mut doc = parse_document(TEMPLATE).unwrap();
    apply_overrides(
        &mut doc,
        &TemplateOverrides {
            dns: Some("enable: true\nipv6: false\n".to_string()),
            rules: None,
        },
    )
    .unwrap();
    apply_group_layout(&mut doc, &mut layout, &settings).unwrap();

    let node_names = names(&doc["proxies"]);
    assert_eq!(node_names, vec!["HK", "HK_1", "JP", "HK_2"]);
    let unique: HashSet<&String> = node_names.iter().collect();
    assert_eq!(unique.len(), node_names.len());

    let groups = &doc["proxy-groups"];
    assert_eq!(
        names(groups),
        vec!["🇭🇰 HK", "🇯🇵 JP", "🚀 PROXY", "🎯 Direct"]
    );
    assert_eq!(groups[0]["interval"], 600);
    assert_eq!(names(&groups[0]["proxies"]), vec!["HK", "HK_1"]);
    assert_eq!(
        names(&groups[2]["proxies"]),
        vec!["DIRECT", "🇭🇰 HK", "🇯🇵 JP", "HK_2"]
    );

    assert_eq!(doc["dns"]["enable"], true);
    let rendered = render_document(&doc).unwrap();
    assert!(rendered.contains("\n\nrules:\n"));
}

#[test]
fn test_unreachable_group_subscription() {
    let err = parse_group_input("https://sub.example.com/missing", &StaticFetcher, false)
        .unwrap_err();
    assert!(err.to_string().contains("sub.example.com/missing"));

    let nodes = parse_group_input(
        "https://sub.example.com/missing\ntrojan://pw@a.example.com:443#A",
        &StaticFetcher,
        true,
    )
    .unwrap();
    assert_eq!(nodes.len(), 1);
}

#[test]
fn test_split_into_files() {
    let dir = tempfile::tempdir().unwrap();
    let nodes = parse_group_input(
        "https://sub.example.com/hk\ntrojan://pw@jp.example.com:443#JP",
        &StaticFetcher,
        false,
    )
    .unwrap();

    let mut template = parse_document(TEMPLATE).unwrap();
    apply_overrides(
        &mut template,
        &TemplateOverrides {
            dns: None,
            rules: Some("- MATCH,DIRECT\n".to_string()),
        },
    )
    .unwrap();

    let paths = generate_individual_yaml_files(&nodes, dir.path(), &template).unwrap();
    let files: Vec<String> = paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["HK.yaml", "HK_1.yaml", "JP.yaml"]);

    let doc = parse_document(&fs::read_to_string(&paths[2]).unwrap()).unwrap();
    assert_eq!(names(&doc["proxies"]), vec!["JP"]);
    let groups = &doc["proxy-groups"];
    assert_eq!(names(&groups[0]["proxies"]), vec!["DIRECT", "JP"]);
    assert_eq!(names(&groups[1]["proxies"]), vec!["JP"]);
    assert_eq!(
        names(&groups[2]["proxies"]),
        vec!["DIRECT", "REJECT", "PASS", "JP"]
    );
    assert_eq!(names(&doc["rules"]), vec!["MATCH,DIRECT"]);
}
