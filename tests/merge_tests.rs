use std::collections::HashSet;
use std::fs;

use serde_yaml::Value;
use submerge::generator::{update_yaml, MergeOptions};
use submerge::parser::{convert_links_to_proxies, parse_subscription};
use submerge::utils::base64::base64_encode;
use submerge::utils::yaml::parse_document;

const TEMPLATE: &str = r#"
port: 7890
mode: rule
proxies:
  - name: HK 01
    type: ss
    server: old.example.com
    port: 8388
    cipher: aes-128-gcm
    password: secret
proxy-groups:
  - name: Auto
    type: url-test
    url: http://www.gstatic.com/generate_204
    interval: 300
    proxies: [HK 01]
  - name: Proxy
    type: select
    proxies: [Auto, HK 01, DIRECT]
rules:
  - DOMAIN-SUFFIX,local,DIRECT
  - MATCH,Proxy
"#;

fn vmess_link(json: &str) -> String {
    format!("vmess://{}", base64_encode(json))
}

fn synthetic_links() -> Vec<String> {
    vec![
        "trojan://pass@t1.example.com:443?sni=t1.example.com#HK%2001".to_string(),
        "vless://b831381d-6324-4d53-ad4f-8cda48b30811@v.example.com:443?security=tls&type=ws&path=%2Fws&host=cdn.example.com#HK%2001".to_string(),
        vmess_link(
            r#"{"v":"2","ps":"JP 01","add":"jp.example.com","port":"443","id":"b831381d-6324-4d53-ad4f-8cda48b30811","aid":"0","net":"ws","path":"/ray","tls":"tls"}"#,
        ),
        format!("ss://{}@s.example.com:8388#Auto", base64_encode("aes-256-gcm:pw")),
        "ssr://unsupported".to_string(),
        "trojan://pass@t2.example.com:443".to_string(),
    ]
}

fn proxy_names(doc: &Value) -> Vec<String> {
    doc["proxies"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect()
}

fn members(group: &Value) -> Vec<String> {
    group["proxies"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_merge_subscription_into_template() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("config.yaml");
    fs::write(&template, TEMPLATE).unwrap();

    let subscription = base64_encode(&synthetic_links().join("\n"));
    let links = parse_subscription(&subscription);
    assert_eq!(links.len(), 6);

    let mut proxies = convert_links_to_proxies(&links);
    assert_eq!(proxies.len(), 5);

    let options = MergeOptions {
        add_to_speedtest: true,
        add_to_manual: false,
    };
    let output = update_yaml(&template, &mut proxies, options, None).unwrap();
    assert_eq!(output, dir.path().join("config_merged.yaml"));

    let doc = parse_document(&fs::read_to_string(&output).unwrap()).unwrap();
    let names = proxy_names(&doc);
    assert_eq!(
        names,
        vec!["HK 01", "HK 01_1", "HK 01_2", "JP 01", "Auto_1", "Trojan_Node"]
    );
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len());

    assert_eq!(
        members(&doc["proxy-groups"][0]),
        vec!["HK 01", "HK 01_1", "HK 01_2", "JP 01", "Auto_1", "Trojan_Node"]
    );
    assert_eq!(members(&doc["proxy-groups"][1]), vec!["Auto", "HK 01", "DIRECT"]);

    // everything else in the template is preserved
    assert_eq!(doc["port"], 7890);
    assert_eq!(doc["rules"].as_sequence().unwrap().len(), 2);
    // the template file itself is not modified
    assert_eq!(fs::read_to_string(&template).unwrap(), TEMPLATE);
}

#[test]
fn test_merged_node_fields() {
    let dir = tempfile::tempdir().unwrap();
    let template = dir.path().join("base.yml");
    fs::write(&template, TEMPLATE).unwrap();
    let output = dir.path().join("out").join("merged.yml");

    let mut proxies = convert_links_to_proxies(synthetic_links());
    update_yaml(&template, &mut proxies, MergeOptions::default(), Some(output.as_path())).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    assert!(content.contains("\n\nproxies:\n"));
    assert!(content.contains("\n\nrules:\n"));

    let doc = parse_document(&content).unwrap();
    let vless = &doc["proxies"][2];
    assert_eq!(vless["type"], "vless");
    assert_eq!(vless["network"], "ws");
    assert_eq!(vless["tls"], true);
    assert_eq!(vless["servername"], "cdn.example.com");
    assert_eq!(vless["ws-opts"]["path"], "/ws");
    assert_eq!(vless["ws-opts"]["headers"]["Host"], "cdn.example.com");

    let vmess = &doc["proxies"][3];
    assert_eq!(vmess["type"], "vmess");
    assert_eq!(vmess["alterId"], 0);
    assert_eq!(vmess["cipher"], "auto");

    let ss = &doc["proxies"][4];
    assert_eq!(ss["type"], "ss");
    assert_eq!(ss["cipher"], "aes-256-gcm");
    assert_eq!(ss["password"], "pw");

    // no group flags: groups untouched
    assert_eq!(members(&doc["proxy-groups"][0]), vec!["HK 01"]);
}

#[test]
fn test_missing_template() {
    let dir = tempfile::tempdir().unwrap();
    let mut proxies = convert_links_to_proxies(synthetic_links());
    let err = update_yaml(
        &dir.path().join("absent.yaml"),
        &mut proxies,
        MergeOptions::default(),
        None,
    )
    .unwrap_err();
    assert!(err.to_string().contains("template file not found"));
}
