use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::models::{Proxy, ProxyType};
use crate::utils::url::get_url_arg;

fn is_empty_option_string(s: &Option<String>) -> bool {
    s.as_deref().map_or(true, str::is_empty)
}

/// REALITY parameters of a VLESS node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOpts {
    pub public_key: String,
    pub short_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsHeaders {
    #[serde(rename = "Host")]
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WsOpts {
    pub path: String,
    pub headers: WsHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct GrpcOpts {
    pub grpc_service_name: String,
}

/// One entry of the Clash `proxies` list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashProxy {
    pub name: String,
    #[serde(rename = "type")]
    pub proxy_type: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub uuid: Option<String>,
    #[serde(rename = "alterId", skip_serializing_if = "Option::is_none")]
    pub alter_id: Option<u16>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub cipher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub plugin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_opts: Option<Mapping>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls: Option<bool>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub encryption: Option<String>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servername: Option<String>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub sni: Option<String>,
    #[serde(skip_serializing_if = "is_empty_option_string")]
    pub client_fingerprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reality_opts: Option<RealityOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOpts>,
}

impl ClashProxy {
    fn base(node: &Proxy) -> Self {
        ClashProxy {
            name: node.remark.clone(),
            proxy_type: node.proxy_type.clash_type().to_string(),
            server: node.hostname.clone(),
            port: node.port,
            udp: node.udp,
            uuid: None,
            alter_id: None,
            cipher: None,
            password: None,
            plugin: None,
            plugin_opts: None,
            network: None,
            tls: None,
            encryption: None,
            flow: None,
            servername: None,
            sni: None,
            client_fingerprint: None,
            reality_opts: None,
            ws_opts: None,
            grpc_opts: None,
        }
    }

    /// Serialize into a YAML value ready to be placed in a document
    pub fn to_yaml_value(&self) -> Result<Value, serde_yaml::Error> {
        serde_yaml::to_value(self)
    }

    /// Fill the transport options shared by VMess and VLESS
    fn set_transport(&mut self, node: &Proxy) {
        self.network = Some(node.network().to_string());
        match node.network() {
            "ws" => {
                self.ws_opts = Some(WsOpts {
                    path: node.path.clone().unwrap_or_else(|| "/".to_string()),
                    headers: WsHeaders {
                        host: node.host.clone().unwrap_or_else(|| node.hostname.clone()),
                    },
                });
            }
            "grpc" => {
                self.grpc_opts = Some(GrpcOpts {
                    grpc_service_name: node.path.clone().unwrap_or_default(),
                });
            }
            _ => {}
        }
    }
}

fn shadowsocks_plugin(node: &Proxy) -> (Option<String>, Option<Mapping>) {
    let plugin_options = node.plugin_option.as_deref().unwrap_or("").replace(';', "&");
    let mut opts = Mapping::new();

    match node.plugin.as_deref() {
        Some("simple-obfs" | "obfs-local") => {
            opts.insert("mode".into(), get_url_arg(&plugin_options, "obfs").into());
            let obfs_host = get_url_arg(&plugin_options, "obfs-host");
            if !obfs_host.is_empty() {
                opts.insert("host".into(), obfs_host.into());
            }
            (Some("obfs".to_string()), Some(opts))
        }
        Some("v2ray-plugin") => {
            for key in ["mode", "host", "path"] {
                let value = get_url_arg(&plugin_options, key);
                if !value.is_empty() {
                    opts.insert(key.into(), value.into());
                }
            }
            if plugin_options.split('&').any(|arg| arg == "tls") {
                opts.insert("tls".into(), true.into());
            }
            if plugin_options.split('&').any(|arg| arg == "mux") {
                opts.insert("mux".into(), true.into());
            }
            (Some("v2ray-plugin".to_string()), Some(opts))
        }
        Some(other) => (Some(other.to_string()), None),
        None => (None, None),
    }
}

impl From<&Proxy> for ClashProxy {
    fn from(node: &Proxy) -> Self {
        let mut proxy = ClashProxy::base(node);

        match node.proxy_type {
            ProxyType::Shadowsocks => {
                proxy.cipher = node.encrypt_method.clone();
                proxy.password = Some(node.password.clone().unwrap_or_default());
                let (plugin, plugin_opts) = shadowsocks_plugin(node);
                proxy.plugin = plugin;
                proxy.plugin_opts = plugin_opts;
            }
            ProxyType::VMess => {
                proxy.uuid = node.user_id.clone();
                proxy.alter_id = Some(node.alter_id);
                proxy.cipher = Some(
                    node.encrypt_method
                        .clone()
                        .unwrap_or_else(|| "auto".to_string()),
                );
                proxy.tls = Some(node.tls_secure);
                proxy.servername = node.server_name.clone();
                proxy.set_transport(node);
            }
            ProxyType::Trojan => {
                proxy.password = Some(node.password.clone().unwrap_or_default());
                proxy.sni = node.sni.clone();
            }
            ProxyType::Vless => {
                proxy.uuid = node.user_id.clone();
                proxy.tls = Some(node.tls_secure);
                proxy.encryption = Some(
                    node.encryption
                        .clone()
                        .unwrap_or_else(|| "none".to_string()),
                );
                proxy.flow = node.flow.clone();
                proxy.servername = node.server_name.clone();
                proxy.client_fingerprint = node.fingerprint.clone();
                if node.is_reality() {
                    proxy.reality_opts = Some(RealityOpts {
                        public_key: node.public_key.clone().unwrap_or_default(),
                        short_id: node.short_id.clone().unwrap_or_default(),
                    });
                }
                proxy.set_transport(node);
            }
            ProxyType::Unknown => {}
        }

        proxy
    }
}
