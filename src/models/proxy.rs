//! Proxy model definitions
//!
//! Contains the core data structures for proxy nodes.

/// Represents the type of a proxy.
/// This is the canonical enum used for proxy type identification across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyType {
    Unknown,
    Shadowsocks,
    VMess,
    Trojan,
    Vless,
}

impl ProxyType {
    /// Value of the `type` field in a Clash proxy entry
    pub fn clash_type(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "ss",
            ProxyType::VMess => "vmess",
            ProxyType::Trojan => "trojan",
            ProxyType::Vless => "vless",
            ProxyType::Unknown => "unknown",
        }
    }

    /// Name given to a node whose link carries no remark
    pub fn default_remark(self) -> &'static str {
        match self {
            ProxyType::Shadowsocks => "SS_Node",
            ProxyType::VMess => "VMess_Node",
            ProxyType::Trojan => "Trojan_Node",
            ProxyType::Vless => "VLESS_Node",
            ProxyType::Unknown => "Node",
        }
    }
}

/// Represents a proxy node parsed from a subscription link.
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
    pub proxy_type: ProxyType,
    /// Node name as it appears in the Clash document
    pub remark: String,
    pub hostname: String,
    pub port: u16,

    pub password: Option<String>,
    pub encrypt_method: Option<String>,
    pub plugin: Option<String>,
    /// Plugin options in the format of `key1=value1;key2=value2`
    pub plugin_option: Option<String>,
    pub user_id: Option<String>,
    pub alter_id: u16,
    /// Transport network: tcp, ws, grpc, ...
    pub transfer_protocol: Option<String>,
    pub tls_secure: bool,

    /// WebSocket Host header
    pub host: Option<String>,
    /// WebSocket path, or gRPC service name when the transport is grpc
    pub path: Option<String>,

    pub udp: Option<bool>,
    pub server_name: Option<String>,
    pub sni: Option<String>,
    pub fingerprint: Option<String>,

    pub flow: Option<String>,
    pub encryption: Option<String>,
    /// REALITY public key
    pub public_key: Option<String>,
    /// REALITY short id
    pub short_id: Option<String>,
}

impl Default for Proxy {
    fn default() -> Self {
        Proxy {
            proxy_type: ProxyType::Unknown,
            remark: String::new(),
            hostname: String::new(),
            port: 0,
            password: None,
            encrypt_method: None,
            plugin: None,
            plugin_option: None,
            user_id: None,
            alter_id: 0,
            transfer_protocol: None,
            tls_secure: false,
            host: None,
            path: None,
            udp: None,
            server_name: None,
            sni: None,
            fingerprint: None,
            flow: None,
            encryption: None,
            public_key: None,
            short_id: None,
        }
    }
}

impl Proxy {
    /// Transport network, `tcp` when none was given
    pub fn network(&self) -> &str {
        self.transfer_protocol.as_deref().unwrap_or("tcp")
    }

    /// Whether the node carries REALITY parameters
    pub fn is_reality(&self) -> bool {
        self.public_key.is_some()
    }

    pub fn ss_construct(
        remark: &str,
        server: &str,
        port: u16,
        password: &str,
        method: &str,
        plugin: &str,
        plugin_opts: &str,
    ) -> Proxy {
        Proxy {
            proxy_type: ProxyType::Shadowsocks,
            remark: remark.to_string(),
            hostname: server.to_string(),
            port,
            password: Some(password.to_string()),
            encrypt_method: Some(method.to_string()),
            plugin: non_empty(plugin),
            plugin_option: non_empty(plugin_opts),
            ..Default::default()
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn vmess_construct(
        remark: &str,
        add: &str,
        port: u16,
        id: &str,
        aid: u16,
        net: &str,
        cipher: &str,
        path: Option<String>,
        host: Option<String>,
        tls: bool,
        server_name: Option<String>,
    ) -> Proxy {
        Proxy {
            proxy_type: ProxyType::VMess,
            remark: remark.to_string(),
            hostname: add.to_string(),
            port,
            user_id: Some(id.to_string()),
            alter_id: aid,
            encrypt_method: Some(cipher.to_string()),
            transfer_protocol: Some(net.to_string()),
            tls_secure: tls,
            server_name,
            path,
            host,
            udp: Some(true),
            ..Default::default()
        }
    }

    pub fn trojan_construct(
        remark: String,
        server: String,
        port: u16,
        password: String,
        sni: Option<String>,
    ) -> Proxy {
        Proxy {
            proxy_type: ProxyType::Trojan,
            remark,
            hostname: server,
            port,
            password: Some(password),
            sni,
            udp: Some(true),
            ..Default::default()
        }
    }

    pub fn vless_construct(
        remark: String,
        server: String,
        port: u16,
        uuid: String,
        network: String,
        tls: bool,
        encryption: String,
    ) -> Proxy {
        Proxy {
            proxy_type: ProxyType::Vless,
            remark,
            hostname: server,
            port,
            user_id: Some(uuid),
            transfer_protocol: Some(network),
            tls_secure: tls,
            encryption: Some(encryption),
            udp: Some(true),
            ..Default::default()
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Built-in Clash policies that are never treated as node names.
pub const BUILTIN_POLICIES: [&str; 3] = ["DIRECT", "REJECT", "PASS"];
