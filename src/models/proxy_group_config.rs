use super::proxy::Proxy;

/// Type of proxy group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyGroupType {
    Select,
    URLTest,
    Fallback,
    LoadBalance,
    /// Any other group type found in a template, kept verbatim
    Other(String),
}

impl ProxyGroupType {
    /// Parse the `type` field of a Clash proxy group, case-insensitively
    pub fn from_type_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "select" => ProxyGroupType::Select,
            "url-test" => ProxyGroupType::URLTest,
            "fallback" => ProxyGroupType::Fallback,
            "load-balance" => ProxyGroupType::LoadBalance,
            other => ProxyGroupType::Other(other.to_string()),
        }
    }

    /// Get string representation of the proxy group type
    pub fn as_str(&self) -> &str {
        match self {
            ProxyGroupType::Select => "select",
            ProxyGroupType::URLTest => "url-test",
            ProxyGroupType::Fallback => "fallback",
            ProxyGroupType::LoadBalance => "load-balance",
            ProxyGroupType::Other(s) => s,
        }
    }

    /// Groups that pick a node automatically by probing it
    pub fn is_speed_test(&self) -> bool {
        matches!(
            self,
            ProxyGroupType::URLTest | ProxyGroupType::Fallback | ProxyGroupType::LoadBalance
        )
    }
}

/// A named set of subscription inputs whose nodes are probed together
/// in one `url-test` group.
#[derive(Debug, Clone, Default)]
pub struct SpeedTestGroup {
    pub name: String,
    pub proxies: Vec<Proxy>,
}

impl SpeedTestGroup {
    pub fn new(name: impl Into<String>, proxies: Vec<Proxy>) -> Self {
        Self {
            name: name.into(),
            proxies,
        }
    }
}

/// Node layout of a merged document: speed-test groups plus nodes listed
/// individually in the main select group.
#[derive(Debug, Clone, Default)]
pub struct GroupLayout {
    pub groups: Vec<SpeedTestGroup>,
    pub manual: Vec<Proxy>,
}

impl GroupLayout {
    /// Total number of nodes across all groups
    pub fn node_count(&self) -> usize {
        self.groups.iter().map(|g| g.proxies.len()).sum::<usize>() + self.manual.len()
    }

    /// Number of speed-test groups that received at least one node
    pub fn populated_groups(&self) -> usize {
        self.groups.iter().filter(|g| !g.proxies.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_type_parse() {
        assert_eq!(ProxyGroupType::from_type_str("URL-Test"), ProxyGroupType::URLTest);
        assert_eq!(ProxyGroupType::from_type_str("select"), ProxyGroupType::Select);
        assert!(ProxyGroupType::from_type_str("load-balance").is_speed_test());
        assert!(!ProxyGroupType::from_type_str("relay").is_speed_test());
        assert_eq!(ProxyGroupType::from_type_str("relay").as_str(), "relay");
    }

    #[test]
    fn test_layout_counts() {
        let layout = GroupLayout {
            groups: vec![
                SpeedTestGroup::new("HK", vec![Proxy::default(), Proxy::default()]),
                SpeedTestGroup::new("JP", Vec::new()),
            ],
            manual: vec![Proxy::default()],
        };
        assert_eq!(layout.node_count(), 3);
        assert_eq!(layout.populated_groups(), 1);
    }
}
