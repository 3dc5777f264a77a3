use super::DocumentError;
use std::fmt;
use std::str::FromStr;

/// Resource kinds understood by apply and clone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ComponentTemplate,
    IndexTemplate,
    LifecyclePolicy,
    IngestPipeline,
    ClusterSettings,
    Index,
    DataStream,
}

impl ResourceKind {
    /// Clone order. Component templates precede the index templates that
    /// compose them; cluster settings go last.
    pub const CLONE_ORDER: [ResourceKind; 5] = [
        ResourceKind::ComponentTemplate,
        ResourceKind::IndexTemplate,
        ResourceKind::LifecyclePolicy,
        ResourceKind::IngestPipeline,
        ResourceKind::ClusterSettings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ComponentTemplate => "ComponentTemplate",
            Self::IndexTemplate => "IndexTemplate",
            Self::LifecyclePolicy => "LifecyclePolicy",
            Self::IngestPipeline => "IngestPipeline",
            Self::ClusterSettings => "ClusterSettings",
            Self::Index => "Index",
            Self::DataStream => "DataStream",
        }
    }

    /// Export directory for kinds that take part in clone.
    pub fn directory(self) -> Option<&'static str> {
        match self {
            Self::ComponentTemplate => Some("component-templates"),
            Self::IndexTemplate => Some("index-templates"),
            Self::LifecyclePolicy => Some("lifecycle-policies"),
            Self::IngestPipeline => Some("ingest-pipelines"),
            Self::ClusterSettings => Some("cluster-settings"),
            Self::Index | Self::DataStream => None,
        }
    }

    /// Kind implied by an export directory name. `ilm` is accepted for
    /// lifecycle policies.
    pub fn from_directory(name: &str) -> Option<Self> {
        match name {
            "ilm" => Some(Self::LifecyclePolicy),
            _ => Self::CLONE_ORDER
                .into_iter()
                .find(|k| k.directory() == Some(name)),
        }
    }

    /// Singletons carry no name.
    pub fn requires_name(self) -> bool {
        self != Self::ClusterSettings
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = DocumentError;

    /// Case-insensitive kind name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::ComponentTemplate,
            Self::IndexTemplate,
            Self::LifecyclePolicy,
            Self::IngestPipeline,
            Self::ClusterSettings,
            Self::Index,
            Self::DataStream,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| DocumentError::UnknownKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!("IndexTemplate".parse::<ResourceKind>().unwrap(), ResourceKind::IndexTemplate);
        assert_eq!("datastream".parse::<ResourceKind>().unwrap(), ResourceKind::DataStream);
        assert!(matches!(
            "Widget".parse::<ResourceKind>(),
            Err(DocumentError::UnknownKind(k)) if k == "Widget"
        ));
    }

    #[test]
    fn test_directories_round_trip() {
        for kind in ResourceKind::CLONE_ORDER {
            let dir = kind.directory().unwrap();
            assert_eq!(ResourceKind::from_directory(dir), Some(kind));
        }
        assert_eq!(ResourceKind::from_directory("ilm"), Some(ResourceKind::LifecyclePolicy));
        assert_eq!(ResourceKind::from_directory("indices"), None);
    }

    #[test]
    fn test_only_cluster_settings_is_nameless() {
        assert!(!ResourceKind::ClusterSettings.requires_name());
        assert!(ResourceKind::Index.requires_name());
    }
}
