//! リソース種別

use serde::{Deserialize, Serialize};
use std::fmt;

/// 生成対象のKubernetesリソース種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Deployment,
    Service,
    Ingress,
    Secret,
    ConfigMap,
    PersistentVolumeClaim,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        Self::Deployment,
        Self::Service,
        Self::Ingress,
        Self::Secret,
        Self::ConfigMap,
        Self::PersistentVolumeClaim,
    ];

    /// `kind` フィールドの値
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Deployment => "Deployment",
            Self::Service => "Service",
            Self::Ingress => "Ingress",
            Self::Secret => "Secret",
            Self::ConfigMap => "ConfigMap",
            Self::PersistentVolumeClaim => "PersistentVolumeClaim",
        }
    }

    /// `apiVersion` フィールドの値
    pub fn api_version(&self) -> &'static str {
        match self {
            Self::Deployment => "apps/v1",
            Self::Ingress => "networking.k8s.io/v1beta1",
            Self::Service | Self::Secret | Self::ConfigMap | Self::PersistentVolumeClaim => "v1",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_versions() {
        assert_eq!(ResourceKind::Deployment.api_version(), "apps/v1");
        assert_eq!(ResourceKind::Secret.api_version(), "v1");
        assert_eq!(
            ResourceKind::Ingress.api_version(),
            "networking.k8s.io/v1beta1"
        );
    }
}
