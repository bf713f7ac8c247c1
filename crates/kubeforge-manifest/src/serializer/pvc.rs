//! PersistentVolumeClaim

use super::require;
use crate::document::{ManifestDocument, Mapping, Node};
use crate::error::Result;
use crate::kind::ResourceKind;
use crate::naming;
use kubeforge_core::{NamedVolume, ServiceModel};

const STORAGE_HINT: &str = "volume ノードに storage=\"8Gi\" のように容量を指定してください";

/// 名前付きボリューム1つ分のPVC
pub fn serialize_persistent_volume_claim(
    model: &ServiceModel,
    volume: &NamedVolume,
) -> Result<ManifestDocument> {
    let kind = ResourceKind::PersistentVolumeClaim;
    let storage = require(
        model,
        kind,
        &format!("volume '{}' の storage", volume.source),
        volume.request_storage.as_deref(),
        STORAGE_HINT,
    )?;

    let spec = Mapping::new()
        .with("accessModes", Node::str_seq(["ReadWriteOnce"]))
        .with(
            "resources",
            Mapping::new().with(
                "requests",
                Mapping::new().with(
                    "storage",
                    Node::str(storage).with_comment(volume.comment.as_deref()),
                ),
            ),
        );

    Ok(ManifestDocument::new(
        kind,
        &naming::pvc_name(&volume.source),
        Mapping::new(),
        Mapping::new().with("spec", spec),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;

    #[test]
    fn test_pvc() {
        let model = ServiceModel::new("db");
        let volume = NamedVolume::new("pg_data", "/var/lib/postgresql/data").with_storage("8Gi");

        let doc = serialize_persistent_volume_claim(&model, &volume).unwrap();
        assert_eq!(doc.name(), Some("pvc-pg-data-pvc"));
        assert_eq!(
            doc.get_path(&["spec", "accessModes"]),
            Some(&Node::str_seq(["ReadWriteOnce"]))
        );
        assert_eq!(
            doc.get_path(&["spec", "resources", "requests", "storage"])
                .and_then(Node::as_str),
            Some("8Gi")
        );
    }

    #[test]
    fn test_pvc_requires_storage() {
        let model = ServiceModel::new("db");
        let volume = NamedVolume::new("pg_data", "/data");

        let err = serialize_persistent_volume_claim(&model, &volume).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Validation { kind: ResourceKind::PersistentVolumeClaim, .. }
        ));
    }
}
