//! Ingress

use super::{PlatformFlags, require};
use crate::document::{ManifestDocument, Mapping, Node};
use crate::error::Result;
use crate::kind::ResourceKind;
use crate::naming;
use kubeforge_core::ServiceModel;

pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";
pub const TLS_ACME_ANNOTATION: &str = "kubernetes.io/tls-acme";
pub const CLUSTER_ISSUER_ANNOTATION: &str = "certmanager.k8s.io/cluster-issuer";
pub const CLUSTER_ISSUER: &str = "letsencrypt-prod";

const HOST_HINT: &str =
    "virtual_host にホスト名を指定するか、プラットフォーム設定の base_virtual_host を設定してください";

/// 仮想ホストごとのルールを持つIngressを生成
///
/// 同じホストの仮想ホストは1つのルールにまとめ、ポートごとにパスを並べる。
/// ホストはこの時点で解決済みでなければならない。
pub fn serialize_ingress(model: &ServiceModel, flags: &PlatformFlags) -> Result<ManifestDocument> {
    let kind = ResourceKind::Ingress;

    // (host, [(port, comment)])
    let mut hosts: Vec<(&str, Vec<(u16, Option<&str>)>)> = Vec::new();
    for vhost in &model.virtual_hosts {
        let host = require(model, kind, "virtual_host.host", vhost.host.as_deref(), HOST_HINT)?;
        let backend = (vhost.port, vhost.comment.as_deref());
        match hosts.iter_mut().find(|(h, _)| *h == host) {
            Some((_, ports)) => {
                if !ports.iter().any(|(p, _)| *p == vhost.port) {
                    ports.push(backend);
                }
            }
            None => hosts.push((host, vec![backend])),
        }
    }

    let rules: Vec<Node> = hosts
        .iter()
        .map(|(host, ports)| {
            let paths = ports.iter().map(|(port, comment)| {
                let backend = Mapping::new()
                    .with("serviceName", model.name.as_str())
                    .with(
                        "servicePort",
                        Node::int(i64::from(*port)).with_comment(*comment),
                    );
                Mapping::new().with("backend", backend).into()
            });
            Mapping::new()
                .with("host", *host)
                .with("http", Mapping::new().with("paths", Node::seq(paths)))
                .into()
        })
        .collect();

    let mut annotations = Mapping::new();
    if let Some(class) = flags.ingress_class.as_deref().filter(|c| !c.is_empty()) {
        annotations.insert(INGRESS_CLASS_ANNOTATION, class);
    }
    if flags.cert_manager {
        annotations.insert(TLS_ACME_ANNOTATION, "true");
        annotations.insert(CLUSTER_ISSUER_ANNOTATION, CLUSTER_ISSUER);
    }

    let tls = if flags.cert_manager {
        vec![
            Mapping::new()
                .with("hosts", Node::str_seq(hosts.iter().map(|(host, _)| *host)))
                .with("secretName", naming::tls_secret_name(&model.name))
                .into(),
        ]
    } else {
        Vec::new()
    };

    let metadata = if annotations.is_empty() {
        Mapping::new()
    } else {
        Mapping::new().with("annotations", annotations)
    };

    let spec = Mapping::new()
        .with_non_empty("tls", tls)
        .with("rules", Node::Sequence(rules));

    Ok(ManifestDocument::new(
        kind,
        naming::INGRESS_NAME,
        metadata,
        Mapping::new().with("spec", spec),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ManifestError;
    use kubeforge_core::VirtualHost;

    fn web() -> ServiceModel {
        let mut model = ServiceModel::new("web");
        model.virtual_hosts.push(VirtualHost::new("a.example.com", 80));
        model
    }

    #[test]
    fn test_rules() {
        let mut model = web();
        model.virtual_hosts.push(VirtualHost::new("b.example.com", 9090));

        let doc = serialize_ingress(&model, &PlatformFlags::default()).unwrap();
        assert_eq!(doc.name(), Some("ingress"));
        assert_eq!(doc.api_version(), Some("networking.k8s.io/v1beta1"));
        assert!(doc.get_path(&["metadata", "annotations"]).is_none());
        assert!(doc.get_path(&["spec", "tls"]).is_none());

        let rules = doc
            .get_path(&["spec", "rules"])
            .and_then(Node::as_sequence)
            .unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(
            rules[1].get_path(&["host"]).and_then(Node::as_str),
            Some("b.example.com")
        );
        let backend = rules[1]
            .get_path(&["http", "paths"])
            .and_then(Node::as_sequence)
            .and_then(|p| p.first())
            .and_then(|p| p.get_path(&["backend"]))
            .unwrap();
        assert_eq!(
            backend.get_path(&["serviceName"]).and_then(Node::as_str),
            Some("web")
        );
        assert_eq!(backend.get_path(&["servicePort"]), Some(&Node::int(9090)));
    }

    #[test]
    fn test_same_host_shares_rule() {
        let mut model = web();
        model.virtual_hosts.push(VirtualHost::new("a.example.com", 8080));
        model.virtual_hosts.push(VirtualHost::new("a.example.com", 80));

        let doc = serialize_ingress(&model, &PlatformFlags::default()).unwrap();
        let rules = doc
            .get_path(&["spec", "rules"])
            .and_then(Node::as_sequence)
            .unwrap();
        assert_eq!(rules.len(), 1);
        let paths = rules[0]
            .get_path(&["http", "paths"])
            .and_then(Node::as_sequence)
            .unwrap();
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_annotations_and_tls() {
        let flags = PlatformFlags {
            ingress_class: Some("nginx".to_string()),
            cert_manager: true,
            use_node_port_for_ingress: false,
        };

        let doc = serialize_ingress(&web(), &flags).unwrap();
        let annotations = doc
            .get_path(&["metadata", "annotations"])
            .and_then(Node::as_mapping)
            .unwrap();
        assert_eq!(
            annotations.get(INGRESS_CLASS_ANNOTATION).and_then(Node::as_str),
            Some("nginx")
        );
        assert_eq!(
            annotations.get(TLS_ACME_ANNOTATION).and_then(Node::as_str),
            Some("true")
        );
        assert_eq!(
            annotations.get(CLUSTER_ISSUER_ANNOTATION).and_then(Node::as_str),
            Some(CLUSTER_ISSUER)
        );

        let tls = doc
            .get_path(&["spec", "tls"])
            .and_then(Node::as_sequence)
            .unwrap();
        assert_eq!(
            tls[0].get_path(&["secretName"]).and_then(Node::as_str),
            Some("web-tls")
        );
    }

    #[test]
    fn test_class_only() {
        let flags = PlatformFlags {
            ingress_class: Some("gce".to_string()),
            ..Default::default()
        };
        let doc = serialize_ingress(&web(), &flags).unwrap();
        let annotations = doc
            .get_path(&["metadata", "annotations"])
            .and_then(Node::as_mapping)
            .unwrap();
        assert_eq!(annotations.len(), 1);
        assert!(doc.get_path(&["spec", "tls"]).is_none());
    }

    #[test]
    fn test_unresolved_host_is_validation_error() {
        let mut model = ServiceModel::new("web");
        model.virtual_hosts.push(kubeforge_core::VirtualHost {
            host: None,
            port: 80,
            comment: None,
        });

        let err = serialize_ingress(&model, &PlatformFlags::default()).unwrap_err();
        assert!(matches!(
            err,
            ManifestError::Validation { kind: ResourceKind::Ingress, .. }
        ));
    }
}
