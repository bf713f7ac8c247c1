//! サービスノードのパース

use super::env::{parse_env_entry, parse_flat_env};
use super::port::{parse_port, parse_virtual_host};
use super::value::{arguments, string_property};
use super::volume::{parse_bind_volume, parse_named_volume};
use crate::error::{FlowError, Result};
use crate::model::{QuantityKind, ResourceProfile, Resources, ServiceModel, is_dns_label};
use kdl::KdlNode;

/// service ノードをパース
pub fn parse_service(node: &KdlNode) -> Result<ServiceModel> {
    let name = node
        .entries()
        .first()
        .and_then(|e| e.value().as_string())
        .ok_or_else(|| FlowError::InvalidConfig("service requires a name".to_string()))?
        .to_string();
    let name = dns_label("service", name)?;

    let mut service = ServiceModel::new(name);

    let Some(children) = node.children() else {
        return Ok(service);
    };

    for child in children.nodes() {
        match child.name().value() {
            "image" => {
                service.image = child
                    .entries()
                    .first()
                    .and_then(|e| e.value().as_string())
                    .map(|s| s.to_string());
            }
            "command" => {
                let command: Vec<String> = arguments(child)
                    .filter_map(|v| v.as_string().map(|s| s.to_string()))
                    .collect();
                if !command.is_empty() {
                    service.command = Some(command);
                }
            }
            "depends_on" => {
                for dep in arguments(child).filter_map(|v| v.as_string()) {
                    service
                        .depends_on
                        .insert(dns_label("depends_on", dep.to_string())?);
                }
            }
            "port" => push_port(&mut service, child)?,
            "ports" => {
                if let Some(ports) = child.children() {
                    for port_node in ports.nodes() {
                        if port_node.name().value() == "port" {
                            push_port(&mut service, port_node)?;
                        }
                    }
                }
            }
            "virtual_host" => service.virtual_hosts.push(parse_virtual_host(child)?),
            "virtual_hosts" => {
                if let Some(hosts) = child.children() {
                    for host_node in hosts.nodes() {
                        if host_node.name().value() == "virtual_host" {
                            service.virtual_hosts.push(parse_virtual_host(host_node)?);
                        }
                    }
                }
            }
            // env と environment 両方をサポート
            "environment" | "env" => {
                if let Some(envs) = child.children() {
                    for env_node in envs.nodes() {
                        service.environment.insert(parse_env_entry(env_node)?);
                    }
                } else if let Some(var) = parse_flat_env(child) {
                    service.environment.insert(var);
                }
            }
            "volume" => {
                let volume = parse_named_volume(&service.name, child)?;
                service.volumes.push(volume);
            }
            "bind" => service.volumes.push(parse_bind_volume(child)?),
            "volumes" => {
                if let Some(vols) = child.children() {
                    for vol_node in vols.nodes() {
                        match vol_node.name().value() {
                            "volume" => {
                                let volume = parse_named_volume(&service.name, vol_node)?;
                                service.volumes.push(volume);
                            }
                            "bind" => service.volumes.push(parse_bind_volume(vol_node)?),
                            _ => {}
                        }
                    }
                }
            }
            "resources" => {
                service.resources = parse_resources(&service.name, child)?;
            }
            _ => {}
        }
    }

    Ok(service)
}

/// リソース名・ファイルパスに使われる値はDNS-1123ラベルに限る
fn dns_label(field: &'static str, value: String) -> Result<String> {
    if is_dns_label(&value) {
        Ok(value)
    } else {
        Err(FlowError::InvalidName { field, value })
    }
}

/// 公開ポートはサービス内で一意
fn push_port(service: &mut ServiceModel, node: &KdlNode) -> Result<()> {
    let port = parse_port(node)?;
    if service.ports.iter().any(|p| p.source == port.source) {
        return Err(FlowError::InvalidConfig(format!(
            "サービス '{}' でポート {} が重複しています",
            service.name, port.source
        )));
    }
    service.ports.push(port);
    Ok(())
}

/// resources ノードをパース
///
/// 形式: resources profile="small" cpu="250m" memory="256Mi" limit_cpu="1" limit_memory="1Gi"
/// 明示した値がプロファイルより優先される。
pub fn parse_resources(service: &str, node: &KdlNode) -> Result<Resources> {
    let mut resources = Resources::default();

    let fields: [(&'static str, &'static str, QuantityKind); 4] = [
        ("cpu", "request_cpu", QuantityKind::Cpu),
        ("memory", "request_memory", QuantityKind::Memory),
        ("limit_cpu", "limit_cpu", QuantityKind::Cpu),
        ("limit_memory", "limit_memory", QuantityKind::Memory),
    ];

    for (property, field, kind) in fields {
        let Some(raw) = string_property(node, property) else {
            continue;
        };
        let value = kind
            .validate(&raw)
            .ok_or_else(|| FlowError::InvalidQuantity {
                service: service.to_string(),
                field,
                value: raw,
                hint: kind.hint(),
            })?;
        let slot = match field {
            "request_cpu" => &mut resources.request_cpu,
            "request_memory" => &mut resources.request_memory,
            "limit_cpu" => &mut resources.limit_cpu,
            _ => &mut resources.limit_memory,
        };
        *slot = Some(value);
    }

    if let Some(raw) = string_property(node, "profile") {
        let profile = ResourceProfile::parse(&raw).ok_or_else(|| {
            FlowError::InvalidConfig(format!(
                "サービス '{service}' の profile が不正です: {raw} (large, medium, small のいずれか)"
            ))
        })?;
        resources.fill_from(profile);
    }

    Ok(resources)
}
