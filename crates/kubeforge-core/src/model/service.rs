//! サービス定義

use super::env::{EnvVariable, EnvVariableKind, Environment};
use super::port::{Port, VirtualHost};
use super::resources::{ResourceProfile, Resources};
use super::volume::{NamedVolume, Volume};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 複数環境向けテンプレートのプレースホルダー
pub const ENVIRONMENT_PLACEHOLDER: &str = "#ENVIRONMENT#";

/// オーケストレーター非依存のサービス定義
///
/// KDL形式：
/// ```kdl
/// service "web" {
///     image "web:1"
///     port 80 8080
///     env {
///         API_KEY "..." type="shared-secret" container="worker"
///     }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceModel {
    pub name: String,
    pub image: Option<String>,
    #[serde(default)]
    pub command: Option<Vec<String>>,
    /// 起動前に名前解決できる必要があるサービス
    #[serde(default)]
    pub depends_on: BTreeSet<String>,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub virtual_hosts: Vec<VirtualHost>,
    #[serde(default)]
    pub volumes: Vec<Volume>,
    #[serde(default)]
    pub resources: Resources,
}

impl ServiceModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Deploymentに直接展開する環境変数
    pub fn container_env(&self) -> impl Iterator<Item = &EnvVariable> {
        self.environment.of_kind(EnvVariableKind::Container)
    }

    pub fn named_volumes(&self) -> impl Iterator<Item = &NamedVolume> {
        self.volumes.iter().filter_map(Volume::as_named)
    }

    /// イメージに環境プレースホルダーを含むか（複数環境テンプレート）
    pub fn is_templated(&self) -> bool {
        self.image
            .as_deref()
            .is_some_and(|image| image.contains(ENVIRONMENT_PLACEHOLDER))
    }

    /// リソース未指定の項目をプロファイルで補完
    pub fn apply_profile(&mut self, profile: ResourceProfile) {
        self.resources.fill_from(profile);
    }

    /// 他のServiceModelをマージする
    ///
    /// otherで定義されたフィールドが優先される（オーバーライド）。
    /// - Option<T>: otherがSomeならそれを使用
    /// - Vec<T>: otherが空でなければそれを使用
    /// - 環境変数・依存関係: キー単位でマージ（otherが優先）
    pub fn merge(&mut self, other: ServiceModel) {
        if other.image.is_some() {
            self.image = other.image;
        }
        if other.command.is_some() {
            self.command = other.command;
        }
        if !other.ports.is_empty() {
            self.ports = other.ports;
        }
        if !other.virtual_hosts.is_empty() {
            self.virtual_hosts = other.virtual_hosts;
        }
        if !other.volumes.is_empty() {
            self.volumes = other.volumes;
        }

        let resources = other.resources;
        if resources.request_cpu.is_some() {
            self.resources.request_cpu = resources.request_cpu;
        }
        if resources.request_memory.is_some() {
            self.resources.request_memory = resources.request_memory;
        }
        if resources.limit_cpu.is_some() {
            self.resources.limit_cpu = resources.limit_cpu;
        }
        if resources.limit_memory.is_some() {
            self.resources.limit_memory = resources.limit_memory;
        }

        self.depends_on.extend(other.depends_on);
        for var in other.environment.iter() {
            self.environment.insert(var.clone());
        }
    }
}
