//! 共有変数のコンテナ単位グルーピング

use kubeforge_core::{EnvVariable, EnvVariableKind, Environment};
use std::fmt;

/// 共有変数の所属先
///
/// コンテナ未指定の変数は `Default` に入る。実在のコンテナIDと衝突しない。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContainerGroup {
    Default,
    Container(String),
}

impl ContainerGroup {
    pub fn of(var: &EnvVariable) -> Self {
        match var.container_ref() {
            Some(id) => ContainerGroup::Container(id.to_string()),
            None => ContainerGroup::Default,
        }
    }

    pub fn container_id(&self) -> Option<&str> {
        match self {
            ContainerGroup::Default => None,
            ContainerGroup::Container(id) => Some(id),
        }
    }
}

impl fmt::Display for ContainerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerGroup::Default => f.write_str("(default)"),
            ContainerGroup::Container(id) => f.write_str(id),
        }
    }
}

/// 共有変数をコンテナグループごとに分割したインデックス
///
/// グループは最初に現れた順、グループ内の変数は宣言順に並ぶ（安定な分割）。
#[derive(Debug, Clone, Default)]
pub struct ContainerGroupIndex<'a> {
    groups: Vec<(ContainerGroup, Vec<&'a EnvVariable>)>,
}

impl<'a> ContainerGroupIndex<'a> {
    /// `kind` に一致する変数だけを対象にグルーピング
    pub fn build(env: &'a Environment, kind: EnvVariableKind) -> Self {
        let mut groups: Vec<(ContainerGroup, Vec<&'a EnvVariable>)> = Vec::new();

        for var in env.of_kind(kind) {
            let group = ContainerGroup::of(var);
            match groups.iter_mut().find(|(g, _)| *g == group) {
                Some((_, vars)) => vars.push(var),
                None => groups.push((group, vec![var])),
            }
        }

        Self { groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ContainerGroup, &[&'a EnvVariable])> {
        self.groups.iter().map(|(g, vars)| (g, vars.as_slice()))
    }

    pub fn groups(&self) -> impl Iterator<Item = &ContainerGroup> {
        self.groups.iter().map(|(g, _)| g)
    }

    pub fn get(&self, group: &ContainerGroup) -> Option<&[&'a EnvVariable]> {
        self.groups
            .iter()
            .find(|(g, _)| g == group)
            .map(|(_, vars)| vars.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
