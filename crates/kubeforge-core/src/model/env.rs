//! 環境変数定義

use serde::{Deserialize, Serialize};

/// 環境変数の種別
///
/// `Container` はDeploymentのコンテナ定義に直接展開され、
/// 共有変数・共有シークレットはConfigMap/Secretに切り出される。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnvVariableKind {
    #[default]
    Container,
    SharedEnvVariable,
    SharedSecret,
}

impl EnvVariableKind {
    /// 文字列からパース
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "container" => Some(Self::Container),
            "shared-env" | "shared_env" | "shared-env-variable" | "shared_env_variable" => {
                Some(Self::SharedEnvVariable)
            }
            "shared-secret" | "shared_secret" | "secret" => Some(Self::SharedSecret),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::SharedEnvVariable => "shared-env",
            Self::SharedSecret => "shared-secret",
        }
    }

    /// ConfigMap/Secretに切り出される種別か
    pub fn is_shared(&self) -> bool {
        !matches!(self, Self::Container)
    }
}

/// 環境変数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVariable {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub kind: EnvVariableKind,
    /// 所属するコンテナID（未指定ならデフォルトグループ）
    #[serde(default)]
    pub container_id: Option<String>,
}

impl EnvVariable {
    /// コンテナ専用の環境変数
    pub fn container(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            comment: None,
            kind: EnvVariableKind::Container,
            container_id: None,
        }
    }

    /// 共有環境変数（ConfigMap）
    pub fn shared_env(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: EnvVariableKind::SharedEnvVariable,
            ..Self::container(key, value)
        }
    }

    /// 共有シークレット（Secret）
    pub fn shared_secret(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: EnvVariableKind::SharedSecret,
            ..Self::container(key, value)
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_container(mut self, container_id: impl Into<String>) -> Self {
        self.container_id = Some(container_id.into());
        self
    }

    /// 所属コンテナID（空文字列は未指定として扱う）
    pub fn container_ref(&self) -> Option<&str> {
        self.container_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// キー順序を保持する環境変数マップ
///
/// 同じキーを再挿入した場合は元の位置で値を置き換える。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(Vec<EnvVariable>);

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// 変数を追加（既存キーは位置を保ったまま置換）
    pub fn insert(&mut self, var: EnvVariable) {
        match self.0.iter_mut().find(|v| v.key == var.key) {
            Some(existing) => *existing = var,
            None => self.0.push(var),
        }
    }

    pub fn get(&self, key: &str) -> Option<&EnvVariable> {
        self.0.iter().find(|v| v.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvVariable> {
        self.0.iter()
    }

    /// 指定種別の変数のみを宣言順で返す
    pub fn of_kind(&self, kind: EnvVariableKind) -> impl Iterator<Item = &EnvVariable> {
        self.0.iter().filter(move |v| v.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<EnvVariable> for Environment {
    fn from_iter<I: IntoIterator<Item = EnvVariable>>(iter: I) -> Self {
        let mut env = Environment::new();
        for var in iter {
            env.insert(var);
        }
        env
    }
}

impl<'a> IntoIterator for &'a Environment {
    type Item = &'a EnvVariable;
    type IntoIter = std::slice::Iter<'a, EnvVariable>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
