use colored::Colorize;
use kubeforge_config::{PlatformConfig, Provider};

pub struct InitOptions {
    pub env: String,
    pub provider: String,
    pub cert_manager: bool,
    pub ingress_class: Option<String>,
    pub base_host: Option<String>,
    /// グローバル設定としても保存する
    pub global: bool,
}

pub fn handle(options: InitOptions) -> anyhow::Result<bool> {
    let provider: Provider = options.provider.parse()?;

    let mut config = PlatformConfig::preset(provider, options.cert_manager, options.ingress_class);
    config.base_virtual_host = options.base_host.filter(|host| !host.trim().is_empty());

    let project_dir = std::env::current_dir()?;
    let env_dir = kubeforge_config::init_environment_dir(&project_dir, &options.env, &config)?;

    let dir_name = env_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env_dir.display().to_string());

    println!(
        "{} 環境ディレクトリを作成しました: {}",
        "✓".green().bold(),
        dir_name.cyan()
    );
    println!("  プロバイダー: {}", config.provider);
    if let Some(class) = &config.ingress_class {
        println!("  Ingress クラス: {class}");
    }
    if config.cert_manager {
        println!("  cert-manager: 有効");
    }
    if config.use_node_port_for_ingress {
        println!("  Ingress 配下の Service: NodePort");
    }

    if options.global {
        let path = kubeforge_config::save_global(&config)?;
        println!(
            "{} グローバル設定を保存しました: {}",
            "✓".green().bold(),
            path.display()
        );
    }

    Ok(true)
}
