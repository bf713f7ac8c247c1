mod commands;
mod utils;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kforge")]
#[command(about = "サービス定義から Kubernetes マニフェストを生成し、既存ファイルにマージする", long_about = None)]
struct Cli {
    /// デバッグログを表示
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 環境ディレクトリ (kubernetes-<ENV>) を作成
    Init {
        /// 環境名 (dev, staging, prod など)
        env: String,
        /// デプロイ先プロバイダー (rancher, google-cloud)
        #[arg(long, default_value = "rancher")]
        provider: String,
        /// クラスタが cert-manager に対応している
        #[arg(long)]
        cert_manager: bool,
        /// Ingress クラス（省略時はクラスタ既定）
        #[arg(long)]
        ingress_class: Option<String>,
        /// ホスト未指定の仮想ホストに使うベースドメイン
        #[arg(long)]
        base_host: Option<String>,
        /// 同じ設定を ~/.config/kubeforge/platform.yml にも保存する
        #[arg(long)]
        global: bool,
    },
    /// マニフェストを生成して環境ディレクトリにマージ
    Apply {
        #[command(flatten)]
        target: TargetArgs,
        /// 書き込まずに結果を標準出力に表示
        #[arg(long)]
        dry_run: bool,
    },
    /// マニフェストを生成できるか検証（書き込みなし）
    Validate {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// バージョン情報を表示
    Version,
}

/// apply / validate 共通の指定
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// サービス定義ファイル（省略時は services.kdl を探索）
    pub file: Option<PathBuf>,
    /// 環境ディレクトリ（省略時は KUBEFORGE_ENV_DIR または kubernetes-* を探索）
    #[arg(long)]
    pub env_dir: Option<PathBuf>,
    /// 対象サービス（省略時は全サービス）
    #[arg(short = 'n', long)]
    pub service: Option<String>,
    /// リソース未指定のサービスに使うプロファイル (small, medium, large)
    #[arg(long, default_value = "small")]
    pub profile: String,
    /// プラットフォーム設定ファイル
    #[arg(long)]
    pub platform: Option<PathBuf>,
    /// Ingress クラスを上書き
    #[arg(long)]
    pub ingress_class: Option<String>,
    /// cert-manager を有効にする
    #[arg(long)]
    pub cert_manager: bool,
    /// Ingress 配下の Service を NodePort にする
    #[arg(long)]
    pub node_port: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let success = match cli.command {
        Commands::Init {
            env,
            provider,
            cert_manager,
            ingress_class,
            base_host,
            global,
        } => commands::init::handle(commands::init::InitOptions {
            env,
            provider,
            cert_manager,
            ingress_class,
            base_host,
            global,
        })?,
        Commands::Apply { target, dry_run } => commands::apply::handle(&target, dry_run)?,
        Commands::Validate { target } => commands::validate::handle(&target)?,
        Commands::Version => {
            println!("kubeforge {}", env!("CARGO_PKG_VERSION"));
            true
        }
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}
