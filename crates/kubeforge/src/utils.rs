use crate::TargetArgs;
use anyhow::Context;
use colored::Colorize;
use kubeforge_config::PlatformConfig;
use kubeforge_core::{ResourceProfile, ServiceModel};
use kubeforge_manifest::{FileStatus, SynthesisReport};
use std::path::{Path, PathBuf};

/// サービス定義を読み込み、対象サービスを絞り込む
pub fn load_services(target: &TargetArgs) -> anyhow::Result<(PathBuf, Vec<ServiceModel>)> {
    let path = match &target.file {
        Some(path) => path.clone(),
        None => kubeforge_core::find_services_file()?,
    };

    let services = kubeforge_core::parse_kdl_file(&path)
        .with_context(|| format!("サービス定義の読み込みに失敗しました: {}", path.display()))?;

    let services = match &target.service {
        Some(name) => vec![kubeforge_core::find_service(services, name)?],
        None => services,
    };

    if services.is_empty() {
        anyhow::bail!(
            "サービスが定義されていません: {}\nヒント: service \"<名前>\" {{ ... }} を追加してください",
            path.display()
        );
    }

    Ok((path, services))
}

/// 環境ディレクトリを決定する
pub fn resolve_env_dir(target: &TargetArgs) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &target.env_dir {
        return Ok(dir.clone());
    }
    let project_dir = std::env::current_dir()?;
    Ok(kubeforge_config::find_env_dir(&project_dir)?)
}

/// プラットフォーム設定を読み込み、コマンドラインの指定で上書きする
pub fn load_platform(target: &TargetArgs, env_dir: Option<&Path>) -> anyhow::Result<PlatformConfig> {
    let mut config = kubeforge_config::load_platform(target.platform.as_deref(), env_dir)?;

    if let Some(class) = &target.ingress_class {
        config.ingress_class = Some(class.clone()).filter(|c| !c.is_empty());
    }
    if target.cert_manager {
        config.cert_manager = true;
    }
    if target.node_port {
        config.use_node_port_for_ingress = true;
    }

    Ok(config)
}

pub fn parse_profile(name: &str) -> anyhow::Result<ResourceProfile> {
    ResourceProfile::parse(name).with_context(|| {
        format!("不明なプロファイルです: {name}\nヒント: small, medium, large のいずれかを指定してください")
    })
}

/// 生成前の既定値補完（リソース・仮想ホスト）
pub fn prepare(model: &mut ServiceModel, profile: ResourceProfile, config: &PlatformConfig) {
    model.apply_profile(profile);
    kubeforge_config::resolve_virtual_hosts(model, config.base_virtual_host.as_deref());
}

/// 1サービス分の結果を表示
///
/// `to_stderr` の場合は標準出力を空けておく（ドライラン用）。
pub fn print_report(report: &SynthesisReport, to_stderr: bool) {
    let emit = |line: String| {
        if to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    };

    emit(format!("{} {}", "▶".blue(), report.service.cyan().bold()));

    for outcome in &report.outcomes {
        let status = match outcome.status {
            FileStatus::Created => format!("{:<9}", outcome.status).green(),
            FileStatus::Updated => format!("{:<9}", outcome.status).yellow(),
            FileStatus::Unchanged => format!("{:<9}", outcome.status).dimmed(),
        };
        emit(format!(
            "  {} {} {:<21} {}",
            "✓".green(),
            status,
            outcome.kind.to_string(),
            outcome.path.display()
        ));
    }

    for failure in &report.failures {
        emit(format!(
            "  {} {:<9} {:<21} {}",
            "✗".red(),
            "failed".red().bold(),
            failure.kind.to_string(),
            failure.path.display()
        ));
        for line in failure.error.to_string().lines() {
            emit(format!("      {line}"));
        }
    }
}

/// 全サービスの集計を表示し、失敗がなければ true を返す
pub fn print_summary(reports: &[SynthesisReport], to_stderr: bool) -> bool {
    let count = |status| reports.iter().map(|r| r.count(status)).sum::<usize>();
    let failures: usize = reports.iter().map(|r| r.failures.len()).sum();

    let line = if failures == 0 {
        format!(
            "{} 作成 {} / 更新 {} / 変更なし {}",
            "✓".green().bold(),
            count(FileStatus::Created),
            count(FileStatus::Updated),
            count(FileStatus::Unchanged)
        )
    } else {
        format!(
            "{} {}件のファイルでエラーが発生しました",
            "✗".red().bold(),
            failures
        )
    };

    if to_stderr {
        eprintln!();
        eprintln!("{line}");
    } else {
        println!();
        println!("{line}");
    }

    failures == 0
}
