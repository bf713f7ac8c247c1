use crate::TargetArgs;
use crate::utils;
use colored::Colorize;
use kubeforge_manifest::MemoryStore;
use std::path::PathBuf;

/// サービス定義を読み込み、メモリ上でマニフェストを生成して検証する
///
/// 環境ディレクトリが見つかれば既存ファイルとのマージまで確認する。
pub fn handle(target: &TargetArgs) -> anyhow::Result<bool> {
    println!("{}", "サービス定義を検証中...".blue());

    let profile = utils::parse_profile(&target.profile)?;
    let (services_file, services) = utils::load_services(target)?;
    println!("サービス定義: {}", services_file.display().to_string().cyan());

    let env_dir = utils::resolve_env_dir(target).ok();
    let config = utils::load_platform(target, env_dir.as_deref())?;
    let flags = config.flags();

    let mut store = match &env_dir {
        Some(dir) => {
            println!("環境ディレクトリ: {}", dir.display().to_string().cyan());
            MemoryStore::overlay()
        }
        None => MemoryStore::new(),
    };
    let env_dir = env_dir.unwrap_or_else(|| PathBuf::from("."));

    let mut reports = Vec::with_capacity(services.len());
    for mut model in services {
        utils::prepare(&mut model, profile, &config);
        let report = kubeforge_manifest::synthesize(&model, &flags, &env_dir, &mut store);
        utils::print_report(&report, false);
        reports.push(report);
    }

    let success = utils::print_summary(&reports, false);
    if success {
        println!("{}", "✓ サービス定義は正常です！".green().bold());
    }
    Ok(success)
}
