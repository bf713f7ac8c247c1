use crate::TargetArgs;
use crate::utils;
use colored::Colorize;
use kubeforge_manifest::{FsStore, ManifestStore, MemoryStore};

/// マニフェストを生成して環境ディレクトリにマージする
///
/// ドライランでは既存ファイルを読むだけで、結果は標準出力に書く。
pub fn handle(target: &TargetArgs, dry_run: bool) -> anyhow::Result<bool> {
    let profile = utils::parse_profile(&target.profile)?;
    let (services_file, services) = utils::load_services(target)?;
    let env_dir = utils::resolve_env_dir(target)?;
    let config = utils::load_platform(target, Some(&env_dir))?;
    let flags = config.flags();

    let header = [
        format!("サービス定義: {}", services_file.display().to_string().cyan()),
        format!("環境ディレクトリ: {}", env_dir.display().to_string().cyan()),
    ];
    for line in &header {
        if dry_run {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    let mut fs_store = FsStore::new();
    let mut overlay = MemoryStore::overlay();
    let store: &mut dyn ManifestStore = if dry_run { &mut overlay } else { &mut fs_store };

    let mut reports = Vec::with_capacity(services.len());
    for mut model in services {
        utils::prepare(&mut model, profile, &config);
        let report = kubeforge_manifest::synthesize(&model, &flags, &env_dir, store);
        utils::print_report(&report, dry_run);
        reports.push(report);
    }

    let success = utils::print_summary(&reports, dry_run);

    if dry_run {
        for (path, content) in overlay.files() {
            println!("# {}", path.display());
            print!("{content}");
            println!("---");
        }
    }

    Ok(success)
}
