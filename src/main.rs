use clap::Parser;
use receipt_relay::app::display;
use receipt_relay::app::export::export_completed;
use receipt_relay::domain::model::UploadFile;
use receipt_relay::domain::ports::Storage;
use receipt_relay::utils::{logger, mime::mime_from_path, validation::Validate};
use receipt_relay::{BatchOrchestrator, CliConfig, LocalStorage, RelayClient, UploadSession};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting receipt-batch CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let files = load_files(&config.files).await;

    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();
    let client = RelayClient::new(config.relay_url.clone(), config.user_id.clone());
    let orchestrator = BatchOrchestrator::new(client, config.pacing()).with_updates(sender);
    let mut session = UploadSession::new(orchestrator);

    let added = session.select(files);
    if added == 0 {
        eprintln!("❌ 処理できるファイルがありません (PDF または画像、最大15MB)");
        std::process::exit(1);
    }
    tracing::info!("📋 {} files queued", added);

    let printer = tokio::spawn(async move {
        while let Some(update) = receiver.recv().await {
            println!("{}", display::render_update(&update));
        }
    });

    let summary = session.start().await;

    // 取回結果後更新通道關閉，等待進度輸出結束
    let store = session.into_store();
    let _ = printer.await;

    println!();
    println!("{}", display::render(&store));

    if let Some(output_dir) = &config.output_dir {
        let storage = LocalStorage::new(output_dir.clone());
        match export_completed(&store, &storage).await {
            Ok(written) => {
                println!("📁 {} files saved to: {}", written.len(), output_dir);
            }
            Err(e) => {
                tracing::error!("❌ Export failed: {} (Category: {:?})", e, e.category());
                eprintln!("❌ {}", e);
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        }
    }

    if summary.failed > 0 {
        std::process::exit(2);
    }

    Ok(())
}

/// 讀取命令列指定的檔案；讀取失敗的檔案只記錄警告
async fn load_files(paths: &[std::path::PathBuf]) -> Vec<UploadFile> {
    let storage = LocalStorage::new(String::new());
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        let Some(path_str) = path.to_str() else {
            tracing::warn!("⚠️ Skipping non UTF-8 path: {}", path.display());
            continue;
        };

        match storage.read_file(path_str).await {
            Ok(bytes) => {
                let name = Path::new(path_str)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path_str.to_string());
                files.push(UploadFile::new(name, mime_from_path(path), bytes));
            }
            Err(e) => {
                tracing::warn!("⚠️ Cannot read {}: {}", path.display(), e);
            }
        }
    }

    files
}
