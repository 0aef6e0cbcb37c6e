use clap::Parser;
use receipt_relay::relay::server;
use receipt_relay::utils::{logger, validation::Validate};
use receipt_relay::RelayConfig;

#[derive(Parser)]
#[command(name = "relay-server")]
#[command(about = "Relay endpoint that forwards receipt uploads to the Dify workflow API")]
struct Args {
    /// Path to TOML configuration file; environment variables are used when omitted
    #[arg(short, long)]
    config: Option<String>,

    /// Override the listen address
    #[arg(long)]
    bind: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_server_logger(args.json_logs);

    let mut config = match &args.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match RelayConfig::from_file(path) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("❌ Failed to load config file '{}': {}", path, e);
                    eprintln!("💡 Make sure the file exists and is valid TOML format");
                    std::process::exit(1);
                }
            }
        }
        None => RelayConfig::from_env(),
    };

    if let Some(bind) = args.bind {
        tracing::info!("🔧 Bind address overridden to: {}", bind);
        config.bind = bind;
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    server::run(config).await
}
