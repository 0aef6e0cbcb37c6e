pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod relay;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, RelayClient};
pub use app::UploadSession;
pub use config::RelayConfig;
pub use core::orchestrator::{BatchOrchestrator, BatchSummary, FileUpdate};
pub use core::store::{BatchStats, ResultStore};
pub use core::validator::FileValidator;
pub use relay::{RelayError, RelayService};
pub use utils::error::{Result, UploadError};
