use crate::core::orchestrator::DEFAULT_PACING;
use crate::relay::DEFAULT_USER_ID;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "receipt-batch")]
#[command(about = "Send receipts to the relay endpoint one by one and collect renamed copies")]
pub struct CliConfig {
    /// Receipt files to process (PDF, JPEG, PNG, GIF, WEBP, SVG; max 15MB each)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[arg(long, default_value = "http://127.0.0.1:3000/api/dify-process")]
    pub relay_url: String,

    #[arg(long, default_value = DEFAULT_USER_ID)]
    pub user_id: String,

    /// Delay between two submissions, in milliseconds
    #[arg(long, default_value_t = DEFAULT_PACING.as_millis() as u64)]
    pub pace_ms: u64,

    /// Write renamed copies of completed files into this directory
    #[arg(long)]
    pub output_dir: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pace_ms)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("relay_url", &self.relay_url)?;
        validate_non_empty_string("user_id", &self.user_id)?;
        if let Some(output_dir) = &self.output_dir {
            validate_non_empty_string("output_dir", output_dir)?;
        }
        Ok(())
    }
}
