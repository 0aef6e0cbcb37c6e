#[cfg(feature = "cli")]
pub mod cli;
pub mod relay_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use relay_config::RelayConfig;
