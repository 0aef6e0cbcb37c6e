use crate::utils::error::{Result, UploadError};
use crate::utils::validation::{validate_non_empty_string, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// 中繼伺服器設定。API URL 與 API Key 缺少時伺服器仍可啟動，
/// 但每個請求都會回應設定錯誤
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct RelayConfigFile {
    relay: RelayConfig,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            bind: default_bind(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env::var("DIFY_API_URL").ok(),
            api_key: env::var("DIFY_API_KEY").ok(),
            bind: env::var("RELAY_BIND").unwrap_or_else(|_| default_bind()),
            timeout_secs: env::var("RELAY_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置，`${VAR}` 會以環境變數取代
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        let file: RelayConfigFile =
            toml::from_str(&processed_content).map_err(|e| UploadError::Configuration {
                message: format!("TOML parsing error: {}", e),
            })?;
        Ok(file.relay)
    }

    /// 空字串或未被取代的 `${VAR}` 視為未設定
    pub fn api_url(&self) -> Option<String> {
        present(&self.api_url)
    }

    pub fn api_key(&self) -> Option<String> {
        present(&self.api_key)
    }

    pub fn is_configured(&self) -> bool {
        self.api_url().is_some() && self.api_key().is_some()
    }
}

impl Validate for RelayConfig {
    fn validate(&self) -> Result<()> {
        if let Some(api_url) = self.api_url() {
            validate_url("relay.api_url", &api_url)?;
        }
        validate_non_empty_string("relay.bind", &self.bind)?;
        validate_range("relay.timeout_secs", self.timeout_secs, 1, 600)?;
        Ok(())
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty() && !is_placeholder(v))
        .map(str::to_string)
}

fn is_placeholder(value: &str) -> bool {
    value.starts_with("${") && value.ends_with('}')
}

/// 替換環境變數 (例如 ${DIFY_API_KEY})；找不到的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| UploadError::Configuration {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
