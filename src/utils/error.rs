use thiserror::Error;

/// 錯誤分類，對應上傳流程中各類失敗的處理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Upstream,
    Protocol,
    Network,
    Application,
    Internal,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("空のレスポンスが返されました")]
    EmptyResponse,

    #[error("サーバーエラー: HTML応答が返されました (Status: {status})")]
    UpstreamHtml { status: u16 },

    #[error("{message}")]
    UpstreamApi { status: u16, message: String },

    #[error("JSON解析エラー: {preview}...")]
    MalformedJson { preview: String },

    #[error("{message}")]
    Application { message: String },

    #[error("ネットワークエラー: サーバーに接続できません")]
    Network { details: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration value for '{field}': {reason} (got '{value}')")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("File {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: &'static str,
        to: &'static str,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl UploadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UploadError::Configuration { .. } | UploadError::InvalidConfigValue { .. } => {
                ErrorCategory::Configuration
            }
            UploadError::Validation { .. } => ErrorCategory::Validation,
            UploadError::UpstreamHtml { .. } | UploadError::UpstreamApi { .. } => {
                ErrorCategory::Upstream
            }
            UploadError::EmptyResponse
            | UploadError::MalformedJson { .. }
            | UploadError::Serialization(_) => ErrorCategory::Protocol,
            UploadError::Network { .. } | UploadError::Http(_) => ErrorCategory::Network,
            UploadError::Application { .. } => ErrorCategory::Application,
            UploadError::InvalidTransition { .. } | UploadError::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        self.category().recovery_suggestion()
    }
}

impl ErrorCategory {
    pub fn recovery_suggestion(self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "Check DIFY_API_URL / DIFY_API_KEY and the relay settings",
            ErrorCategory::Validation => "Select a PDF or image file of at most 15MB",
            ErrorCategory::Upstream => "Check the workflow API URL and key, then resubmit the file",
            ErrorCategory::Protocol => "Inspect the response preview; a proxy may be rewriting responses",
            ErrorCategory::Network => "Check connectivity to the relay endpoint",
            ErrorCategory::Application => "The workflow rejected the file; review the file contents",
            ErrorCategory::Internal => "Re-run with --verbose and inspect the logs",
        }
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(UploadError::EmptyResponse.to_string(), "空のレスポンスが返されました");
        assert_eq!(
            UploadError::UpstreamHtml { status: 502 }.to_string(),
            "サーバーエラー: HTML応答が返されました (Status: 502)"
        );
        assert_eq!(
            UploadError::Network { details: "connection refused".into() }.to_string(),
            "ネットワークエラー: サーバーに接続できません"
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            UploadError::MalformedJson { preview: "oops".into() }.category(),
            ErrorCategory::Protocol
        );
        assert_eq!(
            UploadError::Application { message: "x".into() }.category(),
            ErrorCategory::Application
        );
        assert_eq!(
            UploadError::UpstreamApi { status: 400, message: "bad".into() }.category(),
            ErrorCategory::Upstream
        );
    }
}
