use crate::core::validator::Rejection;
use crate::domain::model::RelayFailure;
use crate::utils::error::ErrorCategory;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// 中繼端點對外回報的錯誤，每一種都對應固定的 HTTP 狀態碼
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("サーバー設定エラー: API URLまたはAPI Keyが設定されていません")]
    Configuration,

    #[error("ファイルが見つかりません")]
    MissingFile,

    #[error("{0}")]
    Rejected(Rejection),

    #[error("Dify API エラー ({status}): サーバーエラーが発生しました。API URLとKeyを確認してください。")]
    UpstreamHtml { status: u16 },

    #[error("Dify API エラー: {message}")]
    UpstreamJson { status: u16, message: String },

    #[error("Dify API エラー ({status}): {body}")]
    UpstreamText { status: u16, body: String },

    #[error("レスポンス解析エラー: 無効なJSON形式です。レスポンス: {preview}...")]
    MalformedJson { preview: String },

    #[error("無効なレスポンス形式: {payload}")]
    UnexpectedShape { payload: String },

    #[error("ネットワークエラー: Dify APIに接続できません。URL設定を確認してください。")]
    Network { details: String },

    #[error("{message}")]
    Internal {
        message: String,
        details: Option<String>,
    },
}

impl RelayError {
    pub fn internal(err: impl std::fmt::Debug + std::fmt::Display) -> Self {
        RelayError::Internal {
            message: err.to_string(),
            details: Some(format!("{:?}", err)),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            RelayError::Configuration => ErrorCategory::Configuration,
            RelayError::MissingFile | RelayError::Rejected(_) => ErrorCategory::Validation,
            RelayError::UpstreamHtml { .. }
            | RelayError::UpstreamJson { .. }
            | RelayError::UpstreamText { .. } => ErrorCategory::Upstream,
            RelayError::MalformedJson { .. } | RelayError::UnexpectedShape { .. } => {
                ErrorCategory::Protocol
            }
            RelayError::Network { .. } => ErrorCategory::Network,
            RelayError::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// 只有非網路類的內部錯誤才附上除錯細節
    pub fn details(&self) -> Option<String> {
        match self {
            RelayError::Internal { details, .. } => details.clone(),
            _ => None,
        }
    }

    pub fn to_failure(&self) -> RelayFailure {
        RelayFailure::new(self.to_string(), self.details())
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingFile | RelayError::Rejected(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamJson { status, .. } | RelayError::UpstreamText { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            RelayError::Configuration
            | RelayError::UpstreamHtml { .. }
            | RelayError::MalformedJson { .. }
            | RelayError::UnexpectedShape { .. }
            | RelayError::Network { .. }
            | RelayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.to_failure())
    }
}
