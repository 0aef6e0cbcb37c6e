use crate::domain::model::{RelaySuccess, UploadFile};
use crate::domain::ports::Submitter;
use crate::utils::error::{Result, UploadError};
use crate::utils::text::{looks_like_html, preview};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

/// JSON 解析失敗時錯誤訊息附帶的預覽長度
const PREVIEW_CHARS: usize = 100;

/// 送往中繼端點的客戶端
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    endpoint: String,
    user_id: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint, user_id)
    }

    pub fn with_client(
        client: Client,
        endpoint: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            user_id: user_id.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Submitter for RelayClient {
    async fn submit(&self, file: &UploadFile) -> Result<RelaySuccess> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new()
            .part("file", part)
            .text("userId", self.user_id.clone());

        tracing::debug!(
            "Sending {} ({}, {} bytes) to {}",
            file.name,
            file.mime_type,
            file.size,
            self.endpoint
        );

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network {
                details: e.to_string(),
            })?;

        let status = response.status().as_u16();
        tracing::debug!("Relay response status: {}", status);

        // 先整段讀成文字，再嘗試解析 JSON
        let body = response.text().await.map_err(|e| UploadError::Network {
            details: e.to_string(),
        })?;

        classify_response(status, &body)
    }
}

/// 依序檢查：空回應、HTML 錯誤頁、JSON 格式、HTTP 狀態、`success` 旗標
pub fn classify_response(status: u16, body: &str) -> Result<RelaySuccess> {
    if body.is_empty() {
        return Err(UploadError::EmptyResponse);
    }

    if looks_like_html(body) {
        return Err(UploadError::UpstreamHtml { status });
    }

    let payload: serde_json::Value =
        serde_json::from_str(body).map_err(|_| UploadError::MalformedJson {
            preview: preview(body, PREVIEW_CHARS),
        })?;

    if !(200..300).contains(&status) {
        let message = message_field(&payload)
            .unwrap_or_else(|| format!("HTTP error! status: {}", status));
        return Err(UploadError::UpstreamApi { status, message });
    }

    if payload.get("success").and_then(|v| v.as_bool()) != Some(true) {
        let message =
            message_field(&payload).unwrap_or_else(|| "API処理が失敗しました".to_string());
        return Err(UploadError::Application { message });
    }

    serde_json::from_value(payload).map_err(|_| UploadError::MalformedJson {
        preview: preview(body, PREVIEW_CHARS),
    })
}

fn message_field(payload: &serde_json::Value) -> Option<String> {
    ["error", "message"]
        .iter()
        .filter_map(|key| payload.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;

    #[test]
    fn test_classify_success() {
        let body = r#"{"success":true,"filename":"r.pdf","renamed_filename":"acme.pdf","company":"Acme","date":"2024-01-05","amount":120.5,"description":"consulting","total_tokens":42}"#;
        let success = classify_response(200, body).unwrap();

        assert_eq!(success.filename, "r.pdf");
        assert_eq!(success.result.renamed_filename, "acme.pdf");
        assert_eq!(success.result.amount, 120.5);
        assert_eq!(success.result.total_tokens, Some(42));
        assert_eq!(success.result.workflow_run_id, None);
    }

    #[test]
    fn test_classify_empty_body() {
        let err = classify_response(200, "").unwrap_err();
        assert!(matches!(err, UploadError::EmptyResponse));
    }

    #[test]
    fn test_classify_html_body_even_with_error_status() {
        let err = classify_response(504, "<!DOCTYPE html><html>Gateway Timeout</html>").unwrap_err();
        assert!(matches!(err, UploadError::UpstreamHtml { status: 504 }));
        assert!(err.to_string().contains("サーバーエラー"));
    }

    #[test]
    fn test_classify_malformed_json_includes_preview() {
        let body = format!("not json {}", "x".repeat(300));
        let err = classify_response(200, &body).unwrap_err();

        match &err {
            UploadError::MalformedJson { preview } => {
                assert_eq!(preview.chars().count(), 100);
                assert!(preview.starts_with("not json"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().starts_with("JSON解析エラー: not json"));
    }

    #[test]
    fn test_classify_error_status_prefers_error_field() {
        let err = classify_response(400, r#"{"success":false,"error":"ファイルが見つかりません"}"#)
            .unwrap_err();
        assert!(matches!(err, UploadError::UpstreamApi { status: 400, .. }));
        assert_eq!(err.to_string(), "ファイルが見つかりません");
    }

    #[test]
    fn test_classify_error_status_falls_back_to_status_code() {
        let err = classify_response(503, r#"{"success":false}"#).unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! status: 503");
        assert_eq!(err.category(), ErrorCategory::Upstream);
    }

    #[test]
    fn test_classify_application_failure() {
        let err = classify_response(200, r#"{"success":false,"error":"workflow failed"}"#)
            .unwrap_err();
        assert!(matches!(err, UploadError::Application { .. }));
        assert_eq!(err.to_string(), "workflow failed");

        let err = classify_response(200, r#"{"renamed_filename":"x.pdf"}"#).unwrap_err();
        assert_eq!(err.to_string(), "API処理が失敗しました");
    }

    #[test]
    fn test_classify_success_with_null_amount_and_numeric_company() {
        let body = r#"{"success":true,"filename":"r.pdf","renamed_filename":"r_renamed.pdf","company":0,"amount":null}"#;
        let success = classify_response(200, body).unwrap();

        assert_eq!(success.result.renamed_filename, "r_renamed.pdf");
        assert_eq!(success.result.company, "");
        assert_eq!(success.result.amount, 0.0);
    }
}
