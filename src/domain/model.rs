use crate::domain::coerce::{
    lenient_amount, lenient_count, lenient_id, lenient_seconds, lenient_text,
};
use crate::utils::error::{Result, UploadError};
use serde::{Deserialize, Serialize};

/// 上游沒有提供建議檔名時使用的預設檔名
pub const FALLBACK_FILENAME: &str = "renamed_file.pdf";

/// 使用者選取的一個檔案（名稱、MIME、大小與內容）
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }
}

/// 一次成功的工作流程執行所萃取出的欄位
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub renamed_filename: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: f64,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub workflow_run_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub elapsed_time: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_tokens: Option<u64>,
}

/// 中繼端點成功回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelaySuccess {
    pub success: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(flatten)]
    pub result: ExtractionResult,
}

/// 中繼端點失敗回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayFailure {
    pub success: bool,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayFailure {
    pub fn new(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details,
        }
    }
}

/// 單一檔案的處理狀態；結果與錯誤訊息只存在於對應的終止狀態
#[derive(Debug, Clone, PartialEq)]
pub enum FileState {
    Pending,
    Processing,
    Completed(ExtractionResult),
    Error(String),
}

impl FileState {
    pub fn label(&self) -> &'static str {
        match self {
            FileState::Pending => "pending",
            FileState::Processing => "processing",
            FileState::Completed(_) => "completed",
            FileState::Error(_) => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FileState::Completed(_) | FileState::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFile {
    pub id: String,
    pub name: String,
    pub file: UploadFile,
    state: FileState,
    progress: u8,
}

impl TrackedFile {
    pub fn new(id: String, file: UploadFile) -> Self {
        Self {
            id,
            name: file.name.clone(),
            file,
            state: FileState::Pending,
            progress: 0,
        }
    }

    pub fn state(&self) -> &FileState {
        &self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, FileState::Pending)
    }

    pub fn result(&self) -> Option<&ExtractionResult> {
        match &self.state {
            FileState::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            FileState::Error(message) => Some(message),
            _ => None,
        }
    }

    /// pending → processing
    pub fn begin(&mut self) -> Result<()> {
        if !self.is_pending() {
            return Err(self.invalid_transition("processing"));
        }
        self.state = FileState::Processing;
        self.progress = 50;
        Ok(())
    }

    /// processing → completed
    pub fn complete(&mut self, result: ExtractionResult) -> Result<()> {
        if !matches!(self.state, FileState::Processing) {
            return Err(self.invalid_transition("completed"));
        }
        self.state = FileState::Completed(result);
        self.progress = 100;
        Ok(())
    }

    /// processing → error
    pub fn fail(&mut self, message: impl Into<String>) -> Result<()> {
        if !matches!(self.state, FileState::Processing) {
            return Err(self.invalid_transition("error"));
        }
        self.state = FileState::Error(message.into());
        self.progress = 0;
        Ok(())
    }

    fn invalid_transition(&self, to: &'static str) -> UploadError {
        UploadError::InvalidTransition {
            id: self.id.clone(),
            from: self.state.label(),
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked() -> TrackedFile {
        TrackedFile::new(
            "1700000000000-0".to_string(),
            UploadFile::new("receipt.pdf", "application/pdf", vec![1, 2, 3]),
        )
    }

    fn sample_result() -> ExtractionResult {
        ExtractionResult {
            renamed_filename: "acme_2024-01-05.pdf".to_string(),
            company: "Acme".to_string(),
            date: "2024-01-05".to_string(),
            amount: 120.5,
            description: "consulting".to_string(),
            workflow_run_id: None,
            elapsed_time: None,
            total_tokens: None,
        }
    }

    #[test]
    fn test_new_file_is_pending() {
        let file = tracked();
        assert_eq!(file.state(), &FileState::Pending);
        assert_eq!(file.progress(), 0);
        assert_eq!(file.file.size, 3);
        assert!(file.result().is_none());
        assert!(file.error().is_none());
    }

    #[test]
    fn test_success_path_sets_result_only() {
        let mut file = tracked();
        file.begin().unwrap();
        assert_eq!(file.progress(), 50);

        file.complete(sample_result()).unwrap();
        assert_eq!(file.progress(), 100);
        assert_eq!(file.result().unwrap().company, "Acme");
        assert!(file.error().is_none());
    }

    #[test]
    fn test_failure_path_sets_error_only() {
        let mut file = tracked();
        file.begin().unwrap();
        file.fail("空のレスポンスが返されました").unwrap();

        assert_eq!(file.progress(), 0);
        assert_eq!(file.error(), Some("空のレスポンスが返されました"));
        assert!(file.result().is_none());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut file = tracked();
        file.begin().unwrap();
        file.complete(sample_result()).unwrap();

        assert!(file.begin().is_err());
        assert!(file.fail("late failure").is_err());
        assert!(file.complete(sample_result()).is_err());
        assert_eq!(file.result().unwrap().amount, 120.5);
    }

    #[test]
    fn test_cannot_complete_without_processing() {
        let mut file = tracked();
        let err = file.complete(sample_result()).unwrap_err();
        assert!(matches!(
            err,
            UploadError::InvalidTransition { from: "pending", to: "completed", .. }
        ));
    }

    #[test]
    fn test_relay_success_wire_shape() {
        let success = RelaySuccess {
            success: true,
            filename: "receipt.pdf".to_string(),
            result: sample_result(),
        };
        let value = serde_json::to_value(&success).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["renamed_filename"], "acme_2024-01-05.pdf");
        assert_eq!(value["amount"], 120.5);
        assert!(value.get("workflow_run_id").is_none());
    }

    #[test]
    fn test_relay_success_accepts_loose_field_types() {
        let value = serde_json::json!({
            "success": true,
            "filename": "receipt.pdf",
            "renamed_filename": "acme.pdf",
            "company": 0,
            "date": 20240105,
            "amount": null,
            "description": null,
            "workflow_run_id": 42,
            "total_tokens": 12.5
        });
        let success: RelaySuccess = serde_json::from_value(value).unwrap();

        assert_eq!(success.result.renamed_filename, "acme.pdf");
        assert_eq!(success.result.company, "");
        assert_eq!(success.result.date, "20240105");
        assert_eq!(success.result.amount, 0.0);
        assert_eq!(success.result.description, "");
        assert_eq!(success.result.workflow_run_id.as_deref(), Some("42"));
        assert_eq!(success.result.total_tokens, None);
    }
}
