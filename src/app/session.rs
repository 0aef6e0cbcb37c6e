use crate::app::export::export_completed;
use crate::core::orchestrator::{BatchOrchestrator, BatchSummary};
use crate::core::store::ResultStore;
use crate::core::validator::FileValidator;
use crate::domain::model::UploadFile;
use crate::domain::ports::{Storage, Submitter};
use crate::utils::error::Result;

/// 一次上傳作業：選取檔案、依序送出、保留結果直到移除或清除
pub struct UploadSession<S: Submitter> {
    store: ResultStore,
    validator: FileValidator,
    orchestrator: BatchOrchestrator<S>,
}

impl<S: Submitter> UploadSession<S> {
    pub fn new(orchestrator: BatchOrchestrator<S>) -> Self {
        Self {
            store: ResultStore::new(),
            validator: FileValidator::default(),
            orchestrator,
        }
    }

    pub fn with_validator(mut self, validator: FileValidator) -> Self {
        self.validator = validator;
        self
    }

    /// 驗證後加入清單，回傳實際加入的數量
    pub fn select(&mut self, files: Vec<UploadFile>) -> usize {
        let accepted = self.validator.accept(files);
        let count = accepted.len();
        if count > 0 {
            self.store.add(accepted);
        }
        count
    }

    /// 處理所有待處理檔案。`&mut self` 保證同一時間只有一個批次在執行
    pub async fn start(&mut self) -> BatchSummary {
        self.orchestrator.run(&mut self.store).await
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.store.remove(id)
    }

    pub fn clear(&mut self) {
        self.store.clear();
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// 結束作業並取回結果；更新通道隨之關閉
    pub fn into_store(self) -> ResultStore {
        self.store
    }

    pub async fn export<T: Storage>(&self, storage: &T) -> Result<Vec<String>> {
        export_completed(&self.store, storage).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ExtractionResult, RelaySuccess};
    use crate::utils::error::UploadError;
    use async_trait::async_trait;
    use std::time::Duration;

    /// 檔名含 "bad" 的檔案會失敗
    struct NameSubmitter;

    #[async_trait]
    impl Submitter for NameSubmitter {
        async fn submit(&self, file: &UploadFile) -> Result<RelaySuccess> {
            if file.name.contains("bad") {
                return Err(UploadError::EmptyResponse);
            }
            Ok(RelaySuccess {
                success: true,
                filename: file.name.clone(),
                result: ExtractionResult {
                    renamed_filename: format!("renamed-{}", file.name),
                    ..ExtractionResult::default()
                },
            })
        }
    }

    fn session() -> UploadSession<NameSubmitter> {
        UploadSession::new(BatchOrchestrator::new(NameSubmitter, Duration::ZERO))
    }

    #[test]
    fn test_select_drops_invalid_files() {
        let mut session = session();
        let added = session.select(vec![
            UploadFile::new("a.pdf", "application/pdf", vec![1, 2, 3]),
            UploadFile::new("notes.txt", "text/plain", vec![1]),
            UploadFile::new("b.png", "image/png", vec![1]),
        ]);

        assert_eq!(added, 2);
        assert_eq!(session.store().len(), 2);
        assert_eq!(session.store().files()[0].name, "a.pdf");
        assert_eq!(session.store().files()[1].name, "b.png");
    }

    #[test]
    fn test_select_nothing_valid_leaves_store_unchanged() {
        let mut session = session();
        let added = session.select(vec![UploadFile::new("x.zip", "application/zip", vec![1])]);

        assert_eq!(added, 0);
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_start_then_remove_and_clear() {
        let mut session = session();
        session.select(vec![
            UploadFile::new("a.pdf", "application/pdf", vec![1]),
            UploadFile::new("bad.pdf", "application/pdf", vec![1]),
        ]);

        let summary = session.start().await;
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.failed, 1);

        let stats = session.store().stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.processed, 2);

        let failed_id = session.store().files()[1].id.clone();
        assert!(session.remove(&failed_id));
        assert_eq!(session.store().len(), 1);

        session.clear();
        assert!(session.store().is_empty());
    }
}
