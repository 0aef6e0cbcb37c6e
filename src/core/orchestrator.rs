use crate::core::store::ResultStore;
use crate::domain::model::{FileState, TrackedFile};
use crate::domain::ports::Submitter;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// 兩次送出之間的預設間隔
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// 狀態轉換後送給顯示層的快照
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpdate {
    pub id: String,
    pub name: String,
    pub status: &'static str,
    pub progress: u8,
    pub detail: Option<String>,
}

impl From<&TrackedFile> for FileUpdate {
    fn from(file: &TrackedFile) -> Self {
        let detail = match file.state() {
            FileState::Completed(result) => Some(result.renamed_filename.clone()),
            FileState::Error(message) => Some(message.clone()),
            _ => None,
        };

        Self {
            id: file.id.clone(),
            name: file.name.clone(),
            status: file.state().label(),
            progress: file.progress(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// 依序處理批次中所有 pending 檔案；同一時間最多只有一個請求在途
pub struct BatchOrchestrator<S: Submitter> {
    submitter: S,
    pacing: Duration,
    updates: Option<UnboundedSender<FileUpdate>>,
}

impl<S: Submitter> BatchOrchestrator<S> {
    pub fn new(submitter: S, pacing: Duration) -> Self {
        Self {
            submitter,
            pacing,
            updates: None,
        }
    }

    pub fn with_updates(mut self, sender: UnboundedSender<FileUpdate>) -> Self {
        self.updates = Some(sender);
        self
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub async fn run(&self, store: &mut ResultStore) -> BatchSummary {
        let mut summary = BatchSummary::default();

        tracing::info!("🚀 Starting batch of {} files", store.len());

        for index in 0..store.len() {
            let Some(file) = store.file_mut(index) else {
                break;
            };

            if !file.is_pending() {
                tracing::debug!("⏭️ Skipping {} ({})", file.name, file.state().label());
                summary.skipped += 1;
                continue;
            }

            if let Err(e) = file.begin() {
                tracing::warn!("⚠️ {}", e);
                summary.skipped += 1;
                continue;
            }
            self.publish(file);
            summary.attempted += 1;

            tracing::info!("📤 Submitting {} ({} bytes)", file.name, file.file.size);
            let outcome = self.submitter.submit(&store.files()[index].file).await;

            let Some(file) = store.file_mut(index) else {
                break;
            };
            let transition = match outcome {
                Ok(success) => {
                    tracing::info!(
                        "✅ {} → {}",
                        file.name,
                        success.result.renamed_filename
                    );
                    summary.completed += 1;
                    file.complete(success.result)
                }
                Err(e) => {
                    tracing::warn!("❌ {} failed: {}", file.name, e);
                    summary.failed += 1;
                    file.fail(e.to_string())
                }
            };
            if let Err(e) = transition {
                tracing::warn!("⚠️ {}", e);
            }
            self.publish(file);

            tokio::time::sleep(self.pacing).await;
        }

        tracing::info!(
            "📊 Batch finished: {} completed, {} failed, {} skipped",
            summary.completed,
            summary.failed,
            summary.skipped
        );

        summary
    }

    fn publish(&self, file: &TrackedFile) {
        if let Some(sender) = &self.updates {
            // 顯示層已關閉時不影響批次
            let _ = sender.send(FileUpdate::from(file));
        }
    }
}
