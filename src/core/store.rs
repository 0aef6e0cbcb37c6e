use crate::domain::model::{FileState, TrackedFile, UploadFile};

/// 批次統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub total: usize,
    pub processed: usize,
    pub completed: usize,
    pub errors: usize,
}

/// 工作階段內的檔案狀態表，依選取順序保存
#[derive(Debug, Default)]
pub struct ResultStore {
    files: Vec<TrackedFile>,
    last_stamp: i64,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一批已驗證的檔案，回傳新加入的 id
    pub fn add(&mut self, files: Vec<UploadFile>) -> Vec<String> {
        self.add_at(chrono::Utc::now().timestamp_millis(), files)
    }

    /// id 格式為 `<毫秒>-<序號>`；同一毫秒內的第二次選取會把毫秒往後推，確保 id 不重複
    pub(crate) fn add_at(&mut self, now_millis: i64, files: Vec<UploadFile>) -> Vec<String> {
        if files.is_empty() {
            return Vec::new();
        }

        let stamp = now_millis.max(self.last_stamp + 1);
        self.last_stamp = stamp;

        let mut ids = Vec::with_capacity(files.len());
        for (index, file) in files.into_iter().enumerate() {
            let id = format!("{}-{}", stamp, index);
            ids.push(id.clone());
            self.files.push(TrackedFile::new(id, file));
        }
        ids
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn get(&self, id: &str) -> Option<&TrackedFile> {
        self.files.iter().find(|f| f.id == id)
    }

    pub fn files(&self) -> &[TrackedFile] {
        &self.files
    }

    pub(crate) fn file_mut(&mut self, index: usize) -> Option<&mut TrackedFile> {
        self.files.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn completed(&self) -> impl Iterator<Item = &TrackedFile> {
        self.files
            .iter()
            .filter(|f| matches!(f.state(), FileState::Completed(_)))
    }

    pub fn stats(&self) -> BatchStats {
        let mut stats = BatchStats {
            total: self.files.len(),
            ..BatchStats::default()
        };

        for file in &self.files {
            match file.state() {
                FileState::Pending => {}
                FileState::Processing => stats.processed += 1,
                FileState::Completed(_) => {
                    stats.processed += 1;
                    stats.completed += 1;
                }
                FileState::Error(_) => {
                    stats.processed += 1;
                    stats.errors += 1;
                }
            }
        }

        stats
    }
}
