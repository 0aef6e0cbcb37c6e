use crate::domain::model::UploadFile;
use std::fmt;

/// 單一檔案大小上限 (15 MiB)
pub const MAX_FILE_SIZE: u64 = 15 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 7] = [
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooLarge { size: u64, limit: u64 },
    UnsupportedType { mime_type: String },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooLarge { limit, .. } => write!(
                f,
                "ファイルサイズが大きすぎます (最大{}MB)",
                limit / (1024 * 1024)
            ),
            Rejection::UnsupportedType { mime_type } => {
                write!(f, "サポートされていないファイル形式です: {}", mime_type)
            }
        }
    }
}

/// 檔案類型與大小檢查，前端篩選與中繼端點共用同一份規則
#[derive(Debug, Clone)]
pub struct FileValidator {
    allowed_types: Vec<String>,
    max_size: u64,
}

impl Default for FileValidator {
    fn default() -> Self {
        Self {
            allowed_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
            max_size: MAX_FILE_SIZE,
        }
    }
}

impl FileValidator {
    pub fn new(allowed_types: Vec<String>, max_size: u64) -> Self {
        Self {
            allowed_types,
            max_size,
        }
    }

    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// 先檢查大小，再檢查類型
    pub fn inspect(&self, mime_type: &str, size: u64) -> Result<(), Rejection> {
        if size > self.max_size {
            return Err(Rejection::TooLarge {
                size,
                limit: self.max_size,
            });
        }

        if !self.allowed_types.iter().any(|allowed| allowed == mime_type) {
            return Err(Rejection::UnsupportedType {
                mime_type: mime_type.to_string(),
            });
        }

        Ok(())
    }

    pub fn check(&self, file: &UploadFile) -> Result<(), Rejection> {
        self.inspect(&file.mime_type, file.size)
    }

    /// 篩選出可接受的檔案；不合格的檔案直接略過，不建立任何紀錄
    pub fn accept(&self, candidates: Vec<UploadFile>) -> Vec<UploadFile> {
        candidates
            .into_iter()
            .filter(|file| match self.check(file) {
                Ok(()) => true,
                Err(rejection) => {
                    tracing::debug!("🚫 Dropping {}: {}", file.name, rejection);
                    false
                }
            })
            .collect()
    }
}
