use crate::domain::model::{RelaySuccess, UploadFile};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 將單一檔案送往中繼端點並回傳已分類的結果
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, file: &UploadFile) -> Result<RelaySuccess>;
}
