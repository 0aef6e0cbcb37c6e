//! 中繼端點：瀏覽器與工作流程 API 之間唯一持有憑證的伺服器端邊界。
//!
//! - `service` 驗證檔案、轉送請求並整理回應
//! - `normalize` 將 `data.outputs` 攤平並補上預設值
//! - `server` 以 actix-web 提供 `POST /api/dify-process`
//! - `error` 錯誤與 HTTP 狀態碼的對應

pub mod error;
pub mod normalize;
pub mod server;
pub mod service;

pub use error::RelayError;
pub use service::{RelayService, RelaySettings, DEFAULT_USER_ID};
