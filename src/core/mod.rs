pub mod orchestrator;
pub mod store;
pub mod validator;

pub use crate::domain::model::{ExtractionResult, FileState, RelaySuccess, TrackedFile, UploadFile};
pub use crate::domain::ports::{Storage, Submitter};
pub use crate::utils::error::Result;
