// Application layer: the upload session that ties validation, the result store
// and the batch orchestrator together, plus terminal rendering and export.

pub mod display;
pub mod export;
pub mod session;

pub use session::UploadSession;
