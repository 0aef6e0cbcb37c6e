pub mod error;
pub mod logger;
pub mod mime;
pub mod text;
pub mod validation;
