//! # Vellum Service
//!
//! The editor's boundary with the surrounding CMS: save scheduling and
//! the two-phase image upload client. Document mutation never happens
//! here — the service layer moves strings and bytes, and the editor
//! inserts nodes only after this layer confirms success.

pub mod save;
pub mod upload;

pub use save::{AutoSave, SaveHandler, SaveResult, SaveState, SaveStatus};
pub use upload::{
    ImageFile, UploadClient, UploadError, UploadedImage, ALLOWED_IMAGE_TYPES, MAX_FILE_SIZE,
};
