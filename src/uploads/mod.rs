pub mod services;

pub use services::{save_profile_image, StoredFile, UploadError, MAX_FILE_BYTES};
