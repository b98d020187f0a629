pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod upload;

// Re-export for convenience
pub use audio::*;
pub use config::PipelineConfig;
pub use error::{AudioError, ErrorKind, Result};
pub use pipeline::TrimPipeline;
pub use platform::{AudioPlatform, SymphoniaPlatform};
pub use upload::{DirectoryUploader, UploadReceipt, Uploader};
