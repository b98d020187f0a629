// src/audio/mod.rs

pub mod decoder;
pub mod encoder;
pub mod naming;
pub mod range;
pub mod render;
pub mod types;

// Re-export commonly used items
pub use decoder::{decode_source, probe_info, DecodeContext};
pub use encoder::{encode_wav, quantize_sample, write_wav, WavLayout, WAV_HEADER_LEN};
pub use naming::{display_name, ensure_extension, resolve_name, split_file_name};
pub use range::{resolve_window, RangePolicy};
pub use render::{render_window, RenderContext};
pub use types::{
    AudioInfo, AudioSource, DecodedBuffer, EncodedArtifact, PcmBuffer, RenderedBuffer, TrimRequest,
    TrimWindow, WAV_MIME_TYPE,
};
