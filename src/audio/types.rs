use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::error::{AudioError, Result};

/// MIME type of every artifact the pipeline produces
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Snap distance used when a frame position lands a hair away from an integer
/// because of floating point representation.
const FRAME_EPSILON: f64 = 1e-6;

/// An encoded audio file as handed over by the caller
///
/// The bytes are shared behind an `Arc` so decoding can move to a worker
/// thread without copying the whole file.
#[derive(Debug, Clone)]
pub struct AudioSource {
    bytes: Arc<[u8]>,
    mime_type: String,
    name: String,
}

impl AudioSource {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
            name: name.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| AudioError::FileOpen {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self::new(bytes, mime_type, name))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extension of the original name, without the dot
    pub fn extension(&self) -> Option<&str> {
        Path::new(&self.name).extension().and_then(|e| e.to_str())
    }

    /// Whether the declared MIME type is in the `audio/*` family
    pub fn is_audio(&self) -> bool {
        self.mime_type.starts_with("audio/")
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" | "wave" => WAV_MIME_TYPE,
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        "m4a" | "mp4" => "audio/mp4",
        "aac" => "audio/aac",
        "aif" | "aiff" => "audio/aiff",
        "mka" | "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

/// Planar PCM audio held in memory
///
/// Each channel is its own sequence of 32-bit float samples in the
/// range [-1.0, 1.0]; every channel has exactly `frame_count()` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
}

/// Buffer produced by the decoder
pub type DecodedBuffer = PcmBuffer;

/// Buffer produced by the offline renderer
pub type RenderedBuffer = PcmBuffer;

impl PcmBuffer {
    /// Build a buffer, checking that all channels have the same length
    pub fn new(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(AudioError::InvalidBuffer("sample rate must be positive".to_string()));
        }
        let Some(first) = channels.first() else {
            return Err(AudioError::InvalidBuffer("buffer has no channels".to_string()));
        };
        let frames = first.len();
        if let Some((idx, ragged)) = channels.iter().enumerate().find(|(_, c)| c.len() != frames) {
            return Err(AudioError::InvalidBuffer(format!(
                "channel {} has {} frames, expected {}",
                idx,
                ragged.len(),
                frames
            )));
        }

        Ok(Self {
            channels,
            sample_rate,
        })
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (one sample per channel)
    pub fn frame_count(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration = frame_count / sample_rate
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

/// Resolved `[start, end)` range, in seconds, to extract from a buffer
///
/// Only the range resolver builds these, so `0 <= start < end <= duration`
/// always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrimWindow {
    start_seconds: f64,
    end_seconds: f64,
}

impl TrimWindow {
    pub(crate) fn new(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    pub fn start_seconds(&self) -> f64 {
        self.start_seconds
    }

    pub fn end_seconds(&self) -> f64 {
        self.end_seconds
    }

    pub fn span_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Output length in frames: `ceil(span * sample_rate)`, never less than one
    pub fn frame_count(&self, sample_rate: u32) -> usize {
        let exact = self.span_seconds() * sample_rate as f64;
        let frames = snap_to_frame(exact)
            .filter(|&nearest| nearest >= 1.0)
            .unwrap_or_else(|| exact.ceil());
        (frames as usize).max(1)
    }

    /// Index of the source frame the window starts in
    pub fn start_frame(&self, sample_rate: u32) -> usize {
        let exact = self.start_seconds * sample_rate as f64;
        snap_to_frame(exact).unwrap_or_else(|| exact.floor()) as usize
    }
}

fn snap_to_frame(exact: f64) -> Option<f64> {
    let nearest = exact.round();
    ((exact - nearest).abs() < FRAME_EPSILON).then_some(nearest)
}

/// What the caller asked for, before any normalization
///
/// Values may be in seconds or milliseconds; see [`crate::audio::range`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimRequest {
    pub start: Option<f64>,
    pub end: Option<f64>,
    pub target_name: Option<String>,
}

impl TrimRequest {
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            target_name: None,
        }
    }

    /// Keep the whole file
    pub fn full() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.target_name = Some(name.into());
        self
    }
}

/// A finished WAV file ready to hand to an uploader
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedArtifact {
    bytes: Vec<u8>,
    name: String,
    window: TrimWindow,
}

impl EncodedArtifact {
    pub fn new(bytes: Vec<u8>, name: String, window: TrimWindow) -> Self {
        Self { bytes, name, window }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved range the clip was cut from
    pub fn window(&self) -> TrimWindow {
        self.window
    }

    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<u8>, String) {
        (self.bytes, self.name)
    }
}

/// Metadata about an audio file without decoding all samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioInfo {
    /// Total duration in seconds (0.0 when the container does not say)
    pub duration_seconds: f64,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Number of channels
    pub channels: u16,

    /// Audio format/codec name (e.g., "MP3", "FLAC", "Vorbis")
    pub format: String,

    /// Bit depth if available (e.g., 16, 24)
    pub bit_depth: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_frames_over_rate() {
        let buffer = PcmBuffer::new(vec![vec![0.0; 22050], vec![0.0; 22050]], 44100).unwrap();
        assert_eq!(buffer.frame_count(), 22050);
        assert_eq!(buffer.channel_count(), 2);
        assert_eq!(buffer.duration_seconds(), 0.5);
    }

    #[test]
    fn test_ragged_channels_rejected() {
        let result = PcmBuffer::new(vec![vec![0.0; 10], vec![0.0; 9]], 8000);
        assert!(matches!(result, Err(AudioError::InvalidBuffer(_))));
    }

    #[test]
    fn test_zero_rate_and_no_channels_rejected() {
        assert!(PcmBuffer::new(vec![vec![0.0; 10]], 0).is_err());
        assert!(PcmBuffer::new(Vec::new(), 44100).is_err());
    }

    #[test]
    fn test_window_frame_count_rounds_up() {
        let window = TrimWindow::new(0.0, 0.00001);
        assert_eq!(window.frame_count(44100), 1);

        let window = TrimWindow::new(1.0, 1.5);
        assert_eq!(window.frame_count(44100), 22050);
    }

    #[test]
    fn test_window_frame_count_absorbs_float_noise() {
        // 100 / 44100 * 44100 is not exactly 100 in f64
        let duration = 100.0 / 44100.0;
        let window = TrimWindow::new(0.0, duration);
        assert_eq!(window.frame_count(44100), 100);
    }

    #[test]
    fn test_sub_frame_window_still_renders_one_frame() {
        // Resolver accepts this: end > start, but the span is far below one frame
        let window = TrimWindow::new(3.9999999999, 4.0);
        assert_eq!(window.frame_count(8000), 1);

        let window = TrimWindow::new(0.0, 1e-12);
        assert_eq!(window.frame_count(44100), 1);
    }

    #[test]
    fn test_window_start_frame_floors() {
        let window = TrimWindow::new(0.25, 1.0);
        assert_eq!(window.start_frame(10), 2);
        assert_eq!(window.frame_count(10), 8);

        // 0.3 * 10 is 3.0000000000000004
        let window = TrimWindow::new(0.3, 1.0);
        assert_eq!(window.start_frame(10), 3);
        assert_eq!(window.frame_count(10), 7);
    }

    #[test]
    fn test_source_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.MP3");
        std::fs::write(&path, b"not really mp3").unwrap();

        let source = AudioSource::from_path(&path).unwrap();
        assert_eq!(source.mime_type(), "audio/mpeg");
        assert_eq!(source.name(), "clip.MP3");
        assert_eq!(source.extension(), Some("MP3"));
        assert!(source.is_audio());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = AudioSource::from_path("/definitely/not/here.wav").unwrap_err();
        assert!(matches!(err, AudioError::FileOpen { .. }));
    }
}
