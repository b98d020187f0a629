//! Decode and offline-render primitives behind a swappable trait
//!
//! The pipeline never touches symphonia or the render target directly; it
//! goes through an [`AudioPlatform`], so tests (or another backend) can
//! stand in for the real one.

use async_trait::async_trait;

use crate::audio::{decode_source, render_window, AudioSource, DecodedBuffer, RenderedBuffer, TrimWindow};
use crate::error::{AudioError, Result};

#[async_trait]
pub trait AudioPlatform: Send + Sync {
    /// Decode a whole source into memory
    async fn decode(&self, source: &AudioSource) -> Result<DecodedBuffer>;

    /// Render `window` of `buffer` into a new buffer of exact length
    ///
    /// Takes the decoded buffer by value: it is not needed once rendered.
    async fn render_offline(&self, buffer: DecodedBuffer, window: TrimWindow) -> Result<RenderedBuffer>;
}

/// Default platform: symphonia decoding and in-memory rendering
///
/// Both stages run on tokio's blocking pool, so the calling task suspends
/// while other trims keep going. Every call gets its own context.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaPlatform;

#[async_trait]
impl AudioPlatform for SymphoniaPlatform {
    async fn decode(&self, source: &AudioSource) -> Result<DecodedBuffer> {
        let source = source.clone();
        // Run blocking audio processing in a dedicated thread pool
        tokio::task::spawn_blocking(move || decode_source(&source))
            .await
            .map_err(|e| AudioError::DecodeFailed(format!("Task join error: {}", e)))?
    }

    async fn render_offline(&self, buffer: DecodedBuffer, window: TrimWindow) -> Result<RenderedBuffer> {
        tokio::task::spawn_blocking(move || render_window(&buffer, &window))
            .await
            .map_err(|e| AudioError::RenderFailed(format!("Task join error: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{resolve_window, PcmBuffer};

    #[tokio::test]
    async fn test_decode_failure_is_reported() {
        let source = AudioSource::new(vec![1u8, 2, 3, 4], "audio/ogg", "tiny.ogg");
        let err = SymphoniaPlatform.decode(&source).await.unwrap_err();
        assert!(matches!(err, AudioError::DecodeFailed(_)));
    }

    #[tokio::test]
    async fn test_render_offline_exact_length() {
        let buffer = PcmBuffer::new(vec![vec![0.1; 48000]], 48000).unwrap();
        let window = resolve_window(Some(0.25), Some(0.5), buffer.duration_seconds()).unwrap();

        let rendered = SymphoniaPlatform.render_offline(buffer, window).await.unwrap();

        assert_eq!(rendered.frame_count(), 12000);
        assert_eq!(rendered.sample_rate(), 48000);
    }
}
