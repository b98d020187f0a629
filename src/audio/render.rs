// src/audio/render.rs

use crate::audio::types::{PcmBuffer, RenderedBuffer, TrimWindow};
use crate::error::{AudioError, Result};

/// An isolated, fixed-length render target
///
/// The target is allocated up front at its final length, so whatever the
/// source looks like the rendered buffer always has exactly `frame_count`
/// frames. Frames the source does not cover stay silent.
#[derive(Debug)]
pub struct RenderContext {
    target: Vec<Vec<f32>>,
    frame_count: usize,
    sample_rate: u32,
}

impl RenderContext {
    /// Allocate a silent target of `channel_count` x `frame_count` samples
    pub fn new(channel_count: usize, frame_count: usize, sample_rate: u32) -> Result<Self> {
        if channel_count == 0 || frame_count == 0 || sample_rate == 0 {
            return Err(AudioError::RenderFailed(format!(
                "cannot render {} channels x {} frames at {} Hz",
                channel_count, frame_count, sample_rate
            )));
        }

        let mut target = Vec::new();
        target.try_reserve_exact(channel_count).map_err(|e| {
            AudioError::RenderFailed(format!("Failed to allocate render target: {}", e))
        })?;
        for _ in 0..channel_count {
            let mut channel = Vec::new();
            channel.try_reserve_exact(frame_count).map_err(|e| {
                AudioError::RenderFailed(format!("Failed to allocate render target: {}", e))
            })?;
            channel.resize(frame_count, 0.0);
            target.push(channel);
        }

        tracing::debug!(channel_count, frame_count, sample_rate, "render context acquired");

        Ok(Self {
            target,
            frame_count,
            sample_rate,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Play `source` from `offset_frame` into the target until it is full
    pub fn render(mut self, source: &PcmBuffer, offset_frame: usize) -> Result<RenderedBuffer> {
        if source.channel_count() != self.target.len() {
            return Err(AudioError::RenderFailed(format!(
                "source has {} channels, render target has {}",
                source.channel_count(),
                self.target.len()
            )));
        }
        if source.sample_rate() != self.sample_rate {
            return Err(AudioError::RenderFailed(format!(
                "source is {} Hz, render target is {} Hz",
                source.sample_rate(),
                self.sample_rate
            )));
        }

        let available = source.frame_count().saturating_sub(offset_frame);
        let copied = available.min(self.frame_count);

        if copied > 0 {
            for (out, input) in self.target.iter_mut().zip(source.channels()) {
                out[..copied].copy_from_slice(&input[offset_frame..offset_frame + copied]);
            }
        }

        let target = std::mem::take(&mut self.target);
        PcmBuffer::new(target, self.sample_rate).map_err(|e| AudioError::RenderFailed(e.to_string()))
    }
}

impl Drop for RenderContext {
    fn drop(&mut self) {
        tracing::debug!(frame_count = self.frame_count, "render context released");
    }
}

/// Render the part of `buffer` covered by `window` into a new buffer
///
/// The output has the source's channel count and sample rate and exactly
/// `window.frame_count(sample_rate)` frames.
pub fn render_window(buffer: &PcmBuffer, window: &TrimWindow) -> Result<RenderedBuffer> {
    let sample_rate = buffer.sample_rate();
    let context = RenderContext::new(
        buffer.channel_count(),
        window.frame_count(sample_rate),
        sample_rate,
    )?;
    context.render(buffer, window.start_frame(sample_rate))
}
