//! Decode → resolve → render → encode → name, for one source at a time

use crate::audio::{encode_wav, resolve_name, AudioSource, EncodedArtifact, TrimRequest};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::platform::{AudioPlatform, SymphoniaPlatform};
use crate::upload::{UploadReceipt, Uploader};

/// Turns an audio source plus a requested range into a WAV clip
///
/// A pipeline holds no per-trim state: every call to [`TrimPipeline::trim`]
/// works on its own buffers, so one pipeline can serve concurrent trims.
/// Any failure discards everything decoded or rendered so far.
#[derive(Debug, Clone, Default)]
pub struct TrimPipeline<P = SymphoniaPlatform> {
    platform: P,
    config: PipelineConfig,
}

impl TrimPipeline<SymphoniaPlatform> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_platform(SymphoniaPlatform, config)
    }
}

impl<P: AudioPlatform> TrimPipeline<P> {
    pub fn with_platform(platform: P, config: PipelineConfig) -> Self {
        Self { platform, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Trim `source` to the requested range and encode it as 16-bit WAV
    ///
    /// # Example
    /// ```no_run
    /// use clipwav::{AudioSource, PipelineConfig, TrimPipeline, TrimRequest};
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pipeline = TrimPipeline::new(PipelineConfig::default());
    /// let source = AudioSource::from_path("interview.mp3")?;
    /// let clip = pipeline.trim(&source, &TrimRequest::new(12.0, 45.5)).await?;
    /// assert_eq!(clip.name(), "interview.wav");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn trim(&self, source: &AudioSource, request: &TrimRequest) -> Result<EncodedArtifact> {
        let decoded = self.platform.decode(source).await?;
        let duration = decoded.duration_seconds();

        let window = self.config.range.resolve(request.start, request.end, duration)?;
        tracing::debug!(
            source = source.name(),
            start = window.start_seconds(),
            end = window.end_seconds(),
            duration,
            "trim window resolved"
        );

        let rendered = self.platform.render_offline(decoded, window).await?;
        let bytes = encode_wav(&rendered)?;
        let name = resolve_name(request.target_name.as_deref(), source.name());

        tracing::info!(
            source = source.name(),
            name = %name,
            start = window.start_seconds(),
            end = window.end_seconds(),
            frames = rendered.frame_count(),
            bytes = bytes.len(),
            "clip encoded"
        );

        Ok(EncodedArtifact::new(bytes, name, window))
    }

    /// Trim `source` and hand the clip straight to `uploader`
    pub async fn trim_and_upload(
        &self,
        source: &AudioSource,
        request: &TrimRequest,
        uploader: &dyn Uploader,
    ) -> Result<UploadReceipt> {
        let artifact = self.trim(source, request).await?;
        uploader.create(artifact).await
    }
}
