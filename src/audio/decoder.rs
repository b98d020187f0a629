// src/audio/decoder.rs

use std::io::Cursor;
use std::sync::Arc;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use crate::audio::types::{AudioInfo, AudioSource, DecodedBuffer, PcmBuffer};
use crate::error::{AudioError, Result};

/// An open container plus codec for one source
///
/// Holding one of these is holding the decoding resources; they are released
/// when it is dropped, whether decoding succeeded or not.
pub struct DecodeContext {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: Option<u32>,
    source_name: String,
}

impl DecodeContext {
    /// Probe the source and set up a decoder for its first audio track
    pub fn open(source: &AudioSource) -> Result<Self> {
        let format = probe_format(source)?;

        // Find the default audio track (skip video/subtitle tracks)
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| AudioError::DecodeFailed("No audio track found in file".to_string()))?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::DecodeFailed(format!("Failed to create decoder: {}", e)))?;

        tracing::debug!(source = source.name(), track_id, "decode context acquired");

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            source_name: source.name().to_string(),
        })
    }

    /// Decode every packet of the selected track into planar f32 samples
    pub fn decode_all(&mut self) -> Result<DecodedBuffer> {
        let mut channels: Vec<Vec<f32>> = Vec::new();
        let mut sample_rate = self.sample_rate;
        let mut skipped = 0usize;

        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(AudioError::DecodeFailed(format!("Failed to read packet: {}", e))),
            };

            // Skip packets from other tracks (e.g., video, album art)
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(e) => {
                    match recover_from_decode_error(e)? {
                        Recovery::SkipPacket(msg) => {
                            tracing::warn!(source = %self.source_name, "skipping damaged packet: {}", msg);
                            skipped += 1;
                        }
                        Recovery::Reset => self.decoder.reset(),
                    }
                    continue;
                }
            };

            let spec = *decoded.spec();
            let count = spec.channels.count();
            if channels.is_empty() {
                channels = vec![Vec::new(); count];
            } else if channels.len() != count {
                return Err(AudioError::DecodeFailed(format!(
                    "Channel count changed mid-stream from {} to {}",
                    channels.len(),
                    count
                )));
            }
            if sample_rate.is_none() {
                sample_rate = Some(spec.rate);
            }

            append_decoded(&decoded, &mut channels);
        }

        if skipped > 0 {
            tracing::warn!(source = %self.source_name, skipped, "some packets could not be decoded");
        }

        let sample_rate = sample_rate
            .ok_or_else(|| AudioError::DecodeFailed("Sample rate not found".to_string()))?;
        if channels.first().map_or(true, Vec::is_empty) {
            return Err(AudioError::DecodeFailed("No audio frames could be decoded".to_string()));
        }

        PcmBuffer::new(channels, sample_rate).map_err(|e| AudioError::DecodeFailed(e.to_string()))
    }
}

impl Drop for DecodeContext {
    fn drop(&mut self) {
        tracing::debug!(source = %self.source_name, "decode context released");
    }
}

/// How the packet loop carries on after the codec rejects a packet
#[derive(Debug, PartialEq, Eq)]
enum Recovery {
    SkipPacket(String),
    Reset,
}

/// Damaged packets are skipped; anything else (including I/O) aborts the decode
fn recover_from_decode_error(error: SymphoniaError) -> Result<Recovery> {
    match error {
        SymphoniaError::DecodeError(msg) => Ok(Recovery::SkipPacket(msg.to_string())),
        SymphoniaError::ResetRequired => Ok(Recovery::Reset),
        e => Err(AudioError::DecodeFailed(format!("Decode error: {}", e))),
    }
}

/// Decodes an in-memory audio file to planar PCM samples
///
/// Supports: MP3, FLAC, WAV, OGG Vorbis, AAC, and more via symphonia
///
/// # Example
/// ```no_run
/// use clipwav::audio::{decode_source, AudioSource};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = AudioSource::from_path("interview.mp3")?;
/// let audio = decode_source(&source)?;
/// println!("Loaded {} seconds of audio", audio.duration_seconds());
/// # Ok(())
/// # }
/// ```
pub fn decode_source(source: &AudioSource) -> Result<DecodedBuffer> {
    let mut context = DecodeContext::open(source)?;
    context.decode_all()
}

/// Get audio metadata without decoding all samples
pub fn probe_info(source: &AudioSource) -> Result<AudioInfo> {
    let format = probe_format(source)?;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::DecodeFailed("No audio track".to_string()))?;

    let params = &track.codec_params;
    let sample_rate = params.sample_rate.unwrap_or(0);
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(0);

    // Calculate duration from frame count
    let duration_seconds = match (params.n_frames, params.sample_rate) {
        (Some(n_frames), Some(sr)) if sr > 0 => n_frames as f64 / sr as f64,
        _ => 0.0,
    };

    let format_name = symphonia::default::get_codecs()
        .get_codec(params.codec)
        .map(|d| d.short_name.to_string())
        .unwrap_or_else(|| format!("{:?}", params.codec));

    Ok(AudioInfo {
        duration_seconds,
        sample_rate,
        channels,
        format: format_name,
        bit_depth: params.bits_per_sample.map(|b| b as u16),
    })
}

fn probe_format(source: &AudioSource) -> Result<Box<dyn FormatReader>> {
    let cursor: Cursor<Arc<[u8]>> = Cursor::new(source.shared_bytes());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    // Help symphonia detect the format from what the caller told us
    let mut hint = Hint::new();
    if source.is_audio() {
        hint.mime_type(source.mime_type());
    }
    if let Some(extension) = source.extension() {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| AudioError::DecodeFailed(format!("Failed to probe format: {}", e)))?;

    Ok(probed.format)
}

/// Append one decoded packet to the per-channel sample vectors
///
/// Handles every sample format symphonia produces and converts it to f32
fn append_decoded(decoded: &AudioBufferRef, channels: &mut [Vec<f32>]) {
    match decoded {
        AudioBufferRef::F32(buf) => append_planes(&**buf, channels),
        AudioBufferRef::F64(buf) => append_planes(&**buf, channels),
        AudioBufferRef::S8(buf) => append_planes(&**buf, channels),
        AudioBufferRef::S16(buf) => append_planes(&**buf, channels),
        AudioBufferRef::S24(buf) => append_planes(&**buf, channels),
        AudioBufferRef::S32(buf) => append_planes(&**buf, channels),
        AudioBufferRef::U8(buf) => append_planes(&**buf, channels),
        AudioBufferRef::U16(buf) => append_planes(&**buf, channels),
        AudioBufferRef::U24(buf) => append_planes(&**buf, channels),
        AudioBufferRef::U32(buf) => append_planes(&**buf, channels),
    }
}

fn append_planes<S>(buffer: &AudioBuffer<S>, channels: &mut [Vec<f32>])
where
    S: Sample + IntoSample<f32>,
{
    for (plane, out) in buffer.planes().planes().iter().zip(channels.iter_mut()) {
        out.extend(plane.iter().map(|&s| s.into_sample()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn wav_source(channels: u16, sample_rate: u32, frames: &[Vec<i16>]) -> AudioSource {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
            for frame in frames {
                for &sample in frame {
                    writer.write_sample(sample).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        AudioSource::new(cursor.into_inner(), "audio/wav", "fixture.wav")
    }

    #[test]
    fn test_decode_stereo_wav_is_planar() {
        let frames: Vec<Vec<i16>> = (0..1000).map(|i| vec![i as i16, -(i as i16)]).collect();
        let source = wav_source(2, 8000, &frames);

        let audio = decode_source(&source).unwrap();

        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.frame_count(), 1000);
        assert_eq!(audio.duration_seconds(), 1000.0 / 8000.0);

        let left = audio.channel(0).unwrap();
        let right = audio.channel(1).unwrap();
        assert_eq!(left[10], 10.0 / 32768.0);
        assert_eq!(right[10], -10.0 / 32768.0);
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let source = AudioSource::new(vec![0x42u8; 512], "audio/mpeg", "broken.mp3");
        let err = decode_source(&source).unwrap_err();
        assert!(matches!(err, AudioError::DecodeFailed(_)));
    }

    #[test]
    fn test_empty_data_chunk_fails() {
        let source = wav_source(1, 8000, &[]);
        assert!(matches!(decode_source(&source), Err(AudioError::DecodeFailed(_))));
    }

    #[test]
    fn test_codec_io_error_aborts_decode() {
        let error = SymphoniaError::IoError(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "short read",
        ));
        assert!(matches!(
            recover_from_decode_error(error),
            Err(AudioError::DecodeFailed(_))
        ));
    }

    #[test]
    fn test_damaged_packet_is_skipped() {
        assert_eq!(
            recover_from_decode_error(SymphoniaError::DecodeError("bad frame")).unwrap(),
            Recovery::SkipPacket("bad frame".to_string())
        );
        assert_eq!(
            recover_from_decode_error(SymphoniaError::ResetRequired).unwrap(),
            Recovery::Reset
        );
    }

    #[test]
    fn test_probe_info_reads_header() {
        let frames: Vec<Vec<i16>> = (0..4410).map(|_| vec![0]).collect();
        let source = wav_source(1, 44100, &frames);

        let info = probe_info(&source).unwrap();
        assert_eq!(info.sample_rate, 44100);
        assert_eq!(info.channels, 1);
        assert_eq!(info.bit_depth, Some(16));
        assert!((info.duration_seconds - 0.1).abs() < 1e-9);
    }
}
