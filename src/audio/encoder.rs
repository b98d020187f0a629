// src/audio/encoder.rs

use std::io::Write;

use crate::audio::types::PcmBuffer;
use crate::error::{AudioError, Result};

/// Size of the canonical RIFF/WAVE header written before the samples
pub const WAV_HEADER_LEN: usize = 44;

const BYTES_PER_SAMPLE: u16 = 2;

/// Field values of a 16-bit PCM WAV file for one buffer
///
/// Every size is checked against the 32-bit fields of the RIFF format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavLayout {
    pub channels: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    pub byte_rate: u32,
    pub data_length: u32,
}

impl WavLayout {
    pub fn for_buffer(buffer: &PcmBuffer) -> Result<Self> {
        let channels = u16::try_from(buffer.channel_count()).map_err(|_| {
            AudioError::EncodeFailed(format!("too many channels: {}", buffer.channel_count()))
        })?;
        let block_align = channels.checked_mul(BYTES_PER_SAMPLE).ok_or_else(|| {
            AudioError::EncodeFailed(format!("too many channels: {}", channels))
        })?;
        let byte_rate = buffer
            .sample_rate()
            .checked_mul(u32::from(block_align))
            .ok_or_else(|| AudioError::EncodeFailed("byte rate does not fit in 32 bits".to_string()))?;
        let data_length = u32::try_from(buffer.frame_count())
            .ok()
            .and_then(|frames| frames.checked_mul(u32::from(block_align)))
            .filter(|len| len.checked_add(36).is_some())
            .ok_or_else(|| AudioError::EncodeFailed("audio is too long for a WAV file".to_string()))?;

        Ok(Self {
            channels,
            sample_rate: buffer.sample_rate(),
            block_align,
            byte_rate,
            data_length,
        })
    }

    /// Total file size: header plus sample data
    pub fn file_len(&self) -> usize {
        WAV_HEADER_LEN + self.data_length as usize
    }

    fn write_header<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        // RIFF header
        writer.write_all(b"RIFF")?;
        writer.write_all(&(36 + self.data_length).to_le_bytes())?;
        writer.write_all(b"WAVE")?;

        // fmt chunk
        writer.write_all(b"fmt ")?;
        writer.write_all(&16u32.to_le_bytes())?; // Chunk size (16 for PCM)
        writer.write_all(&1u16.to_le_bytes())?; // Audio format (1 = PCM)
        writer.write_all(&self.channels.to_le_bytes())?;
        writer.write_all(&self.sample_rate.to_le_bytes())?;
        writer.write_all(&self.byte_rate.to_le_bytes())?;
        writer.write_all(&self.block_align.to_le_bytes())?;
        writer.write_all(&(BYTES_PER_SAMPLE * 8).to_le_bytes())?;

        // data chunk
        writer.write_all(b"data")?;
        writer.write_all(&self.data_length.to_le_bytes())?;
        Ok(())
    }
}

/// Convert one float sample to 16-bit PCM
///
/// Negative values scale by 32768 and positive ones by 32767, so both -1.0
/// and 1.0 reach the ends of the i16 range. Out-of-range input is clipped.
pub fn quantize_sample(sample: f32) -> i16 {
    let clipped = f64::from(sample).clamp(-1.0, 1.0);
    if clipped < 0.0 {
        (clipped * 32768.0).round() as i16
    } else {
        (clipped * 32767.0).round() as i16
    }
}

/// Write `buffer` as a 16-bit PCM WAV file
///
/// Samples are interleaved frame by frame (ch0, ch1, ..., ch0, ch1, ...).
pub fn write_wav<W: Write>(writer: &mut W, buffer: &PcmBuffer) -> Result<()> {
    let layout = WavLayout::for_buffer(buffer)?;
    layout.write_header(writer)?;

    let channels = buffer.channels();
    for frame in 0..buffer.frame_count() {
        for channel in channels {
            writer.write_all(&quantize_sample(channel[frame]).to_le_bytes())?;
        }
    }

    Ok(())
}

/// Encode a buffer into an in-memory WAV file
///
/// The output is a pure function of the buffer: same buffer, same bytes.
///
/// # Example
/// ```
/// use clipwav::audio::{encode_wav, PcmBuffer};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let audio = PcmBuffer::new(vec![vec![0.0, 0.5, -0.5, 1.0, -1.0]], 44100)?;
/// let wav = encode_wav(&audio)?;
/// assert_eq!(wav.len(), 44 + 5 * 2);
/// assert_eq!(&wav[0..4], b"RIFF");
/// # Ok(())
/// # }
/// ```
pub fn encode_wav(buffer: &PcmBuffer) -> Result<Vec<u8>> {
    let layout = WavLayout::for_buffer(buffer)?;
    let mut bytes = Vec::new();
    bytes.try_reserve_exact(layout.file_len()).map_err(|e| {
        AudioError::EncodeFailed(format!("Failed to allocate {} bytes: {}", layout.file_len(), e))
    })?;
    write_wav(&mut bytes, buffer)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use std::io::Cursor;

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u16_at(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes(bytes[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_header_for_stereo_44k() {
        let buffer = PcmBuffer::new(vec![vec![0.0; 100], vec![0.0; 100]], 44100).unwrap();
        let wav = encode_wav(&buffer).unwrap();

        assert_eq!(wav.len(), 444);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 436);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u32_at(&wav, 16), 16);
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44100);
        assert_eq!(u32_at(&wav, 28), 176400);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 400);
    }

    #[test]
    fn test_header_stays_44_bytes_for_many_channels() {
        let buffer = PcmBuffer::new(vec![vec![0.25; 3]; 6], 48000).unwrap();
        let wav = encode_wav(&buffer).unwrap();

        assert_eq!(wav.len(), WAV_HEADER_LEN + 3 * 6 * 2);
        assert_eq!(u16_at(&wav, 22), 6);
        assert_eq!(u16_at(&wav, 32), 12);
    }

    #[test]
    fn test_quantization_is_asymmetric() {
        assert_eq!(quantize_sample(1.0), 32767);
        assert_eq!(quantize_sample(-1.0), -32768);
        assert_eq!(quantize_sample(0.0), 0);
        assert_eq!(quantize_sample(0.5), 16384); // 16383.5 rounds away from zero
        assert_eq!(quantize_sample(-0.5), -16384);
        assert_eq!(quantize_sample(0.25), 8192); // 8191.75
        assert_eq!(quantize_sample(-0.25), -8192);
    }

    #[test]
    fn test_quantization_clips() {
        assert_eq!(quantize_sample(1.7), 32767);
        assert_eq!(quantize_sample(-3.0), -32768);
        assert_eq!(quantize_sample(f32::INFINITY), 32767);
        assert_eq!(quantize_sample(f32::NAN), 0);
    }

    #[test]
    fn test_samples_are_interleaved() {
        let buffer = PcmBuffer::new(vec![vec![1.0, 0.0], vec![-1.0, 0.5]], 8000).unwrap();
        let wav = encode_wav(&buffer).unwrap();

        let data: Vec<i16> = wav[WAV_HEADER_LEN..]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(data, vec![32767, -32768, 0, 16384]);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let samples: Vec<f32> = (0..500).map(|i| ((i as f32) * 0.37).sin()).collect();
        let buffer = PcmBuffer::new(vec![samples.clone(), samples], 22050).unwrap();

        assert_eq!(encode_wav(&buffer).unwrap(), encode_wav(&buffer).unwrap());
    }

    #[test]
    fn test_output_reads_back_with_hound() {
        let buffer = PcmBuffer::new(vec![vec![0.0, 0.5, -0.5, 1.0, -1.0]], 44100).unwrap();
        let wav = encode_wav(&buffer).unwrap();

        let mut reader = WavReader::new(Cursor::new(wav)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.bits_per_sample, 16);

        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16384, -16384, 32767, -32768]);
    }

    #[test]
    fn test_too_many_channels_fail() {
        let buffer = PcmBuffer::new(vec![vec![0.0; 1]; 40_000], 8000).unwrap();
        assert!(matches!(encode_wav(&buffer), Err(AudioError::EncodeFailed(_))));
    }
}
