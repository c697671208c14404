//! Synthetic WAV generation for tests and fixtures.
//!
//! Kept as a regular module so downstream crates can build in-memory WAV
//! payloads in their own integration tests.

/// Build the raw bytes of a minimal valid 16-bit PCM WAV file.
///
/// Frame `i` holds `sample(i)` (clamped to `[-1.0, 1.0]`) on every channel.
pub fn wav_bytes(
    sample_rate: u32,
    channels: u16,
    num_frames: u32,
    sample: impl Fn(u32) -> f32,
) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
    let block_align = channels * bits_per_sample / 8;
    let data_size = num_frames * u32::from(channels) * u32::from(bits_per_sample) / 8;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(file_size as usize + 8);
    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");
    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());
    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for i in 0..num_frames {
        #[allow(clippy::cast_possible_truncation)]
        let value = (sample(i).clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        for _ in 0..channels {
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
    buf
}

#[cfg(test)]
pub use self::files::{write_test_wav, write_test_wav_with};
