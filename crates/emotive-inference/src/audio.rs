//! Audio decoding: staged file → mono f32 waveform at native sample rate.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::types::EmotionError;

/// Only the leading seconds of a clip carry the features the model was
/// trained on; everything after is discarded.
pub const CLIP_SECONDS: u32 = 3;

/// A decoded mono waveform.
///
/// Holds at most `sample_rate * CLIP_SECONDS` samples. Shorter clips stay
/// shorter — truncation only, never padding.
#[derive(Debug, Clone)]
pub struct Waveform {
    /// Mono samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    /// Native sample rate of the source, in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Clip duration in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

/// Decode an audio file into a mono [`Waveform`], truncated to the first
/// [`CLIP_SECONDS`] seconds.
///
/// WAV is the canonical format; any container symphonia probes successfully
/// is accepted. Multi-channel input is collapsed to mono by averaging
/// channel samples pointwise. The source sample rate is preserved — no
/// resampling and no leading offset.
pub fn decode_waveform(path: &Path) -> Result<Waveform, EmotionError> {
    let file = File::open(path).map_err(|e| EmotionError::Decode(format!("open input: {e}")))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let _ = hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| EmotionError::Decode(format!("probe failed: {e}")))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| EmotionError::Decode("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| EmotionError::Decode("source sample rate unknown".into()))?;
    let channels = codec_params.channels.map_or(1, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| EmotionError::Decode(format!("codec init failed: {e}")))?;

    let max_samples = sample_rate as usize * CLIP_SECONDS as usize;
    let mut samples: Vec<f32> = Vec::new();

    'packets: loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(EmotionError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| EmotionError::Decode(format!("decode: {e}")))?;

        let spec = *decoded.spec();
        let n_frames = decoded.capacity();
        let mut sample_buf = SampleBuffer::<f32>::new(n_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        let interleaved = sample_buf.samples();

        // Mix to mono
        if channels > 1 {
            for chunk in interleaved.chunks(channels) {
                #[allow(clippy::cast_precision_loss)]
                let mono: f32 = chunk.iter().sum::<f32>() / channels as f32;
                samples.push(mono);
                if samples.len() >= max_samples {
                    break 'packets;
                }
            }
        } else {
            samples.extend_from_slice(interleaved);
            if samples.len() >= max_samples {
                break 'packets;
            }
        }
    }

    if samples.is_empty() {
        return Err(EmotionError::Decode("no audio samples decoded".into()));
    }

    samples.truncate(max_samples);
    Ok(Waveform {
        samples,
        sample_rate,
    })
}
