//! MFCC feature extraction: waveform → fixed-length coefficient vector.
//!
//! STFT power spectrum → Slaney-style mel filterbank → log compression →
//! orthonormal DCT-II → first [`N_MFCC`] coefficients, averaged over time
//! frames. The framing constants are fixed; the same waveform always yields
//! the same vector.

use std::f64::consts::PI;

use rustfft::{FftPlanner, num_complex::Complex};

use crate::audio::Waveform;
use crate::types::{EmotionError, FeatureVector, N_MFCC};

/// FFT size (and analysis window length).
const N_FFT: usize = 2048;
/// Hop between successive analysis frames.
const HOP_LENGTH: usize = 512;
/// Mel bands feeding the DCT. Must be >= [`N_MFCC`].
const N_MELS: usize = 128;
/// Floor applied before the log to keep silent bands finite.
const POWER_FLOOR: f32 = 1e-10;

/// Extract a time-averaged MFCC [`FeatureVector`] from a mono waveform.
///
/// A waveform too short for a single analysis frame is zero-padded up to one
/// frame internally, so the output length is [`N_MFCC`] unconditionally.
pub fn extract(waveform: &Waveform) -> Result<FeatureVector, EmotionError> {
    if !waveform.samples.iter().all(|s| s.is_finite()) {
        return Err(EmotionError::Feature(
            "waveform contains non-finite samples".into(),
        ));
    }
    if waveform.sample_rate == 0 {
        return Err(EmotionError::Feature("waveform sample rate is zero".into()));
    }

    let frames = power_spectrogram(&waveform.samples);
    let filterbank = mel_filterbank(waveform.sample_rate);

    // Accumulate DCT coefficients per frame, then average over time.
    let mut acc = [0.0f64; N_MFCC];
    for frame in &frames {
        let mut log_mel = [0.0f32; N_MELS];
        for (band, filter) in filterbank.iter().enumerate() {
            let energy: f32 = frame.iter().zip(filter).map(|(p, w)| p * w).sum();
            log_mel[band] = 10.0 * energy.max(POWER_FLOOR).log10();
        }
        for (k, slot) in acc.iter_mut().enumerate() {
            *slot += dct_coefficient(&log_mel, k);
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    let coefficients = {
        let n_frames = frames.len() as f64;
        let mut out = [0.0f32; N_MFCC];
        for (slot, &sum) in out.iter_mut().zip(&acc) {
            *slot = (sum / n_frames) as f32;
        }
        out
    };

    Ok(FeatureVector::new(coefficients))
}

/// Orthonormal DCT-II coefficient `k` of `input`.
fn dct_coefficient(input: &[f32; N_MELS], k: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let sum: f64 = input
        .iter()
        .enumerate()
        .map(|(m, &x)| f64::from(x) * (PI * k as f64 * (2 * m + 1) as f64 / (2 * N_MELS) as f64).cos())
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let scale = if k == 0 {
        (1.0 / N_MELS as f64).sqrt()
    } else {
        (2.0 / N_MELS as f64).sqrt()
    };
    scale * sum
}

/// STFT power spectrogram: one `N_FFT/2 + 1` bin row per frame.
///
/// Input shorter than one window is zero-extended to exactly one frame.
fn power_spectrogram(samples: &[f32]) -> Vec<Vec<f32>> {
    let signal: Vec<f32> = if samples.len() < N_FFT {
        let mut padded = samples.to_vec();
        padded.resize(N_FFT, 0.0);
        padded
    } else {
        samples.to_vec()
    };

    let window = hann_window(N_FFT);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(N_FFT);

    let n_bins = N_FFT / 2 + 1;
    let n_frames = (signal.len() - N_FFT) / HOP_LENGTH + 1;
    let mut frames = Vec::with_capacity(n_frames);

    for frame_idx in 0..n_frames {
        let start = frame_idx * HOP_LENGTH;
        let mut buffer: Vec<Complex<f32>> = signal[start..start + N_FFT]
            .iter()
            .zip(&window)
            .map(|(&s, &w)| Complex::new(s * w, 0.0))
            .collect();

        fft.process(&mut buffer);

        // Onesided power spectrum
        let power: Vec<f32> = buffer[..n_bins]
            .iter()
            .map(|c| c.re * c.re + c.im * c.im)
            .collect();
        frames.push(power);
    }

    frames
}

/// Periodic Hann window: `0.5 * (1 - cos(2*pi*n/N))`.
fn hann_window(size: usize) -> Vec<f32> {
    #[allow(clippy::cast_precision_loss)]
    (0..size)
        .map(|n| {
            let x = 2.0 * std::f32::consts::PI * n as f32 / size as f32;
            0.5 * (1.0 - x.cos())
        })
        .collect()
}

/// Slaney-style mel filterbank: [`N_MELS`] triangular filters over
/// `N_FFT/2 + 1` frequency bins, area-normalized.
///
/// Linear below 1000 Hz, logarithmic above (matches the librosa default the
/// classifier was trained against).
fn mel_filterbank(sample_rate: u32) -> Vec<Vec<f32>> {
    let fmax = f64::from(sample_rate) / 2.0;
    let n_bins = N_FFT / 2 + 1;

    let f_sp = 200.0 / 3.0;
    let min_log_hz = 1000.0;
    let min_log_mel = min_log_hz / f_sp;
    let logstep = 6.4_f64.ln() / 27.0;

    let hz_to_mel = |hz: f64| {
        if hz < min_log_hz {
            hz / f_sp
        } else {
            min_log_mel + (hz / min_log_hz).ln() / logstep
        }
    };
    let mel_to_hz = |mel: f64| {
        if mel < min_log_mel {
            mel * f_sp
        } else {
            min_log_hz * ((mel - min_log_mel) * logstep).exp()
        }
    };

    // N_MELS + 2 edge frequencies, evenly spaced on the mel scale.
    let mel_max = hz_to_mel(fmax);
    #[allow(clippy::cast_precision_loss)]
    let edges: Vec<f64> = (0..N_MELS + 2)
        .map(|i| mel_to_hz(mel_max * i as f64 / (N_MELS + 1) as f64))
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let bin_freqs: Vec<f64> = (0..n_bins)
        .map(|b| b as f64 * f64::from(sample_rate) / N_FFT as f64)
        .collect();

    let mut filterbank = vec![vec![0.0f32; n_bins]; N_MELS];
    for (band, filter) in filterbank.iter_mut().enumerate() {
        let (lower, center, upper) = (edges[band], edges[band + 1], edges[band + 2]);
        if upper <= lower {
            continue;
        }
        // Slaney area normalization
        let norm = 2.0 / (upper - lower);
        for (bin, &freq) in bin_freqs.iter().enumerate() {
            let weight = if freq >= lower && freq <= center && center > lower {
                (freq - lower) / (center - lower)
            } else if freq > center && freq <= upper && upper > center {
                (upper - freq) / (upper - center)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation)]
            {
                filter[bin] = (weight * norm) as f32;
            }
        }
    }
    filterbank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode_waveform;
    use crate::test_wav::write_test_wav;

    fn tone(sample_rate: u32, seconds: f32, freq: f32) -> Waveform {
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let n = (sample_rate as f32 * seconds) as usize;
        let samples = (0..n)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin() * 0.5
            })
            .collect();
        Waveform {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn output_length_is_always_forty() {
        for seconds in [0.01, 0.1, 0.5, 1.0, 3.0] {
            let wf = tone(16_000, seconds, 440.0);
            let v = extract(&wf).unwrap();
            assert_eq!(v.as_slice().len(), 40, "duration {seconds}s");
        }
    }

    #[test]
    fn output_is_finite() {
        let wf = tone(22_050, 1.0, 220.0);
        let v = extract(&wf).unwrap();
        assert!(v.as_slice().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn extraction_is_deterministic() {
        let wf = tone(16_000, 2.0, 330.0);
        let a = extract(&wf).unwrap();
        let b = extract(&wf).unwrap();
        assert_eq!(a, b, "repeat runs must be bit-identical");
    }

    #[test]
    fn silence_yields_forty_coefficients() {
        let wf = Waveform {
            samples: vec![0.0; 16_000],
            sample_rate: 16_000,
        };
        let v = extract(&wf).unwrap();
        assert_eq!(v.as_slice().len(), 40);
        assert!(v.as_slice().iter().all(|c| c.is_finite()));
    }

    #[test]
    fn sub_frame_clip_still_yields_forty() {
        // 10 samples is far below one analysis window
        let wf = Waveform {
            samples: vec![0.1; 10],
            sample_rate: 16_000,
        };
        let v = extract(&wf).unwrap();
        assert_eq!(v.as_slice().len(), 40);
    }

    #[test]
    fn different_content_differs() {
        let a = extract(&tone(16_000, 1.0, 220.0)).unwrap();
        let b = extract(&tone(16_000, 1.0, 880.0)).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn non_finite_sample_is_feature_error() {
        let wf = Waveform {
            samples: vec![0.0, f32::NAN, 0.5],
            sample_rate: 16_000,
        };
        assert!(matches!(extract(&wf), Err(EmotionError::Feature(_))));

        let wf = Waveform {
            samples: vec![f32::INFINITY],
            sample_rate: 16_000,
        };
        assert!(matches!(extract(&wf), Err(EmotionError::Feature(_))));
    }

    #[test]
    fn decoded_file_roundtrip() {
        let tmp = write_test_wav(16_000, 2, 16_000);
        let wf = decode_waveform(tmp.path()).unwrap();
        let v = extract(&wf).unwrap();
        assert_eq!(v.as_slice().len(), 40);
    }

    #[test]
    fn filterbank_rows_are_nonempty() {
        let fb = mel_filterbank(16_000);
        assert_eq!(fb.len(), N_MELS);
        for (band, filter) in fb.iter().enumerate() {
            assert!(
                filter.iter().any(|&w| w > 0.0),
                "band {band} has no support"
            );
        }
    }

    #[test]
    fn hann_window_endpoints() {
        let w = hann_window(8);
        assert!((w[0]).abs() < 1e-7);
        assert!((w[4] - 1.0).abs() < 1e-6);
    }
}
