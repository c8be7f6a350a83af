use mv_core::config::TempoConfig;
use realfft::num_complex::Complex;
use realfft::RealFftPlanner;

/// Energy under which an onset envelope is considered flat.
const MIN_ENVELOPE_ENERGY: f64 = 1e-9;

/// Mean onset strength (band-averaged dB rise per frame) below which the
/// input has no onsets worth a tempo. A steady tone stays far under it.
pub const MIN_ONSET_STRENGTH: f32 = 0.02;

/// Scale applied to the tempogram before the log compression.
const TEMPOGRAM_GAIN: f64 = 1e6;

/// Estimate the dominant tempo of an onset envelope, in BPM.
///
/// The envelope is cut into Hann-windowed `ac_size_secs` windows centred on
/// every frame. Each window is autocorrelated and normalised by its zero-lag
/// peak, and the windows are averaged into a global tempogram. Each lag is
/// scored as `ln(1 + 1e6·tg) + logprior`, where the log-normal prior is
/// centred on `start_bpm` and `std_bpm` octaves wide. Lags at or above
/// `max_tempo` are excluded. The best lag is refined by parabolic
/// interpolation.
///
/// Returns `None` when the envelope carries no onsets (silence, steady
/// tones, DC), in which case the tempo is undefined.
///
/// # Example
/// ```
/// use mv_audio::tempo::estimate_tempo;
/// use mv_core::config::TempoConfig;
/// assert_eq!(estimate_tempo(&[0.0; 500], 22050, 512, &TempoConfig::default()), None);
/// ```
#[must_use]
pub fn estimate_tempo(
    envelope: &[f32],
    sample_rate: u32,
    hop_length: usize,
    config: &TempoConfig,
) -> Option<f32> {
    if envelope.len() < 3 || sample_rate == 0 || hop_length == 0 {
        return None;
    }

    let energy: f64 = envelope.iter().map(|&v| f64::from(v) * f64::from(v)).sum();
    if energy < MIN_ENVELOPE_ENERGY {
        return None;
    }
    let strength = envelope.iter().sum::<f32>() / envelope.len() as f32;
    if strength < MIN_ONSET_STRENGTH {
        log::debug!("tempo: onset strength {strength:.4} too weak, tempo undefined");
        return None;
    }

    let frame_rate = f64::from(sample_rate) / hop_length as f64;
    let win_length = ((f64::from(config.ac_size_secs) * frame_rate).round() as usize).max(4);
    let tempogram = mean_tempogram(envelope, win_length);

    let lag_bpm = |lag: f64| 60.0 * frame_rate / lag;
    let log_start = f64::from(config.start_bpm).log2();
    let std = f64::from(config.std_bpm);
    let max_tempo = f64::from(config.max_tempo);

    let scores: Vec<f64> = tempogram
        .iter()
        .enumerate()
        .map(|(lag, &tg)| {
            if lag == 0 {
                return f64::NEG_INFINITY;
            }
            let bpm = lag_bpm(lag as f64);
            if bpm >= max_tempo {
                return f64::NEG_INFINITY;
            }
            let z = (bpm.log2() - log_start) / std;
            (TEMPOGRAM_GAIN * tg.max(0.0)).ln_1p() - 0.5 * z * z
        })
        .collect();

    let (best, _) = scores
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_finite())
        .max_by(|a, b| a.1.total_cmp(b.1))?;
    if tempogram[best] <= 0.0 {
        return None;
    }

    let lag = best as f64 + parabolic_offset(&scores, best);
    let bpm = lag_bpm(lag) as f32;
    log::debug!(
        "tempo: best lag {best} (refined {lag:.2}, tg {:.3}) -> {bpm:.1} BPM",
        tempogram[best]
    );
    Some(bpm)
}

/// Time-averaged local autocorrelation of `envelope`, `win_length` lags.
///
/// Windows are centred on each frame (zero outside the envelope), tapered
/// by a periodic Hann window, and normalised so their zero lag is 1. Windows
/// without energy contribute zeros.
fn mean_tempogram(envelope: &[f32], win_length: usize) -> Vec<f64> {
    let n_fft = (2 * win_length).next_power_of_two();
    let mut planner = RealFftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n_fft);
    let inverse = planner.plan_fft_inverse(n_fft);

    let mut input = forward.make_input_vec();
    let mut spectrum = forward.make_output_vec();
    let mut ac = inverse.make_output_vec();
    let mut fwd_scratch = forward.make_scratch_vec();
    let mut inv_scratch = inverse.make_scratch_vec();

    let window: Vec<f64> = (0..win_length)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / win_length as f64).cos()))
        .collect();
    let half = win_length / 2;

    let mut sum = vec![0.0f64; win_length];
    for t in 0..envelope.len() {
        input.fill(0.0);
        for (i, (slot, w)) in input.iter_mut().zip(&window).enumerate() {
            *slot = (t + i)
                .checked_sub(half)
                .and_then(|idx| envelope.get(idx))
                .map_or(0.0, |&v| f64::from(v) * w);
        }

        if forward
            .process_with_scratch(&mut input, &mut spectrum, &mut fwd_scratch)
            .is_err()
        {
            continue;
        }
        for c in &mut spectrum {
            *c = Complex::new(c.norm_sqr(), 0.0);
        }
        if inverse
            .process_with_scratch(&mut spectrum, &mut ac, &mut inv_scratch)
            .is_err()
        {
            continue;
        }

        let peak = ac[..win_length].iter().fold(0.0f64, |m, v| m.max(v.abs()));
        if peak <= f64::MIN_POSITIVE {
            continue;
        }
        for (acc, v) in sum.iter_mut().zip(&ac[..win_length]) {
            *acc += v / peak;
        }
    }

    let frames = envelope.len().max(1) as f64;
    sum.iter_mut().for_each(|v| *v /= frames);
    sum
}

/// Sub-sample offset of a local maximum from its two neighbours, in [-0.5, 0.5].
fn parabolic_offset(y: &[f64], i: usize) -> f64 {
    if i == 0 || i + 1 >= y.len() {
        return 0.0;
    }
    let (a, b, c) = (y[i - 1], y[i], y[i + 1]);
    if !(a.is_finite() && c.is_finite()) {
        return 0.0;
    }
    let denom = a - 2.0 * b + c;
    if denom >= 0.0 {
        return 0.0;
    }
    (0.5 * (a - c) / denom).clamp(-0.5, 0.5)
}
