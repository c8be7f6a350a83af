use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

/// Windowed real FFT producing power spectra, via realfft.
///
/// Pre-allocates the plan and scratch buffers so that consecutive frames do
/// not allocate.
///
/// # Example
/// ```
/// use mv_audio::fft::FftPipeline;
/// let fft = FftPipeline::new(2048);
/// assert_eq!(fft.n_bins(), 1025);
/// ```
pub struct FftPipeline {
    fft_size: usize,
    input_buf: Vec<f32>,
    spectrum_buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    plan: Arc<dyn RealToComplex<f32>>,
    /// Periodic Hann window coefficients.
    window: Vec<f32>,
}

impl FftPipeline {
    /// Create a new FFT pipeline with the given window size.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "FFT size must be > 0");

        let mut planner = RealFftPlanner::<f32>::new();
        let plan = planner.plan_fft_forward(size);

        let input_buf = plan.make_input_vec();
        let spectrum_buf = plan.make_output_vec();
        let scratch = plan.make_scratch_vec();

        // Periodic Hann: the window repeats with period `size`, matching STFT framing.
        let window: Vec<f32> = (0..size)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / size as f32).cos()))
            .collect();

        Self {
            fft_size: size,
            input_buf,
            spectrum_buf,
            scratch,
            plan,
            window,
        }
    }

    /// Window `frame` and write its power spectrum `|X[k]|²` into `out`.
    ///
    /// `frame` shorter than the FFT size is zero-padded; `out` must hold
    /// [`n_bins`](Self::n_bins) values.
    ///
    /// # Example
    /// ```
    /// use mv_audio::fft::FftPipeline;
    /// let mut fft = FftPipeline::new(256);
    /// let mut power = vec![0.0f32; fft.n_bins()];
    /// fft.power_into(&[0.0f32; 256], &mut power);
    /// assert!(power.iter().all(|&p| p == 0.0));
    /// ```
    pub fn power_into(&mut self, frame: &[f32], out: &mut [f32]) {
        let n = self.fft_size.min(frame.len());

        for (i, slot) in self.input_buf.iter_mut().enumerate() {
            *slot = if i < n { frame[i] * self.window[i] } else { 0.0 };
        }

        if self
            .plan
            .process_with_scratch(&mut self.input_buf, &mut self.spectrum_buf, &mut self.scratch)
            .is_err()
        {
            out.iter_mut().for_each(|p| *p = 0.0);
            return;
        }

        for (p, c) in out.iter_mut().zip(self.spectrum_buf.iter()) {
            *p = c.norm_sqr();
        }
    }

    /// FFT window size.
    #[must_use]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of spectrum bins (N/2 + 1).
    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.spectrum_buf.len()
    }
}
