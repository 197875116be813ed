//! Second-order Butterworth high-pass used by the reference-free SNR
//! estimate.
//!
//! The noise-floor proxy isolates content above 80% of the Nyquist frequency;
//! the filter runs forward and backward (zero-phase) so the residual is not
//! time-shifted against the input.

/// Biquad IIR filter with normalized coefficients (`a[0] == 1`).
pub(crate) struct Biquad {
    b: [f64; 3],
    a: [f64; 3],
}

impl Biquad {
    /// Designs a 2nd-order Butterworth high-pass via the prewarped bilinear
    /// transform.
    ///
    /// `cutoff_hz` must lie strictly inside (0, sample_rate / 2); callers in
    /// this crate derive it as a fixed fraction of Nyquist, which guarantees
    /// that.
    pub(crate) fn butterworth_highpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let k = (std::f64::consts::PI * cutoff_hz / sample_rate).tan();
        let k2 = k * k;
        let sqrt2 = 2.0_f64.sqrt();
        let norm = 1.0 + sqrt2 * k + k2;

        Self {
            b: [1.0 / norm, -2.0 / norm, 1.0 / norm],
            a: [1.0, (2.0 * k2 - 2.0) / norm, (1.0 - sqrt2 * k + k2) / norm],
        }
    }

    /// Runs the difference equation over `input` with zeroed initial state.
    ///
    /// y[n] = b0·x[n] + b1·x[n−1] + b2·x[n−2] − a1·y[n−1] − a2·y[n−2]
    fn process(&self, input: &[f64]) -> Vec<f64> {
        let mut output = Vec::with_capacity(input.len());
        let (mut x1, mut x2) = (0.0, 0.0);
        let (mut y1, mut y2) = (0.0, 0.0);

        for &x in input {
            let y = self.b[0] * x + self.b[1] * x1 + self.b[2] * x2 - self.a[1] * y1
                - self.a[2] * y2;
            x2 = x1;
            x1 = x;
            y2 = y1;
            y1 = y;
            output.push(y);
        }
        output
    }

    /// Forward-backward filtering for zero phase distortion.
    pub(crate) fn process_zero_phase(&self, input: &[f64]) -> Vec<f64> {
        let mut forward = self.process(input);
        forward.reverse();
        let mut backward = self.process(&forward);
        backward.reverse();
        backward
    }
}
