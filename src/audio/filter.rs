//! Speech-band filtering
//!
//! Butterworth band-pass applied as a cascade of biquad sections. The
//! coefficients are derived once from a [`FilterSpec`]; each call to
//! [`BandpassFilter::apply`] runs with fresh delay lines, so output depends
//! only on the input buffer and the spec.

use num_complex::Complex64;

use crate::{Error, Result};

/// Band-pass filter configuration
///
/// Immutable after construction; coefficients derive deterministically from
/// these values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSpec {
    /// Low cutoff frequency in Hz
    pub low_cut: f64,
    /// High cutoff frequency in Hz
    pub high_cut: f64,
    /// Butterworth prototype order (band-pass doubles the pole count)
    pub order: usize,
    /// Sample rate in Hz
    pub sample_rate: f64,
    /// Inputs shorter than this are rejected rather than filtered
    pub min_input_len: usize,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            low_cut: 300.0,
            high_cut: 3400.0,
            order: 5,
            sample_rate: 16_000.0,
            min_input_len: 33,
        }
    }
}

impl FilterSpec {
    /// Validate cutoffs against the sample rate
    ///
    /// # Errors
    ///
    /// Returns error if the band is empty, exceeds Nyquist, or order is zero
    pub fn validate(&self) -> Result<()> {
        let nyquist = self.sample_rate / 2.0;
        if self.order == 0 {
            return Err(Error::Filter("filter order must be at least 1".to_string()));
        }
        if self.low_cut <= 0.0 || self.high_cut <= self.low_cut {
            return Err(Error::Filter(format!(
                "invalid band: {} Hz .. {} Hz",
                self.low_cut, self.high_cut
            )));
        }
        if self.high_cut >= nyquist {
            return Err(Error::Filter(format!(
                "high cutoff {} Hz must be below Nyquist ({nyquist} Hz)",
                self.high_cut
            )));
        }
        Ok(())
    }
}

/// One second-order section (direct form II transposed)
#[derive(Debug, Clone, Copy)]
struct Section {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Section {
    /// Run the section over samples, carrying its own delay line
    fn run(&self, samples: &mut [f64]) {
        let mut s1 = 0.0_f64;
        let mut s2 = 0.0_f64;
        for x in samples {
            let y = self.b0 * *x + s1;
            s1 = self.b1 * *x - self.a1 * y + s2;
            s2 = self.b2 * *x - self.a2 * y;
            *x = y;
        }
    }

    /// Frequency response at `z = e^{jw}`
    fn response(&self, z: Complex64) -> Complex64 {
        let zi = z.inv();
        let num = self.b0 + self.b1 * zi + self.b2 * zi * zi;
        let den = Complex64::new(1.0, 0.0) + self.a1 * zi + self.a2 * zi * zi;
        num / den
    }
}

/// Butterworth band-pass filter for shaping captured audio to the speech band
pub struct BandpassFilter {
    spec: FilterSpec,
    sections: Vec<Section>,
}

impl BandpassFilter {
    /// Design a filter from the spec
    ///
    /// # Errors
    ///
    /// Returns error if the spec is invalid
    pub fn new(spec: FilterSpec) -> Result<Self> {
        spec.validate()?;
        let sections = design_sections(&spec);
        tracing::debug!(
            low_cut = spec.low_cut,
            high_cut = spec.high_cut,
            order = spec.order,
            sample_rate = spec.sample_rate,
            sections = sections.len(),
            "band-pass filter designed"
        );
        Ok(Self { spec, sections })
    }

    /// The spec this filter was designed from
    #[must_use]
    pub const fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Filter a buffer, returning a new buffer of identical length
    ///
    /// Single-pass (non-zero-phase) IIR. No filter state survives between
    /// calls, so identical inputs always produce identical outputs.
    ///
    /// # Errors
    ///
    /// Returns error if the input is shorter than `min_input_len`
    pub fn apply(&self, samples: &[f32]) -> Result<Vec<f32>> {
        if samples.len() < self.spec.min_input_len {
            return Err(Error::Filter(format!(
                "input too short: {} samples, need at least {}",
                samples.len(),
                self.spec.min_input_len
            )));
        }

        let mut work: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
        for section in &self.sections {
            section.run(&mut work);
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(work.into_iter().map(|s| s as f32).collect())
    }
}

/// Build the second-order section cascade for a Butterworth band-pass.
///
/// Analog Butterworth prototype, low-pass to band-pass transform on
/// pre-warped edge frequencies, then bilinear transform. Zeros land at
/// z = 1 and z = -1, one pair per section; the first section absorbs the
/// gain that makes the response unity at the geometric center frequency.
fn design_sections(spec: &FilterSpec) -> Vec<Section> {
    let fs2 = 2.0 * spec.sample_rate;

    // Pre-warped analog band edges
    let w1 = fs2 * (std::f64::consts::PI * spec.low_cut / spec.sample_rate).tan();
    let w2 = fs2 * (std::f64::consts::PI * spec.high_cut / spec.sample_rate).tan();
    let bw = w2 - w1;
    let w0 = (w1 * w2).sqrt();

    let n = spec.order;
    let mut sections = Vec::with_capacity(n);

    #[allow(clippy::cast_precision_loss)]
    for k in 0..n {
        // Butterworth prototype pole on the unit circle, left half plane
        let theta = std::f64::consts::PI * (2.0 * k as f64 + 1.0) / (2.0 * n as f64)
            + std::f64::consts::FRAC_PI_2;
        let proto = Complex64::from_polar(1.0, theta);

        // Conjugate prototype poles yield conjugate sections; design each
        // pair once from the upper half plane, and the real pole (odd order)
        // from its own band-pass pole pair.
        if proto.im < -1e-12 {
            continue;
        }

        let shifted = proto * (bw / 2.0);
        let radical = (shifted * shifted - Complex64::new(w0 * w0, 0.0)).sqrt();

        if proto.im.abs() <= 1e-12 {
            // Real prototype pole: its two band-pass poles form one section
            let z1 = bilinear(shifted + radical, fs2);
            let z2 = bilinear(shifted - radical, fs2);
            let sum = z1 + z2;
            let product = z1 * z2;
            sections.push(Section {
                b0: 1.0,
                b1: 0.0,
                b2: -1.0,
                a1: -sum.re,
                a2: product.re,
            });
        } else {
            // Complex prototype pole: each band-pass pole pairs with the
            // conjugate arising from the conjugate prototype pole
            for q in [shifted + radical, shifted - radical] {
                let z = bilinear(q, fs2);
                sections.push(Section {
                    b0: 1.0,
                    b1: 0.0,
                    b2: -1.0,
                    a1: -2.0 * z.re,
                    a2: z.norm_sqr(),
                });
            }
        }
    }

    // Normalize to unity gain at the center frequency
    let wc = 2.0 * (w0 / fs2).atan();
    let zc = Complex64::from_polar(1.0, wc);
    let gain: Complex64 = sections
        .iter()
        .map(|s| s.response(zc))
        .product();
    let scale = 1.0 / gain.norm();
    if let Some(first) = sections.first_mut() {
        first.b0 *= scale;
        first.b1 *= scale;
        first.b2 *= scale;
    }

    sections
}

/// Map an analog pole to the z-plane
fn bilinear(s: Complex64, fs2: f64) -> Complex64 {
    (Complex64::new(fs2, 0.0) + s) / (Complex64::new(fs2, 0.0) - s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn tone(freq: f64, spec: &FilterSpec, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| {
                let t = i as f64 / spec.sample_rate;
                ((2.0 * std::f64::consts::PI * freq * t).sin() * 0.5) as f32
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let mean = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
        mean.sqrt()
    }

    #[test]
    fn section_count_matches_order() {
        let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
        assert_eq!(filter.sections.len(), 5);
    }

    #[test]
    fn rejects_invalid_band() {
        let spec = FilterSpec {
            low_cut: 3400.0,
            high_cut: 300.0,
            ..FilterSpec::default()
        };
        assert!(BandpassFilter::new(spec).is_err());

        let spec = FilterSpec {
            high_cut: 9000.0,
            ..FilterSpec::default()
        };
        assert!(BandpassFilter::new(spec).is_err());
    }

    #[test]
    fn rejects_short_input() {
        let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
        let short = vec![0.0_f32; 10];
        assert!(filter.apply(&short).is_err());
    }

    #[test]
    fn passes_speech_band_attenuates_outside() {
        let spec = FilterSpec::default();
        let filter = BandpassFilter::new(spec).unwrap();

        let in_band = filter.apply(&tone(1000.0, &spec, 16_000)).unwrap();
        let below = filter.apply(&tone(60.0, &spec, 16_000)).unwrap();
        let above = filter.apply(&tone(7000.0, &spec, 16_000)).unwrap();

        // Skip the transient at the head of each buffer
        let in_band_rms = rms(&in_band[4000..]);
        let below_rms = rms(&below[4000..]);
        let above_rms = rms(&above[4000..]);

        assert!(in_band_rms > 0.3, "in-band tone should pass: {in_band_rms}");
        assert!(below_rms < in_band_rms / 10.0, "low tone should attenuate");
        assert!(above_rms < in_band_rms / 10.0, "high tone should attenuate");
    }
}
