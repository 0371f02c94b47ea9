//! Band-pass filter integration tests
//!
//! Hardware-free: buffers are synthesized sine/noise signals.

use mozhi_assistant::{BandpassFilter, FilterSpec};

/// Generate sine wave audio samples at the capture rate
fn sine(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let sample_rate = 16_000.0_f32;
    let num_samples = (sample_rate * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / sample_rate;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

/// RMS over the tail of a buffer (skips the filter transient)
fn settled_rms(samples: &[f32]) -> f32 {
    let tail = &samples[samples.len() / 2..];
    (tail.iter().map(|s| s * s).sum::<f32>() / tail.len() as f32).sqrt()
}

#[test]
fn output_length_matches_input_length() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();

    for len in [33, 100, 4000, 64_000] {
        let input = sine(1000.0, 4.0, 0.5)[..len].to_vec();
        let output = filter.apply(&input).unwrap();
        assert_eq!(output.len(), input.len());
    }
}

#[test]
fn filtering_is_deterministic() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
    let input = sine(700.0, 1.0, 0.4);

    let first = filter.apply(&input).unwrap();
    let second = filter.apply(&input).unwrap();

    // Byte-identical, not approximately equal
    assert_eq!(first, second);
}

#[test]
fn no_state_leaks_between_calls() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
    let quiet = vec![0.0_f32; 1000];
    let loud = sine(1000.0, 1.0, 0.9);

    let baseline = filter.apply(&quiet).unwrap();
    filter.apply(&loud).unwrap();
    let after = filter.apply(&quiet).unwrap();

    assert_eq!(baseline, after);
}

#[test]
fn short_buffer_is_rejected_explicitly() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
    let err = filter.apply(&[0.1_f32; 32]).unwrap_err();
    assert!(err.to_string().contains("too short"));
}

#[test]
fn min_input_len_is_configurable() {
    let spec = FilterSpec {
        min_input_len: 100,
        ..FilterSpec::default()
    };
    let filter = BandpassFilter::new(spec).unwrap();

    assert!(filter.apply(&[0.0_f32; 99]).is_err());
    assert!(filter.apply(&[0.0_f32; 100]).is_ok());
}

#[test]
fn speech_band_passes_mains_hum_does_not() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();

    let speech_tone = filter.apply(&sine(800.0, 2.0, 0.5)).unwrap();
    let hum = filter.apply(&sine(50.0, 2.0, 0.5)).unwrap();

    let speech_rms = settled_rms(&speech_tone);
    let hum_rms = settled_rms(&hum);

    assert!(speech_rms > 0.3, "speech tone attenuated: {speech_rms}");
    assert!(
        hum_rms < speech_rms / 20.0,
        "mains hum not attenuated: {hum_rms} vs {speech_rms}"
    );
}

#[test]
fn band_edges_behave_like_a_bandpass() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();

    let center = settled_rms(&filter.apply(&sine(1000.0, 2.0, 0.5)).unwrap());
    let low_stop = settled_rms(&filter.apply(&sine(100.0, 2.0, 0.5)).unwrap());
    let high_stop = settled_rms(&filter.apply(&sine(6000.0, 2.0, 0.5)).unwrap());

    assert!(low_stop < center);
    assert!(high_stop < center);
}

#[test]
fn silence_stays_silent() {
    let filter = BandpassFilter::new(FilterSpec::default()).unwrap();
    let silence = vec![0.0_f32; 16_000];

    let output = filter.apply(&silence).unwrap();
    assert!(output.iter().all(|&s| s == 0.0));
}
