//! Audio buffer encoding tests (hardware-free)

use std::io::Cursor;

use mozhi_assistant::audio::{samples_to_wav, SAMPLE_RATE};

/// Generate sine wave audio samples
fn generate_sine_samples(frequency: f32, duration_secs: f32, amplitude: f32) -> Vec<f32> {
    let num_samples = (SAMPLE_RATE as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

#[test]
fn wav_header_matches_capture_format() {
    let samples = generate_sine_samples(440.0, 0.5, 0.3);
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let spec = reader.spec();

    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, SAMPLE_RATE);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len() as usize, samples.len());
}

#[test]
fn wav_encoding_preserves_sample_count_for_full_capture() {
    // A full 4-second capture window at 16 kHz
    let samples = vec![0.0_f32; 4 * SAMPLE_RATE as usize];
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    assert_eq!(reader.len(), 4 * SAMPLE_RATE);
}

#[test]
fn wav_encoding_clamps_out_of_range_samples() {
    let samples = vec![2.0_f32, -2.0, 0.0];
    let wav = samples_to_wav(&samples, SAMPLE_RATE).unwrap();

    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    let decoded: Vec<i16> = reader.into_samples().map(Result::unwrap).collect();

    assert_eq!(decoded[0], 32767);
    assert_eq!(decoded[1], -32768);
    assert_eq!(decoded[2], 0);
}

#[test]
fn empty_buffer_encodes_to_valid_wav() {
    let wav = samples_to_wav(&[], SAMPLE_RATE).unwrap();
    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    assert_eq!(reader.len(), 0);
}
