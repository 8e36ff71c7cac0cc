use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use audio_batch_trim::save::save_as_mp3;
use audio_batch_trim::{TrimOptions, decode_clip, trim_folder};
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 44_100;
// Codec delay and padding shift decoded durations by a few frames.
const TOLERANCE_MS: u64 = 150;

/// Writes a mono 440 Hz tone of the given length as a real MP3 file.
fn write_tone(path: &Path, duration_ms: u64) {
    let frames = (duration_ms * SAMPLE_RATE as u64 / 1000) as usize;
    let samples: Vec<f32> = (0..frames)
        .map(|i| (2.0 * PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin() * 0.5)
        .collect();
    save_as_mp3(path, 1, SAMPLE_RATE, &samples, 192).expect("fixture encode failed");
}

/// Writes a 16-bit PCM wav tone; used for fixtures that are not real MP3s.
fn write_wav_tone(path: &Path, duration_ms: u64) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("fixture wav create failed");
    let frames = (duration_ms * SAMPLE_RATE as u64 / 1000) as usize;
    for i in 0..frames {
        let sample = (2.0 * PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin() * 0.4;
        writer
            .write_sample((sample * i16::MAX as f32) as i16)
            .expect("fixture wav write failed");
    }
    writer.finalize().expect("fixture wav finalize failed");
}

fn options_for(dir: &Path) -> TrimOptions {
    TrimOptions {
        music_dir: dir.to_path_buf(),
        ..TrimOptions::default()
    }
}

fn duration_of(path: &Path) -> u64 {
    decode_clip(path).expect("decode failed").duration_ms()
}

fn assert_close(actual: u64, expected: u64) {
    let diff = actual.abs_diff(expected);
    assert!(
        diff <= TOLERANCE_MS,
        "duration {actual} ms not within {TOLERANCE_MS} ms of {expected} ms"
    );
}

#[test]
fn end_to_end_scenario() {
    let dir = TempDir::new().unwrap();
    write_tone(&dir.path().join("song1.mp3"), 30_000);
    write_tone(&dir.path().join("song2.mp3"), 10_000);
    write_tone(&dir.path().join("temp_draft.mp3"), 30_000);
    fs::write(dir.path().join("notes.txt"), "some liner notes").unwrap();

    let report = trim_folder(&options_for(dir.path())).unwrap();

    let mut processed = report.processed.clone();
    processed.sort();
    assert_eq!(processed, vec!["song1.mp3", "song2.mp3"]);
    assert!(report.failed.is_empty());
    assert_eq!(report.eligible(), 2);

    // long file capped, short file untouched
    assert_close(duration_of(&dir.path().join("song1.mp3")), 20_000);
    assert_close(duration_of(&dir.path().join("song2.mp3")), 10_000);

    // the scratch file was never processed
    assert_close(duration_of(&dir.path().join("temp_draft.mp3")), 30_000);
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.txt")).unwrap(),
        "some liner notes"
    );
}

#[test]
fn trimming_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("long.mp3");
    write_tone(&path, 30_000);

    trim_folder(&options_for(dir.path())).unwrap();
    let first = duration_of(&path);

    let report = trim_folder(&options_for(dir.path())).unwrap();
    let second = duration_of(&path);

    assert_eq!(report.processed, vec!["long.mp3"]);
    assert_close(first, 20_000);
    assert_close(second, 20_000);
    assert!(
        first.abs_diff(second) <= TOLERANCE_MS,
        "second run changed the duration: {first} ms -> {second} ms"
    );
}

#[test]
fn exact_boundary_file_keeps_its_duration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("exact.mp3");
    write_tone(&path, 20_000);

    let report = trim_folder(&options_for(dir.path())).unwrap();

    assert_eq!(report.processed, vec!["exact.mp3"]);
    assert_close(duration_of(&path), 20_000);
}

#[test]
fn short_file_keeps_its_duration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.mp3");
    write_tone(&path, 5_000);

    let report = trim_folder(&options_for(dir.path())).unwrap();

    assert_eq!(report.processed, vec!["short.mp3"]);
    assert_close(duration_of(&path), 5_000);
}

#[test]
fn one_corrupt_file_does_not_stop_the_rest() {
    let dir = TempDir::new().unwrap();
    write_tone(&dir.path().join("good.mp3"), 5_000);
    write_tone(&dir.path().join("other.mp3"), 25_000);
    fs::write(dir.path().join("bad.mp3"), "this is not audio data").unwrap();

    let report = trim_folder(&options_for(dir.path())).unwrap();

    let mut processed = report.processed.clone();
    processed.sort();
    assert_eq!(processed, vec!["good.mp3", "other.mp3"]);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].name, "bad.mp3");
    assert!(!report.failed[0].reason.is_empty());

    // partition invariant: every eligible file is in exactly one list
    assert_eq!(report.eligible(), 3);

    assert_close(duration_of(&dir.path().join("other.mp3")), 20_000);
}

#[test]
fn renamed_wav_is_eligible_and_processed() {
    // eligibility is purely name-based; the probe then decodes the actual
    // content, so a wav renamed to .mp3 gets trimmed like anything else
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("was_a_wav.mp3");
    write_wav_tone(&path, 30_000);

    let report = trim_folder(&options_for(dir.path())).unwrap();

    assert_eq!(report.processed, vec!["was_a_wav.mp3"]);
    assert!(report.failed.is_empty());
    assert_close(duration_of(&path), 20_000);
}

#[test]
fn empty_directory_yields_empty_report() {
    let dir = TempDir::new().unwrap();
    let report = trim_folder(&options_for(dir.path())).unwrap();
    assert!(report.processed.is_empty());
    assert!(report.failed.is_empty());
}
