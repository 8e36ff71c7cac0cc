/// Module for error handling
pub mod error;
/// Module for MP3 encoding and writing
pub mod save;

use crate::error::{DecodeError, Error};
use crate::save::save_as_mp3;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use walkdir::WalkDir;

/// File extension an input must carry. The match is case-sensitive.
pub const ELIGIBLE_SUFFIX: &str = ".mp3";
/// Files carrying this prefix are scratch files and are never touched.
pub const TEMP_PREFIX: &str = "temp_";

/// Returns whether a file name is subject to trimming.
///
/// The check is purely name-based; the file is not opened.
#[inline]
pub fn is_eligible_name(name: &str) -> bool {
    name.ends_with(ELIGIBLE_SUFFIX) && !name.starts_with(TEMP_PREFIX)
}

/// Configuration options for a batch trim run
#[derive(Debug, Clone)]
pub struct TrimOptions {
    /// Directory containing the MP3 files to trim. Outputs overwrite inputs.
    pub music_dir: PathBuf,
    /// Maximum clip length in milliseconds; longer files are cut to this
    pub max_duration_ms: u64,
    /// Constant bitrate for the re-encoded output, in kbps
    pub bitrate_kbps: u32,
}

impl Default for TrimOptions {
    fn default() -> Self {
        TrimOptions {
            music_dir: PathBuf::from("music"),
            max_duration_ms: 20_000,
            bitrate_kbps: 192,
        }
    }
}

/// Decoded audio for one file: interleaved f32 samples plus stream layout.
///
/// The sample vector length is always a multiple of the channel count.
#[derive(Debug)]
pub struct AudioClip {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl AudioClip {
    /// Interleaved samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of frames (samples per channel)
    #[inline]
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Clip length in milliseconds, derived from the buffer length
    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }

    /// Cuts the clip down to its first `max_ms` milliseconds.
    ///
    /// A no-op when the clip is already that short or shorter; truncating
    /// past the end never errors and never grows the buffer.
    pub fn truncate_to_ms(&mut self, max_ms: u64) {
        let max_frames = (max_ms * self.sample_rate as u64 / 1000) as usize;
        self.samples.truncate(max_frames * self.channels);
    }
}

/// Measurements reported for one successfully trimmed file
#[derive(Debug, Clone, Copy)]
pub struct TrimOutcome {
    /// Duration decoded from the file before trimming, in milliseconds
    pub original_ms: u64,
    /// Duration of the clip written back, in milliseconds
    pub new_ms: u64,
    /// Size of the re-encoded file on disk, in bytes
    pub new_size_bytes: u64,
}

/// A file that could not be trimmed, with the failure's message text
#[derive(Debug, Clone)]
pub struct FailedFile {
    pub name: String,
    pub reason: String,
}

/// Outcome of one run. Every eligible file the scan considered lands in
/// exactly one of the two lists, in the order it was processed.
#[derive(Debug, Default)]
pub struct TrimReport {
    pub processed: Vec<String>,
    pub failed: Vec<FailedFile>,
}

impl TrimReport {
    /// Number of eligible files the scan considered
    #[inline]
    pub fn eligible(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Verifies the MP3 encoder is usable, before any file is touched.
pub fn ensure_encoder() -> Result<(), Error> {
    save::encoder_available().map_err(|source| Error::EncoderUnavailable { source })
}

/// Trim every eligible file under `options.music_dir` in place.
///
/// Files are processed sequentially, one fully-owned buffer at a time. A
/// failure aborts only the file that raised it; the scan then continues with
/// the next one.
pub fn trim_folder(options: &TrimOptions) -> Result<TrimReport, Error> {
    validate_options(options)?;

    info!("Scanning {:?} for MP3 files...", options.music_dir);
    let files = find_eligible_files(&options.music_dir)?;
    if files.is_empty() {
        info!("No eligible MP3 files found.");
        return Ok(TrimReport::default());
    }
    info!("Found {} eligible files.", files.len());

    let pb = ProgressBar::with_draw_target(Some(files.len() as u64), ProgressDrawTarget::stdout());
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}").expect("Internal Error: Failed to set progress bar style")
        .progress_chars("#>-"));
    pb.set_message("Trimming files");

    let mut report = TrimReport::default();
    for path in &files {
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        pb.println(format!("Processing: {name}"));
        match trim_single_file(path, options) {
            Ok(outcome) => {
                pb.println(format!(
                    "  Original duration: {:.1}s",
                    outcome.original_ms as f64 / 1000.0
                ));
                pb.println(format!(
                    "  New duration: {:.1}s",
                    outcome.new_ms as f64 / 1000.0
                ));
                pb.println(format!(
                    "  New file size: {:.2}MB",
                    outcome.new_size_bytes as f64 / 1024.0 / 1024.0
                ));
                pb.println("  ✓ Successfully trimmed!");
                report.processed.push(name);
            }
            Err(e) => {
                error!("Error: {}", e);
                pb.println(format!("  ✗ Error: {e}"));
                report.failed.push(FailedFile {
                    name,
                    reason: e.to_string(),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Trimming done");

    Ok(report)
}

/// Trims a single file in place: decode, cut to `max_duration_ms`, re-encode
/// at the configured bitrate over the original path.
///
/// The overwrite is direct and non-atomic; a failure mid-encode can leave the
/// file corrupt. Callers treat any error here as "this file failed" and move
/// on to the next one.
pub fn trim_single_file(
    path: impl AsRef<Path>,
    options: &TrimOptions,
) -> Result<TrimOutcome, Error> {
    let path = path.as_ref();

    let mut clip = decode_clip(path).map_err(|e| Error::Decode {
        path: path.to_path_buf(),
        source: e,
    })?;
    let original_ms = clip.duration_ms();

    clip.truncate_to_ms(options.max_duration_ms);
    let new_ms = clip.duration_ms();

    save_as_mp3(
        path,
        clip.channels(),
        clip.sample_rate(),
        clip.samples(),
        options.bitrate_kbps,
    )
    .map_err(|e| Error::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;

    let new_size_bytes = fs::metadata(path)
        .map_err(|e| Error::Io {
            path: path.to_path_buf(),
            source: e,
        })?
        .len();

    debug!(
        "Trimmed {:?}: {} ms -> {} ms, {} bytes on disk",
        path.file_name().unwrap_or_default(),
        original_ms,
        new_ms,
        new_size_bytes
    );

    Ok(TrimOutcome {
        original_ms,
        new_ms,
        new_size_bytes,
    })
}

/// Decodes an audio file into an in-memory clip, preserving its native
/// sample rate and channel layout.
pub fn decode_clip(path: impl AsRef<Path>) -> Result<AudioClip, DecodeError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(DecodeError::Io)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let hint = Hint::new();
    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(DecodeError::Symphonia)?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;
    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(DecodeError::MissingSampleRate)?;
    let channels = track
        .codec_params
        .channels
        .ok_or(DecodeError::MissingChannelSpec)?
        .count();

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(DecodeError::Symphonia)?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        match format.next_packet() {
            Ok(packet) => {
                if packet.track_id() != track_id {
                    continue;
                }
                match decoder.decode(&packet) {
                    Ok(decoded) => {
                        let spec = *decoded.spec();
                        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                        buf.copy_interleaved_ref(decoded);
                        samples.extend_from_slice(buf.samples());
                    }
                    Err(SymphoniaError::DecodeError(e)) => {
                        warn!(
                            "Decode error in {:?}: {}. Skipping packet.",
                            path.file_name().unwrap_or_default(),
                            e
                        );
                    }
                    Err(SymphoniaError::IoError(ref e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        break;
                    }
                    Err(e) => return Err(DecodeError::Symphonia(e)),
                }
            }
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(DecodeError::Symphonia(e)),
        }
    }

    debug!(
        "Decoded {:?}: {} samples at {} Hz, {} channel(s)",
        path.file_name().unwrap_or_default(),
        samples.len(),
        sample_rate,
        channels
    );

    Ok(AudioClip {
        samples,
        sample_rate,
        channels,
    })
}

/// Validates trim options for correctness
fn validate_options(options: &TrimOptions) -> Result<(), Error> {
    if !options.music_dir.is_dir() {
        return Err(Error::InvalidOptions(format!(
            "Input path is not a valid directory: {:?}",
            options.music_dir
        )));
    }
    // Fail a bad bitrate up front instead of once per file.
    save::bitrate_from_kbps(options.bitrate_kbps)
        .map_err(|e| Error::InvalidOptions(e.to_string()))?;
    Ok(())
}

/// Finds all eligible files directly inside the given directory.
///
/// The listing is not recursive and not sorted; files are processed in
/// whatever order the directory yields them.
fn find_eligible_files(input_dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, Error> {
    let mut eligible = Vec::new();

    for entry in WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok()) // Filter out directory reading errors
        .filter(|e| e.file_type().is_file())
    {
        let name = entry.file_name().to_string_lossy();
        if is_eligible_name(&name) {
            eligible.push(entry.path().to_path_buf());
        }
    }
    Ok(eligible)
}
