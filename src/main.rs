use anyhow::Result;
use audio_batch_trim::{TrimOptions, ensure_encoder, trim_folder};
use log::{error, info};
use std::path::PathBuf;

/// Directory scanned for MP3 files, relative to the working directory
const MUSIC_DIR: &str = "music";
/// Maximum clip length after trimming, in milliseconds
const TRIM_DURATION_MS: u64 = 20_000;
/// Constant bitrate for the re-encoded files, in kbps
const BITRATE_KBPS: u32 = 192;

fn main() -> Result<()> {
    _ = pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .parse_filters("symphonia=error")
        .parse_default_env()
        .try_init();

    println!("Trimming MP3 files to {} seconds...", TRIM_DURATION_MS / 1000);
    println!("{}", "=".repeat(50));

    if let Err(e) = ensure_encoder() {
        error!("{e}");
        println!("ERROR: the MP3 encoder (LAME) could not be initialized");
        println!("Install the LAME library (e.g. apt install libmp3lame-dev) and rebuild");
        std::process::exit(1);
    }

    let options = TrimOptions {
        music_dir: PathBuf::from(MUSIC_DIR),
        max_duration_ms: TRIM_DURATION_MS,
        bitrate_kbps: BITRATE_KBPS,
    };

    info!("Starting batch trim with options:");
    info!("  Input Directory: {:?}", options.music_dir);
    info!("  Trim Duration: {} ms", options.max_duration_ms);
    info!("  Bitrate: {} kbps", options.bitrate_kbps);

    match trim_folder(&options) {
        Ok(report) => {
            println!();
            println!("{}", "=".repeat(50));
            println!();
            println!("Summary:");
            println!("  Successfully processed: {}", report.processed.len());
            println!("  Failed: {}", report.failed.len());

            if !report.processed.is_empty() {
                println!();
                println!("  Trimmed files:");
                for name in &report.processed {
                    println!("    - {name}");
                }
            }

            if !report.failed.is_empty() {
                println!();
                println!("  Failed files:");
                for file in &report.failed {
                    println!("    - {}", file.name);
                }
            }

            println!();
            println!("Done!");
            Ok(())
        }
        Err(e) => {
            error!("Batch trim failed: {}", e);
            Err(e)?
        }
    }
}
