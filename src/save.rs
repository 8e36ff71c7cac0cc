use mp3lame_encoder::{Bitrate, Builder, Encoder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};

use crate::error::EncodeError;
use std::{fs, path::Path};

/// Maps a plain kbps value onto the MPEG-1 Layer III constant-bitrate table.
pub fn bitrate_from_kbps(kbps: u32) -> Result<Bitrate, EncodeError> {
    Ok(match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => return Err(EncodeError::UnsupportedBitrate(other)),
    })
}

/// Builds a configured LAME encoder for the given stream layout.
fn build_encoder(
    channels: usize,
    sample_rate: u32,
    bitrate_kbps: u32,
) -> Result<Encoder, EncodeError> {
    if channels == 0 || channels > 2 {
        return Err(EncodeError::UnsupportedChannelCount(channels));
    }
    let mut builder = Builder::new().ok_or(EncodeError::Unavailable)?;
    builder
        .set_num_channels(channels as u8)
        .map_err(EncodeError::Build)?;
    builder
        .set_sample_rate(sample_rate)
        .map_err(EncodeError::Build)?;
    builder
        .set_brate(bitrate_from_kbps(bitrate_kbps)?)
        .map_err(EncodeError::Build)?;
    builder.set_quality(Quality::Best).map_err(EncodeError::Build)?;
    builder.build().map_err(EncodeError::Build)
}

/// Verifies that a LAME encoder can be constructed at all.
///
/// Called once at startup so a missing encoder fails the whole run before any
/// file has been opened, instead of failing every file one by one.
pub fn encoder_available() -> Result<(), EncodeError> {
    build_encoder(2, 44_100, 192).map(|_| ())
}

/// Encodes interleaved f32 samples as MP3 and writes them to `path`,
/// replacing whatever was there.
///
/// The write is direct: no temporary file, no rename. A failure after the
/// write has started can leave a partial file behind.
///
/// # Arguments
/// * `path` - Output file path
/// * `channels` - Number of audio channels (1 or 2)
/// * `sample_rate` - Sample rate in Hz
/// * `samples` - Interleaved audio samples in 32-bit float format
/// * `bitrate_kbps` - Constant bitrate for the MP3 stream
pub fn save_as_mp3(
    path: &Path,
    channels: usize,
    sample_rate: u32,
    samples: &[f32],
    bitrate_kbps: u32,
) -> Result<(), EncodeError> {
    let mut encoder = build_encoder(channels, sample_rate, bitrate_kbps)?;

    let frames = samples.len() / channels;
    let mut mp3: Vec<u8> = Vec::new();
    mp3.reserve(mp3lame_encoder::max_required_buffer_size(frames));

    let written = match channels {
        1 => encoder
            .encode(MonoPcm(samples), mp3.spare_capacity_mut())
            .map_err(EncodeError::Lame)?,
        _ => encoder
            .encode(InterleavedPcm(samples), mp3.spare_capacity_mut())
            .map_err(EncodeError::Lame)?,
    };
    // SAFETY: LAME wrote exactly `written` bytes into the spare capacity.
    unsafe {
        mp3.set_len(mp3.len() + written);
    }

    let written = encoder
        .flush::<FlushNoGap>(mp3.spare_capacity_mut())
        .map_err(EncodeError::Lame)?;
    // SAFETY: as above, for the flushed tail.
    unsafe {
        mp3.set_len(mp3.len() + written);
    }

    Ok(fs::write(path, &mp3)?)
}
