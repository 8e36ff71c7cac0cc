use std::path::PathBuf;

use symphonia::core::errors::Error as SymphoniaError;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("Symphonia error: {0}")]
    Symphonia(#[from] SymphoniaError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No compatible audio track found")]
    NoTrack,
    #[error("Missing sample rate in codec parameters")]
    MissingSampleRate,
    #[error("Missing channel layout in codec parameters")]
    MissingChannelSpec,
}

#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
    #[error("LAME encoder could not be initialized")]
    Unavailable,
    #[error("LAME configuration error: {0:?}")]
    Build(mp3lame_encoder::BuildError),
    #[error("LAME encoding error: {0:?}")]
    Lame(mp3lame_encoder::EncodeError),
    #[error("Unsupported bitrate: {0} kbps")]
    UnsupportedBitrate(u32),
    #[error("Unsupported channel count for MP3: {0}")]
    UnsupportedChannelCount(usize),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("MP3 encoder unavailable: {source}")]
    EncoderUnavailable {
        #[source]
        source: EncodeError,
    },
    #[error("Audio decoding failed for {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("Audio encoding failed for {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: EncodeError,
    },
    #[error("I/O error during processing of {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
