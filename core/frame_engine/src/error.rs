use thiserror::Error;

use crate::audio::format::AudioFormat;

#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("no producer registered for service '{0}'")]
    UnknownService(String),
    #[error("no producer can handle resource '{0}'")]
    UnsupportedResource(String),
    #[error("failed to load '{resource}': {message}")]
    Load { resource: String, message: String },
    #[error("producer is closed")]
    Closed,
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("property '{key}' is read-only")]
    ReadOnlyProperty { key: String },
    #[error("invalid value '{value}' for property '{key}'")]
    InvalidProperty { key: String, value: String },
    #[error(transparent)]
    Audio(#[from] AudioError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("cannot realize audio: frequency={frequency} channels={channels}")]
    InvalidRequest { frequency: u32, channels: usize },
    #[error("sample data does not match format {0:?}")]
    FormatMismatch(AudioFormat),
    #[error("expected {expected} samples for {channels} channel(s), buffer holds {actual}")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        channels: usize,
    },
    #[error("audio unavailable: {0}")]
    Unavailable(String),
    #[error("resampling failed: {0}")]
    Resample(String),
}
