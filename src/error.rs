// SPDX-License-Identifier: MPL-2.0
use crate::domain::playback::Modality;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("I/O Error: {0}")]
    Io(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Playback Error: {0}")]
    Playback(#[from] PlaybackError),
}

/// Media error codes reported by a playable element.
///
/// The numbering follows the HTML `MediaError.code` values so that a
/// browser-backed element can forward its code untouched.
pub mod media_error_code {
    /// Fetching was aborted by the user agent.
    pub const ABORTED: u16 = 1;
    /// A network error interrupted the download.
    pub const NETWORK: u16 = 2;
    /// The resource was fetched but could not be decoded.
    pub const DECODE: u16 = 3;
    /// The resource format or URL is not supported.
    pub const SRC_NOT_SUPPORTED: u16 = 4;
}

/// Specific error types for playback issues.
///
/// Adapter-originated kinds (`Network`, `Decode`, `SourceNotSupported`)
/// put the store into the `Error` status. `AutoplayBlocked` is an
/// environment policy and only pauses playback. `SourceMissing` and
/// `InvalidArgument` are rejected at the operation boundary and never
/// reach the element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The requested modality has no source on the current atom.
    #[error("No {0} source is available for this content")]
    SourceMissing(Modality),

    /// Download failed or was aborted.
    #[error("Network error: {0}")]
    Network(String),

    /// The media could not be decoded.
    #[error("Decoding failed: {0}")]
    Decode(String),

    /// The media format or URL is not supported.
    #[error("Unsupported source: {0}")]
    SourceNotSupported(String),

    /// The runtime refused to start playback without a user gesture.
    #[error("Playback was blocked until you interact with the page")]
    AutoplayBlocked,

    /// An operation received an argument outside its accepted domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl PlaybackError {
    /// Returns true if a user gesture is enough to recover.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PlaybackError::AutoplayBlocked)
    }

    /// Returns true if this error originates from the playable element.
    #[must_use]
    pub fn is_media_failure(&self) -> bool {
        matches!(
            self,
            PlaybackError::Network(_)
                | PlaybackError::Decode(_)
                | PlaybackError::SourceNotSupported(_)
        )
    }

    /// Maps an element error code and its raw message to an error kind.
    ///
    /// Unknown codes fall back to message sniffing, then to `Network`.
    pub fn from_media_error(code: u16, message: &str) -> Self {
        match code {
            media_error_code::ABORTED | media_error_code::NETWORK => {
                PlaybackError::Network(message.to_string())
            }
            media_error_code::DECODE => PlaybackError::Decode(message.to_string()),
            media_error_code::SRC_NOT_SUPPORTED => {
                PlaybackError::SourceNotSupported(message.to_string())
            }
            _ => Self::from_message(message),
        }
    }

    /// Attempts to classify a raw error message.
    pub fn from_message(msg: &str) -> Self {
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("notallowed") || msg_lower.contains("autoplay") {
            return PlaybackError::AutoplayBlocked;
        }

        if msg_lower.contains("not supported")
            || msg_lower.contains("unsupported")
            || msg_lower.contains("no supported source")
        {
            return PlaybackError::SourceNotSupported(msg.to_string());
        }

        if msg_lower.contains("decode") || msg_lower.contains("corrupt") {
            return PlaybackError::Decode(msg.to_string());
        }

        PlaybackError::Network(msg.to_string())
    }

    /// Human-readable message shown next to the retry affordance.
    #[must_use]
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
