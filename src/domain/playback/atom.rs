// SPDX-License-Identifier: MPL-2.0
//! The playable unit and its two interchangeable presentations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which presentation of a content atom drives playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Video source.
    Watch,
    /// Audio-only source.
    Listen,
}

impl Modality {
    /// Returns the opposite modality.
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::Watch => Self::Listen,
            Self::Listen => Self::Watch,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Watch => "watch",
            Self::Listen => "listen",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical piece of playable content, decoupled from the physical
/// source currently backing it.
///
/// Atoms are never mutated once handed to the engine; starting different
/// content replaces the atom wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentAtom {
    pub id: String,
    pub title: String,
    pub thumbnail: Option<String>,
    pub video_src: Option<String>,
    pub audio_src: Option<String>,
    pub course_title: Option<String>,
}

impl ContentAtom {
    /// Creates an atom without any source attached.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            thumbnail: None,
            video_src: None,
            audio_src: None,
            course_title: None,
        }
    }

    #[must_use]
    pub fn with_video(mut self, src: impl Into<String>) -> Self {
        self.video_src = Some(src.into());
        self
    }

    #[must_use]
    pub fn with_audio(mut self, src: impl Into<String>) -> Self {
        self.audio_src = Some(src.into());
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_course_title(mut self, title: impl Into<String>) -> Self {
        self.course_title = Some(title.into());
        self
    }

    /// Returns the source URL backing the given modality, if any.
    ///
    /// Empty strings count as absent.
    #[must_use]
    pub fn source(&self, modality: Modality) -> Option<&str> {
        let src = match modality {
            Modality::Watch => self.video_src.as_deref(),
            Modality::Listen => self.audio_src.as_deref(),
        };
        src.filter(|s| !s.trim().is_empty())
    }

    /// Returns true if the given modality can be played.
    #[must_use]
    pub fn supports(&self, modality: Modality) -> bool {
        self.source(modality).is_some()
    }

    /// Returns true if at least one source is present.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        self.supports(Modality::Watch) || self.supports(Modality::Listen)
    }

    /// Returns true if both presentations are available.
    #[must_use]
    pub fn has_both_sources(&self) -> bool {
        self.supports(Modality::Watch) && self.supports(Modality::Listen)
    }

    /// The modality of the richest available source (video first).
    #[must_use]
    pub fn preferred_modality(&self) -> Option<Modality> {
        if self.supports(Modality::Watch) {
            Some(Modality::Watch)
        } else if self.supports(Modality::Listen) {
            Some(Modality::Listen)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preferred_modality_is_watch_when_both_exist() {
        let atom = ContentAtom::new("a1", "Intro")
            .with_video("v.mp4")
            .with_audio("a.mp3");
        assert_eq!(atom.preferred_modality(), Some(Modality::Watch));
        assert!(atom.has_both_sources());
    }

    #[test]
    fn preferred_modality_falls_back_to_listen() {
        let atom = ContentAtom::new("a1", "Intro").with_audio("a.mp3");
        assert_eq!(atom.preferred_modality(), Some(Modality::Listen));
        assert!(!atom.supports(Modality::Watch));
    }

    #[test]
    fn atom_without_sources_is_not_playable() {
        let atom = ContentAtom::new("a1", "Intro");
        assert!(!atom.is_playable());
        assert_eq!(atom.preferred_modality(), None);
    }

    #[test]
    fn blank_source_counts_as_absent() {
        let atom = ContentAtom::new("a1", "Intro")
            .with_video("  ")
            .with_audio("a.mp3");
        assert_eq!(atom.source(Modality::Watch), None);
        assert_eq!(atom.source(Modality::Listen), Some("a.mp3"));
    }

    #[test]
    fn modality_other_flips() {
        assert_eq!(Modality::Watch.other(), Modality::Listen);
        assert_eq!(Modality::Listen.other(), Modality::Watch);
        assert_eq!(Modality::Listen.to_string(), "listen");
    }
}
