//! Frame and track metadata shared across the composition engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pixel dimensions of an output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Create a new resolution.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Sentinel 1×1 resolution carried by synthesized gap frames to signal
    /// "no real content" to downstream consumers.
    pub const BLANK: Self = Self::new(1, 1);

    /// Whether this is the blank-frame sentinel.
    #[inline]
    pub fn is_blank(self) -> bool {
        self == Self::BLANK
    }

    pub const HD: Self = Self::new(1920, 1080);
    pub const UHD_4K: Self = Self::new(3840, 2160);
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Kind of track a span contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackType {
    Audio,
    Video,
}

/// The set of track types a span or sequence applies to.
///
/// Two booleans rather than a bitset: there are exactly two track types
/// in this engine and call sites read better this way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TrackTypeSet {
    audio: bool,
    video: bool,
}

impl TrackTypeSet {
    /// Audio only.
    pub const fn audio() -> Self {
        Self {
            audio: true,
            video: false,
        }
    }

    /// Video only.
    pub const fn video() -> Self {
        Self {
            audio: false,
            video: true,
        }
    }

    /// Audio and video.
    pub const fn both() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }

    /// Neither track type.
    pub const fn empty() -> Self {
        Self {
            audio: false,
            video: false,
        }
    }

    /// Whether the set contains a track type.
    pub fn contains(self, track: TrackType) -> bool {
        match track {
            TrackType::Audio => self.audio,
            TrackType::Video => self.video,
        }
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        !self.audio && !self.video
    }

    /// Set union.
    pub fn union(self, other: Self) -> Self {
        Self {
            audio: self.audio || other.audio,
            video: self.video || other.video,
        }
    }

    /// Set intersection.
    pub fn intersect(self, other: Self) -> Self {
        Self {
            audio: self.audio && other.audio,
            video: self.video && other.video,
        }
    }

    /// Remove a track type from the set.
    pub fn without(self, track: TrackType) -> Self {
        match track {
            TrackType::Audio => Self {
                audio: false,
                ..self
            },
            TrackType::Video => Self {
                video: false,
                ..self
            },
        }
    }

    /// Iterate the contained track types.
    pub fn iter(self) -> impl Iterator<Item = TrackType> {
        [
            self.audio.then_some(TrackType::Audio),
            self.video.then_some(TrackType::Video),
        ]
        .into_iter()
        .flatten()
    }
}

impl fmt::Display for TrackTypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.audio, self.video) {
            (true, true) => write!(f, "audio+video"),
            (true, false) => write!(f, "audio"),
            (false, true) => write!(f, "video"),
            (false, false) => write!(f, "none"),
        }
    }
}
