//! Timeline entries: media items and gaps.

use framecast_core::{FrameRate, Resolution, SpeedCurve, Timestamp, TrackType, TrackTypeSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a media item's intrinsic frame timestamps come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameTiming {
    /// Frames on a uniform grid at the item's native frame rate.
    Uniform { frame_rate: FrameRate },
    /// Decoder-supplied presentation timestamps, item-local and strictly
    /// increasing.
    Explicit(Vec<Timestamp>),
}

impl FrameTiming {
    /// Item-local timestamps of all frames within `[0, duration)`.
    pub fn timestamps_within(&self, duration: Timestamp) -> Vec<Timestamp> {
        match self {
            Self::Uniform { frame_rate } => (0..frame_rate.frames_spanning(duration))
                .map(|k| frame_rate.timestamp_of_frame(k))
                .collect(),
            Self::Explicit(timestamps) => timestamps
                .iter()
                .copied()
                .filter(|t| *t >= Timestamp::ZERO && *t < duration)
                .collect(),
        }
    }
}

/// Reference to a media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    /// Path or URI of the media.
    pub path: String,
    /// Intrinsic frame timing.
    pub timing: FrameTiming,
    /// Native resolution. Defaults to HD until probed.
    pub resolution: Resolution,
}

impl MediaSource {
    /// A source whose frames sit on a uniform grid.
    pub fn new(path: impl Into<String>, frame_rate: FrameRate) -> Self {
        Self {
            path: path.into(),
            timing: FrameTiming::Uniform { frame_rate },
            resolution: Resolution::HD,
        }
    }

    /// A source with decoder-supplied frame timestamps.
    pub fn with_frame_timestamps(path: impl Into<String>, timestamps: Vec<Timestamp>) -> Self {
        Self {
            path: path.into(),
            timing: FrameTiming::Explicit(timestamps),
            resolution: Resolution::HD,
        }
    }

    /// Override the native resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}

/// What a span plays: real media, or nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpanKind {
    Media(MediaSource),
    Gap,
}

/// A single timeline entry: a media item or an explicit gap, with its
/// local (pre-speed) duration and track applicability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpan {
    /// Unique span ID.
    pub id: Uuid,
    /// Media or gap.
    pub kind: SpanKind,
    /// Local duration, before any speed adjustment. Must be positive.
    pub duration: Timestamp,
    /// Track types this span contributes to. For gaps this is normalized
    /// to the owning sequence's declared set at build time.
    pub track_types: TrackTypeSet,
    /// Optional speed curve; media spans only.
    pub speed: Option<SpeedCurve>,
    /// Drop this span's audio track.
    pub remove_audio: bool,
    /// Drop this span's video track.
    pub remove_video: bool,
}

impl ItemSpan {
    /// Create a media span.
    pub fn media(source: MediaSource, duration: Timestamp, track_types: TrackTypeSet) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: SpanKind::Media(source),
            duration,
            track_types,
            speed: None,
            remove_audio: false,
            remove_video: false,
        }
    }

    /// Create a gap span. Applies uniformly to the owning sequence's
    /// declared track types.
    pub fn gap(duration: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: SpanKind::Gap,
            duration,
            track_types: TrackTypeSet::both(),
            speed: None,
            remove_audio: false,
            remove_video: false,
        }
    }

    /// Attach a speed curve.
    pub fn with_speed(mut self, speed: SpeedCurve) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Drop the audio track of this span.
    pub fn with_remove_audio(mut self, remove: bool) -> Self {
        self.remove_audio = remove;
        self
    }

    /// Drop the video track of this span.
    pub fn with_remove_video(mut self, remove: bool) -> Self {
        self.remove_video = remove;
        self
    }

    /// Whether this span is a gap.
    pub fn is_gap(&self) -> bool {
        matches!(self.kind, SpanKind::Gap)
    }

    /// The media source, if this is a media span.
    pub fn media_source(&self) -> Option<&MediaSource> {
        match &self.kind {
            SpanKind::Media(source) => Some(source),
            SpanKind::Gap => None,
        }
    }

    /// Duration on the composition timeline, after speed adjustment.
    pub fn output_duration(&self) -> Timestamp {
        match &self.speed {
            Some(curve) => curve.output_duration(self.duration),
            None => self.duration,
        }
    }

    /// Declared track types minus removal flags.
    pub fn effective_track_types(&self) -> TrackTypeSet {
        let mut types = self.track_types;
        if self.remove_audio {
            types = types.without(TrackType::Audio);
        }
        if self.remove_video {
            types = types.without(TrackType::Video);
        }
        types
    }

    /// Item-local timestamps of this span's frames, for media spans.
    pub fn frame_timestamps(&self) -> Option<Vec<Timestamp>> {
        self.media_source()
            .map(|source| source.timing.timestamps_within(self.duration))
    }
}
