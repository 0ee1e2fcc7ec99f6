//! Sequences: ordered spans sharing one timeline and track-type set.

use framecast_core::{FramecastError, Result, TimeSpan, Timestamp, TrackType, TrackTypeSet};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::span::{FrameTiming, ItemSpan};

/// Builder for [`SequenceTimeline`]. Insertion order is playback order;
/// all validation happens once at [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct SequenceBuilder {
    track_types: TrackTypeSet,
    spans: Vec<ItemSpan>,
    is_looping: bool,
    force_audio_track: bool,
    force_video_track: bool,
}

impl SequenceBuilder {
    /// Start a sequence declaring the track types it carries.
    pub fn new(track_types: TrackTypeSet) -> Self {
        Self {
            track_types,
            spans: Vec::new(),
            is_looping: false,
            force_audio_track: false,
            force_video_track: false,
        }
    }

    /// Append a media span.
    pub fn add_item(mut self, span: ItemSpan) -> Self {
        self.spans.push(span);
        self
    }

    /// Append a gap span.
    pub fn add_gap(mut self, duration: Timestamp) -> Self {
        self.spans.push(ItemSpan::gap(duration));
        self
    }

    /// Restart the sequence from the beginning on each play-through.
    pub fn set_is_looping(mut self, is_looping: bool) -> Self {
        self.is_looping = is_looping;
        self
    }

    /// Allow the sequence to start with an empty audio track (e.g. a
    /// gap-led sequence that declares audio).
    pub fn experimental_set_force_audio_track(mut self, force: bool) -> Self {
        self.force_audio_track = force;
        self
    }

    /// Allow the sequence to start with an empty video track.
    pub fn experimental_set_force_video_track(mut self, force: bool) -> Self {
        self.force_video_track = force;
        self
    }

    /// Validate and finalize into an immutable [`SequenceTimeline`].
    pub fn build(self) -> Result<SequenceTimeline> {
        let mut spans = self.spans;
        // A gap applies uniformly across the sequence's declared tracks.
        for span in spans.iter_mut().filter(|s| s.is_gap()) {
            span.track_types = self.track_types;
        }

        let sequence = SequenceTimeline {
            id: Uuid::new_v4(),
            track_types: self.track_types,
            spans,
            is_looping: self.is_looping,
            force_audio_track: self.force_audio_track,
            force_video_track: self.force_video_track,
        };
        sequence.validate()?;
        Ok(sequence)
    }
}

/// An ordered, immutable list of spans belonging to one track-type set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceTimeline {
    id: Uuid,
    track_types: TrackTypeSet,
    spans: Vec<ItemSpan>,
    is_looping: bool,
    force_audio_track: bool,
    force_video_track: bool,
}

impl SequenceTimeline {
    /// Unique sequence ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Declared track types.
    pub fn track_types(&self) -> TrackTypeSet {
        self.track_types
    }

    /// Spans in playback order.
    pub fn spans(&self) -> &[ItemSpan] {
        &self.spans
    }

    /// Whether the sequence restarts on exhaustion.
    pub fn is_looping(&self) -> bool {
        self.is_looping
    }

    /// Whether a leading empty audio track is explicitly allowed.
    pub fn force_audio_track(&self) -> bool {
        self.force_audio_track
    }

    /// Whether a leading empty video track is explicitly allowed.
    pub fn force_video_track(&self) -> bool {
        self.force_video_track
    }

    /// Total post-speed duration of the sequence.
    pub fn total_duration(&self) -> Timestamp {
        self.spans
            .iter()
            .fold(Timestamp::ZERO, |acc, span| acc + span.output_duration())
    }

    /// Composition-relative start time of the span at `index`.
    pub fn span_start(&self, index: usize) -> Timestamp {
        self.spans[..index]
            .iter()
            .fold(Timestamp::ZERO, |acc, span| acc + span.output_duration())
    }

    /// Post-speed output window of the span at `index`.
    pub fn span_window(&self, index: usize) -> TimeSpan {
        TimeSpan::new(self.span_start(index), self.spans[index].output_duration())
    }

    /// Find which span's output window contains the given
    /// composition-relative time. Returns (index, time within the window).
    pub fn span_at_time(&self, time: Timestamp) -> Option<(usize, Timestamp)> {
        let mut pos = Timestamp::ZERO;
        for (i, span) in self.spans.iter().enumerate() {
            let window = TimeSpan::new(pos, span.output_duration());
            if window.contains(time) {
                return Some((i, time - window.start));
            }
            pos = window.end();
        }
        None
    }

    /// Re-run the structural checks normally enforced by
    /// [`SequenceBuilder::build`]. Used after deserialization, where
    /// builder invariants cannot be assumed.
    pub fn validate(&self) -> Result<()> {
        if self.track_types.is_empty() {
            return Err(FramecastError::InvalidSequenceConfiguration(
                "sequence declares no track types".into(),
            ));
        }
        if self.spans.is_empty() {
            return Err(FramecastError::InvalidSequenceConfiguration(
                "sequence has no spans".into(),
            ));
        }

        for (i, span) in self.spans.iter().enumerate() {
            if !span.duration.is_positive() {
                return Err(FramecastError::InvalidSequenceConfiguration(format!(
                    "span {i} has non-positive duration {}",
                    span.duration
                )));
            }
            if span.is_gap() {
                if span.speed.is_some() {
                    return Err(FramecastError::InvalidSequenceConfiguration(format!(
                        "span {i}: speed curves apply to media spans, not gaps"
                    )));
                }
                if span.track_types != self.track_types {
                    return Err(FramecastError::InvalidSequenceConfiguration(format!(
                        "span {i}: gap track set {} differs from sequence {}",
                        span.track_types, self.track_types
                    )));
                }
            } else {
                if span
                    .effective_track_types()
                    .intersect(self.track_types)
                    .is_empty()
                {
                    return Err(FramecastError::InvalidSequenceConfiguration(format!(
                        "span {i} contributes no declared track type \
                         (declared {}, effective {})",
                        self.track_types,
                        span.effective_track_types()
                    )));
                }
                if let Some(source) = span.media_source() {
                    validate_explicit_timing(i, &source.timing)?;
                }
            }
        }

        self.validate_leading_gap()
    }

    /// A gap may not lead the sequence unless every declared track type is
    /// covered by a force-track flag.
    fn validate_leading_gap(&self) -> Result<()> {
        let first = &self.spans[0];
        if !first.is_gap() {
            return Ok(());
        }
        for track in self.track_types.iter() {
            let covered = match track {
                TrackType::Audio => self.force_audio_track,
                TrackType::Video => self.force_video_track,
            };
            if !covered {
                return Err(FramecastError::InvalidSequenceConfiguration(format!(
                    "sequence starts with a gap but {track:?} has no force-track flag"
                )));
            }
        }
        Ok(())
    }
}

fn validate_explicit_timing(index: usize, timing: &FrameTiming) -> Result<()> {
    if let FrameTiming::Explicit(timestamps) = timing {
        for pair in timestamps.windows(2) {
            if pair[1] <= pair[0] {
                return Err(FramecastError::InvalidSequenceConfiguration(format!(
                    "span {index}: explicit frame timestamps must be strictly increasing"
                )));
            }
        }
        if timestamps.first().is_some_and(|t| *t < Timestamp::ZERO) {
            return Err(FramecastError::InvalidSequenceConfiguration(format!(
                "span {index}: explicit frame timestamps must be non-negative"
            )));
        }
    }
    Ok(())
}
