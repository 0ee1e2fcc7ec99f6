//! Attribution: mapping a composition-relative timestamp back to the
//! source span that is active at that time.
//!
//! This is the authoritative frame-metadata mapping used by hosts and by
//! correctness assertions, mirroring the per-sequence prefix-sum walk the
//! scheduler itself performs.

use framecast_core::{Timestamp, TrackType};
use framecast_timeline::CompositionTimeline;

/// Index of the span active at `time` within the given sequence.
///
/// Looping sequences reduce `time` modulo their total duration, so a
/// timestamp from any loop iteration attributes to the right span.
/// Returns `None` for an unknown sequence, a negative time, a time at or
/// past the end of a non-looping sequence, or a secondary time beyond the
/// primary's (non-looping) reference duration.
pub fn expected_item_at_time(
    composition: &CompositionTimeline,
    sequence_index: usize,
    time: Timestamp,
) -> Option<usize> {
    let sequence = composition.sequences().get(sequence_index)?;
    if time < Timestamp::ZERO {
        return None;
    }
    if sequence_index > 0
        && !composition.primary().is_looping()
        && time >= composition.duration()
    {
        return None;
    }

    let local = if sequence.is_looping() {
        time.rem_euclid(sequence.total_duration())
    } else {
        time
    };
    sequence.span_at_time(local).map(|(index, _)| index)
}

/// Track-filtered variant of [`expected_item_at_time`]: resolves the span
/// and additionally requires it to contribute the given track type, so
/// audio attribution skips video-only spans (and vice versa).
pub fn expected_item_at_time_for_track(
    composition: &CompositionTimeline,
    sequence_index: usize,
    track: TrackType,
    time: Timestamp,
) -> Option<usize> {
    let index = expected_item_at_time(composition, sequence_index, time)?;
    let span = &composition.sequences()[sequence_index].spans()[index];
    span.effective_track_types().contains(track).then_some(index)
}
