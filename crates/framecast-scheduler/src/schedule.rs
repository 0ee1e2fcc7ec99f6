//! Per-sequence frame scheduling.
//!
//! `FrameSchedule` walks a sequence span by span and lazily yields
//! `ScheduledFrame` records: real media frames mapped through their speed
//! curves, and synthesized 1×1 blank frames covering gaps. The schedule is
//! a pure function of (sequence, config, position) — iterating the same
//! range twice yields identical results.

use framecast_core::{FrameRate, Resolution, Timestamp};
use framecast_timeline::{ItemSpan, SequenceTimeline};
use tracing::debug;

/// One output frame slot, produced lazily and consumed immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledFrame {
    /// Composition-relative presentation time. In looped playback this is
    /// absolute across iterations: loop N adds N × total sequence duration.
    pub presentation_time: Timestamp,
    /// Which sequence produced the frame.
    pub sequence_index: usize,
    /// Index of the source span within that sequence.
    pub item_index: usize,
    /// Frame resolution; `Resolution::BLANK` for synthesized gap frames.
    pub resolution: Resolution,
    /// Index of the intrinsic source frame filling this slot. `None` for
    /// gap frames. Under resampling, slow-down repeats indices and
    /// speed-up skips them.
    pub source_frame_index: Option<usize>,
    /// Whether this is a synthesized blank frame.
    pub is_gap_frame: bool,
}

/// Scheduling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Output cadence used for gap blanking and, when `resample` is set,
    /// for re-gridding media frames.
    pub output_frame_rate: FrameRate,
    /// When true, media frames are resampled onto the output grid: each
    /// output slot takes the nearest post-speed source frame, so slowed
    /// media repeats frames and sped-up media skips them. When false,
    /// every intrinsic frame is emitted at its remapped time.
    pub resample: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            output_frame_rate: FrameRate::FPS_30,
            resample: false,
        }
    }
}

/// A frame pending emission, intra-loop and composition-relative.
#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    time: Timestamp,
    item_index: usize,
    resolution: Resolution,
    source_frame: Option<usize>,
    is_gap: bool,
}

/// Lazy, pull-based frame schedule for one sequence.
///
/// Non-looping schedules are finite and end by returning `None`
/// (end-of-stream is not an error). Looping schedules are infinite and
/// offset each play-through by the total sequence duration so emitted
/// timestamps strictly increase across loop boundaries.
#[derive(Debug, Clone)]
pub struct FrameSchedule<'a> {
    sequence: &'a SequenceTimeline,
    config: SchedulerConfig,
    sequence_index: usize,
    total_duration: Timestamp,
    started: bool,
    span_index: usize,
    pending: Vec<PendingFrame>,
    cursor: usize,
    loop_index: i64,
    last_emitted_intra: Option<Timestamp>,
}

impl<'a> FrameSchedule<'a> {
    /// Create a schedule over `sequence`, tagging emitted frames with
    /// `sequence_index`.
    pub fn new(sequence: &'a SequenceTimeline, sequence_index: usize, config: SchedulerConfig) -> Self {
        let total_duration = sequence.total_duration();
        debug!(
            sequence_index,
            spans = sequence.spans().len(),
            total_us = total_duration.as_micros(),
            looping = sequence.is_looping(),
            "creating frame schedule"
        );
        Self {
            sequence,
            config,
            sequence_index,
            total_duration,
            started: false,
            span_index: 0,
            pending: Vec::new(),
            cursor: 0,
            loop_index: 0,
            last_emitted_intra: None,
        }
    }

    /// Completed loop iterations.
    pub fn loop_index(&self) -> i64 {
        self.loop_index
    }

    /// Reposition the schedule.
    ///
    /// `to` is an intra-loop position; in looping mode it is reduced
    /// modulo the sequence duration, and seeking backwards counts as a new
    /// play-through (the loop index advances) so the absolute output clock
    /// never runs backwards. A non-looping seek at or past the end
    /// exhausts the schedule.
    pub fn seek(&mut self, to: Timestamp) {
        if self.sequence.is_looping() {
            let intra = to.rem_euclid(self.total_duration);
            if self
                .last_emitted_intra
                .is_some_and(|last| intra <= last)
            {
                self.loop_index += 1;
            }
            self.position_at(intra);
        } else {
            self.position_at(to);
        }
    }

    fn position_at(&mut self, intra: Timestamp) {
        self.started = true;
        self.last_emitted_intra = None;
        match self.sequence.span_at_time(intra) {
            Some((index, _)) => {
                self.span_index = index;
                self.load_span();
                self.cursor = self.pending.partition_point(|frame| frame.time < intra);
            }
            None => {
                // At or beyond the end: exhausted until the next seek.
                self.span_index = self.sequence.spans().len().saturating_sub(1);
                self.pending.clear();
                self.cursor = 0;
            }
        }
    }

    /// Compute the pending frames for the current span.
    fn load_span(&mut self) {
        let span = &self.sequence.spans()[self.span_index];
        let window = self.sequence.span_window(self.span_index);

        self.pending.clear();
        self.cursor = 0;

        if span.is_gap() {
            self.load_gap_frames(window.start, window.duration);
            return;
        }

        let intrinsic = span
            .frame_timestamps()
            .unwrap_or_default();
        if intrinsic.is_empty() {
            return;
        }

        let resolution = span
            .media_source()
            .map_or(Resolution::HD, |source| source.resolution);

        if self.config.resample {
            self.load_resampled_frames(span, &intrinsic, window.start, window.duration, resolution);
        } else {
            // Every intrinsic frame, remapped through the speed curve.
            for (index, local) in intrinsic.into_iter().enumerate() {
                let mapped = match &span.speed {
                    Some(curve) => curve.map_to_output_time(local),
                    None => local,
                };
                let time = window.start + mapped;
                if window.contains(time) {
                    self.pending.push(PendingFrame {
                        time,
                        item_index: self.span_index,
                        resolution,
                        source_frame: Some(index),
                        is_gap: false,
                    });
                }
            }
        }
    }

    /// One blank frame per output interval covering the gap.
    fn load_gap_frames(&mut self, offset: Timestamp, duration: Timestamp) {
        let rate = self.config.output_frame_rate;
        for k in 0..rate.frames_spanning(duration) {
            self.pending.push(PendingFrame {
                time: offset + rate.timestamp_of_frame(k),
                item_index: self.span_index,
                resolution: Resolution::BLANK,
                source_frame: None,
                is_gap: true,
            });
        }
    }

    /// Walk the output grid across the span's post-speed window and pick
    /// the nearest source frame for each slot.
    fn load_resampled_frames(
        &mut self,
        span: &ItemSpan,
        intrinsic: &[Timestamp],
        offset: Timestamp,
        out_duration: Timestamp,
        resolution: Resolution,
    ) {
        let rate = self.config.output_frame_rate;
        for k in 0..rate.frames_spanning(out_duration) {
            let grid = rate.timestamp_of_frame(k);
            let local = match &span.speed {
                Some(curve) => curve.map_to_local_time(grid),
                None => grid,
            };
            // The nearest intrinsic timestamp decides which decoded frame
            // fills this slot; the slot time itself is what we emit.
            let source = nearest(intrinsic, local);
            self.pending.push(PendingFrame {
                time: offset + grid,
                item_index: self.span_index,
                resolution,
                source_frame: Some(source),
                is_gap: false,
            });
        }
    }

    fn advance_span(&mut self) -> bool {
        let len = self.sequence.spans().len();
        let next = if self.started { self.span_index + 1 } else { 0 };
        self.started = true;

        if next < len {
            self.span_index = next;
            true
        } else if self.sequence.is_looping() {
            self.loop_index += 1;
            self.last_emitted_intra = None;
            self.span_index = 0;
            true
        } else {
            false
        }
    }
}

impl Iterator for FrameSchedule<'_> {
    type Item = ScheduledFrame;

    fn next(&mut self) -> Option<ScheduledFrame> {
        // A full pass over the spans (plus wrap) with no frames means the
        // schedule yields nothing; bail instead of spinning on a looping
        // sequence of empty spans.
        let mut scanned = 0;
        let limit = 2 * self.sequence.spans().len() + 2;

        loop {
            if self.cursor < self.pending.len() {
                let frame = self.pending[self.cursor];
                self.cursor += 1;
                self.last_emitted_intra = Some(frame.time);
                return Some(ScheduledFrame {
                    presentation_time: self.total_duration * self.loop_index + frame.time,
                    sequence_index: self.sequence_index,
                    item_index: frame.item_index,
                    resolution: frame.resolution,
                    source_frame_index: frame.source_frame,
                    is_gap_frame: frame.is_gap,
                });
            }
            if !self.advance_span() {
                return None;
            }
            self.load_span();
            scanned += 1;
            if scanned > limit {
                return None;
            }
        }
    }
}

/// Index of the intrinsic timestamp closest to `target`.
fn nearest(timestamps: &[Timestamp], target: Timestamp) -> usize {
    let upper = timestamps.partition_point(|t| *t <= target);
    if upper == 0 {
        return 0;
    }
    if upper == timestamps.len() {
        return upper - 1;
    }
    let below = timestamps[upper - 1];
    let above = timestamps[upper];
    if (target - below) <= (above - target) {
        upper - 1
    } else {
        upper
    }
}
