//! Multi-sequence reconciliation.
//!
//! Merges per-sequence schedules into a single ordered stream. The
//! primary sequence is the reference clock: when it does not loop,
//! secondary frames at or beyond its duration are dropped.

use framecast_timeline::CompositionTimeline;
use tracing::debug;

use crate::schedule::{FrameSchedule, ScheduledFrame, SchedulerConfig};

/// Ordered merge of all sequence schedules in a composition.
///
/// Frames come out in ascending presentation time; ties go to the lower
/// sequence index. Infinite when the primary sequence loops.
#[derive(Debug)]
pub struct CompositionSchedule<'a> {
    schedules: Vec<FrameSchedule<'a>>,
    peeked: Vec<Option<ScheduledFrame>>,
    done: Vec<bool>,
    truncate_at: Option<framecast_core::Timestamp>,
}

impl<'a> CompositionSchedule<'a> {
    /// Create a merged schedule over all sequences of `composition`.
    pub fn new(composition: &'a CompositionTimeline, config: SchedulerConfig) -> Self {
        let schedules: Vec<_> = composition
            .sequences()
            .iter()
            .enumerate()
            .map(|(index, sequence)| FrameSchedule::new(sequence, index, config))
            .collect();
        let count = schedules.len();

        let truncate_at = if composition.primary().is_looping() {
            None
        } else {
            Some(composition.duration())
        };
        debug!(
            sequences = count,
            truncate_at = ?truncate_at,
            "creating composition schedule"
        );

        Self {
            schedules,
            peeked: vec![None; count],
            done: vec![false; count],
            truncate_at,
        }
    }

    /// Refill the peek slot for one sequence, applying truncation.
    fn refill(&mut self, index: usize) {
        if self.peeked[index].is_some() || self.done[index] {
            return;
        }
        match self.schedules[index].next() {
            Some(frame) => {
                // Per-sequence times never decrease, so the first frame at
                // or past the primary's end exhausts a secondary for good.
                let truncated = index > 0
                    && self
                        .truncate_at
                        .is_some_and(|end| frame.presentation_time >= end);
                if truncated {
                    self.done[index] = true;
                } else {
                    self.peeked[index] = Some(frame);
                }
            }
            None => self.done[index] = true,
        }
    }
}

impl Iterator for CompositionSchedule<'_> {
    type Item = ScheduledFrame;

    fn next(&mut self) -> Option<ScheduledFrame> {
        for index in 0..self.schedules.len() {
            self.refill(index);
        }

        let winner = self
            .peeked
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|frame| (index, frame.presentation_time)))
            .min_by_key(|&(index, time)| (time, index))
            .map(|(index, _)| index)?;

        self.peeked[winner].take()
    }
}
