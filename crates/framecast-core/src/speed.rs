//! Piecewise-constant playback speed curves.
//!
//! A `SpeedCurve` maps item-local time to composition output time by
//! integrating the reciprocal rate over each constant segment. Rates are
//! quantized to parts-per-million and integrated in exact integer
//! arithmetic, re-based at each breakpoint's microsecond boundary so
//! rounding error stays bounded per segment instead of growing with
//! curve length.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::error::{FramecastError, Result};
use crate::time::Timestamp;

/// A rate change point: `rate` applies from `start` until the next
/// breakpoint or the end of the item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Item-local time at which this rate takes effect.
    pub start: Timestamp,
    /// Playback rate; 2.0 plays twice as fast, 0.5 at half speed.
    pub rate: f32,
}

impl Breakpoint {
    /// Create a new breakpoint.
    pub const fn new(start: Timestamp, rate: f32) -> Self {
        Self { start, rate }
    }
}

/// Precomputed integration state for one constant-rate segment.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    /// Local start of the segment.
    start_us: i64,
    /// Output time accumulated by all earlier segments.
    out_start_us: i64,
    /// Rate in parts-per-million, always >= 1.
    rate_ppm: i64,
    /// Original rate, returned by `rate_at`.
    rate: f32,
}

/// An immutable piecewise-constant speed curve.
///
/// Validated once at construction; both time mappings are monotonic
/// non-decreasing and inverse of each other to within one source-rate
/// quantum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Breakpoint>", into = "Vec<Breakpoint>")]
pub struct SpeedCurve {
    breakpoints: SmallVec<[Breakpoint; 4]>,
    segments: SmallVec<[Segment; 4]>,
}

impl SpeedCurve {
    /// Build a curve from breakpoints.
    ///
    /// Fails with `InvalidSpeedCurve` if the list is empty, the first
    /// breakpoint does not start at zero, start times are not strictly
    /// increasing, or any rate is non-positive, non-finite, or below
    /// one part-per-million.
    pub fn new(breakpoints: impl IntoIterator<Item = Breakpoint>) -> Result<Self> {
        let breakpoints: SmallVec<[Breakpoint; 4]> = breakpoints.into_iter().collect();

        if breakpoints.is_empty() {
            return Err(FramecastError::InvalidSpeedCurve(
                "speed curve requires at least one breakpoint".into(),
            ));
        }
        if breakpoints[0].start != Timestamp::ZERO {
            return Err(FramecastError::InvalidSpeedCurve(format!(
                "first breakpoint must start at 0, got {}",
                breakpoints[0].start
            )));
        }

        let mut segments: SmallVec<[Segment; 4]> = SmallVec::with_capacity(breakpoints.len());
        let mut out_start_us: i64 = 0;

        for (i, bp) in breakpoints.iter().enumerate() {
            if !bp.rate.is_finite() || bp.rate <= 0.0 {
                return Err(FramecastError::InvalidSpeedCurve(format!(
                    "rate must be positive and finite, got {}",
                    bp.rate
                )));
            }
            let rate_ppm = (bp.rate as f64 * 1_000_000.0).round() as i64;
            if rate_ppm < 1 {
                return Err(FramecastError::InvalidSpeedCurve(format!(
                    "rate {} is below 1e-6 and has no microsecond-grid reciprocal",
                    bp.rate
                )));
            }
            if i > 0 && bp.start <= breakpoints[i - 1].start {
                return Err(FramecastError::InvalidSpeedCurve(format!(
                    "breakpoint starts must be strictly increasing ({} after {})",
                    bp.start,
                    breakpoints[i - 1].start
                )));
            }

            segments.push(Segment {
                start_us: bp.start.as_micros(),
                out_start_us,
                rate_ppm,
                rate: bp.rate,
            });

            // Accumulate this segment's output length for the next one.
            if let Some(next) = breakpoints.get(i + 1) {
                let local_len = next.start.as_micros() - bp.start.as_micros();
                out_start_us += scale_div(local_len, 1_000_000, rate_ppm);
            }
        }

        Ok(Self {
            breakpoints,
            segments,
        })
    }

    /// A curve with a single constant rate.
    pub fn constant(rate: f32) -> Result<Self> {
        Self::new([Breakpoint::new(Timestamp::ZERO, rate)])
    }

    /// The breakpoints this curve was built from.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Rate in effect at an item-local time.
    pub fn rate_at(&self, local: Timestamp) -> f32 {
        self.segments[self.segment_index_for_local(local)].rate
    }

    /// Map an item-local time to output time by integrating 1/rate
    /// over `[0, local)`.
    pub fn map_to_output_time(&self, local: Timestamp) -> Timestamp {
        let seg = &self.segments[self.segment_index_for_local(local)];
        let delta = local.as_micros() - seg.start_us;
        Timestamp::from_micros(seg.out_start_us + scale_div(delta, 1_000_000, seg.rate_ppm))
    }

    /// Inverse of [`map_to_output_time`](Self::map_to_output_time): the
    /// item-local time that lands at `output`.
    pub fn map_to_local_time(&self, output: Timestamp) -> Timestamp {
        let seg = &self.segments[self.segment_index_for_output(output)];
        let delta = output.as_micros() - seg.out_start_us;
        Timestamp::from_micros(seg.start_us + scale_div(delta, seg.rate_ppm, 1_000_000))
    }

    /// Post-speed duration of an item with the given local duration.
    pub fn output_duration(&self, local_duration: Timestamp) -> Timestamp {
        self.map_to_output_time(local_duration)
    }

    fn segment_index_for_local(&self, local: Timestamp) -> usize {
        self.segments
            .partition_point(|seg| seg.start_us <= local.as_micros())
            .saturating_sub(1)
    }

    fn segment_index_for_output(&self, output: Timestamp) -> usize {
        self.segments
            .partition_point(|seg| seg.out_start_us <= output.as_micros())
            .saturating_sub(1)
    }
}

impl TryFrom<Vec<Breakpoint>> for SpeedCurve {
    type Error = FramecastError;

    fn try_from(breakpoints: Vec<Breakpoint>) -> Result<Self> {
        Self::new(breakpoints)
    }
}

impl From<SpeedCurve> for Vec<Breakpoint> {
    fn from(curve: SpeedCurve) -> Self {
        curve.breakpoints.into_vec()
    }
}

impl fmt::Display for SpeedCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SpeedCurve({} segments)", self.segments.len())
    }
}

/// `value * num / den` in i128, floored. Keeps the full product exact for
/// any microsecond value that fits an i64.
#[inline]
fn scale_div(value: i64, num: i64, den: i64) -> i64 {
    (value as i128 * num as i128 / den as i128) as i64
}
