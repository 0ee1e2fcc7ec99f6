//! Time representation for frame-accurate composition.
//!
//! All composition arithmetic is done in microsecond integers; frame rates
//! are rational numbers and grid positions are computed from the exact
//! numerator/denominator in widened integer math, so NTSC-style rates
//! (30000/1001) never accumulate drift on the microsecond grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A point in (or duration of) composition time, in microseconds.
/// Serializes as a bare microsecond count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    micros: i64,
}

impl Timestamp {
    /// Create a timestamp from a microsecond count.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Microsecond count.
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.micros
    }

    /// Create a timestamp from seconds as a float.
    /// Note: May introduce sub-microsecond rounding.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        Self {
            micros: (seconds * 1_000_000.0).round() as i64,
        }
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        self.micros as f64 / 1_000_000.0
    }

    /// Zero time constant.
    pub const ZERO: Self = Self { micros: 0 };

    /// One second, for building fixture durations.
    pub const SECOND: Self = Self { micros: 1_000_000 };

    /// Check if this timestamp is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.micros == 0
    }

    /// Check if this timestamp is strictly positive.
    #[inline]
    pub fn is_positive(self) -> bool {
        self.micros > 0
    }

    /// Saturating addition.
    #[inline]
    pub fn saturating_add(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.saturating_add(rhs.micros),
        }
    }

    /// Get the absolute value of this timestamp.
    #[inline]
    pub fn abs(self) -> Self {
        Self {
            micros: self.micros.abs(),
        }
    }

    /// Euclidean remainder, used to reduce looped positions into a single
    /// play-through. `rhs` must be positive.
    #[inline]
    pub fn rem_euclid(self, rhs: Self) -> Self {
        Self {
            micros: self.micros.rem_euclid(rhs.micros),
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Timestamp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            micros: self.micros + rhs.micros,
        }
    }
}

impl Sub for Timestamp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            micros: self.micros - rhs.micros,
        }
    }
}

impl Neg for Timestamp {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            micros: -self.micros,
        }
    }
}

impl Mul<i64> for Timestamp {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self {
            micros: self.micros * rhs,
        }
    }
}

impl Div<i64> for Timestamp {
    type Output = Self;
    fn div(self, rhs: i64) -> Self {
        Self {
            micros: self.micros / rhs,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.micros)
    }
}

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Timestamp of frame `index` on this rate's output grid.
    ///
    /// Computed as `floor(index * 1e6 * den / num)` from the exact frame
    /// boundary each time, so the grid never accumulates drift.
    pub fn timestamp_of_frame(self, index: i64) -> Timestamp {
        let micros =
            (index as i128 * 1_000_000 * self.denominator as i128) / self.numerator as i128;
        Timestamp::from_micros(micros as i64)
    }

    /// Index of the frame whose grid slot contains `time`.
    pub fn frame_index_at(self, time: Timestamp) -> i64 {
        let index = (time.as_micros() as i128 * self.numerator as i128)
            / (1_000_000 * self.denominator as i128);
        index as i64
    }

    /// Number of grid slots needed to cover a span of `duration`,
    /// i.e. `ceil(duration * fps)`.
    pub fn frames_spanning(self, duration: Timestamp) -> i64 {
        let num = duration.as_micros() as i128 * self.numerator as i128;
        let den = 1_000_000 * self.denominator as i128;
        ((num + den - 1) / den) as i64
    }

    /// Common frame rates
    pub const FPS_23_976: Self = Self::new(24000, 1001);
    pub const FPS_24: Self = Self::new(24, 1);
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
    pub const FPS_50: Self = Self::new(50, 1);
    pub const FPS_59_94: Self = Self::new(60000, 1001);
    pub const FPS_60: Self = Self::new(60, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// A half-open window on the composition timeline.
///
/// Spans expose their post-speed output windows as `TimeSpan` values so
/// the scheduler and attribution queries share one containment rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSpan {
    /// Start time (inclusive)
    pub start: Timestamp,
    /// Duration of the window
    pub duration: Timestamp,
}

impl TimeSpan {
    /// Create a window from start and duration.
    #[inline]
    pub fn new(start: Timestamp, duration: Timestamp) -> Self {
        Self { start, duration }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> Timestamp {
        self.start + self.duration
    }

    /// Whether `time` falls inside the window.
    #[inline]
    pub fn contains(self, time: Timestamp) -> bool {
        time >= self.start && time < self.end()
    }
}
