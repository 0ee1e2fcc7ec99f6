//! Framecast Core - Foundation types for the composition timeline engine
//!
//! This crate provides the fundamental types used throughout Framecast:
//! - Time representation (Timestamp, FrameRate, TimeSpan)
//! - Playback speed curves (SpeedCurve)
//! - Frame and track metadata (Resolution, TrackType)

pub mod error;
pub mod frame;
pub mod speed;
pub mod time;

pub use error::{FramecastError, Result};
pub use frame::{Resolution, TrackType, TrackTypeSet};
pub use speed::{Breakpoint, SpeedCurve};
pub use time::{FrameRate, TimeSpan, Timestamp};
