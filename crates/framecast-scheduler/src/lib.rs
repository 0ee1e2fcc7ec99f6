//! Framecast Scheduler - Deterministic presentation-timestamp scheduling
//!
//! Converts an immutable `CompositionTimeline` into a lazy, pull-based
//! stream of `ScheduledFrame` records:
//! - Per-sequence schedules with speed remapping, gap blanking, output
//!   resampling, looping, and seek
//! - Ordered multi-sequence merging with primary-duration truncation
//! - Timestamp-to-span attribution resolvers
//!
//! The scheduler owns no threads and performs no I/O; it is a computation
//! consulted by the host's pipeline at its own pace.

pub mod merge;
pub mod resolve;
pub mod schedule;

pub use merge::CompositionSchedule;
pub use resolve::{expected_item_at_time, expected_item_at_time_for_track};
pub use schedule::{FrameSchedule, ScheduledFrame, SchedulerConfig};
