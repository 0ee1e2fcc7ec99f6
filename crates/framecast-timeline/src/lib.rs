//! Framecast Timeline - Composition data model
//!
//! Implements the declarative timeline structure for the composition
//! engine:
//! - Spans: media items and gaps with local durations and speed curves
//! - Sequences: ordered spans with build-time validation
//! - Compositions: parallel sequences with a primary reference timeline
//! - Versioned JSON persistence

pub mod composition;
pub mod sequence;
pub mod serialization;
pub mod span;

pub use composition::{CompositionBuilder, CompositionTimeline, Effect};
pub use sequence::{SequenceBuilder, SequenceTimeline};
pub use serialization::{CompositionFile, CURRENT_VERSION};
pub use span::{FrameTiming, ItemSpan, MediaSource, SpanKind};
