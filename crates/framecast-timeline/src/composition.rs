//! Compositions: parallel sequences reconciled to one reference timeline.

use framecast_core::{FramecastError, Result, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::sequence::SequenceTimeline;

/// An opaque global effect descriptor. The timeline engine never
/// interprets effects; they ride along for the host's render pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect name, meaningful only to the host.
    pub name: String,
}

impl Effect {
    /// Create a named effect descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Builder for [`CompositionTimeline`].
#[derive(Debug, Clone)]
pub struct CompositionBuilder {
    sequences: Vec<SequenceTimeline>,
    effects: Vec<Effect>,
}

impl CompositionBuilder {
    /// Start a composition. The first sequence is the primary: the
    /// duration and timestamp reference for all consumers.
    pub fn new(primary: SequenceTimeline) -> Self {
        Self {
            sequences: vec![primary],
            effects: Vec::new(),
        }
    }

    /// Add a secondary sequence.
    pub fn add_sequence(mut self, sequence: SequenceTimeline) -> Self {
        self.sequences.push(sequence);
        self
    }

    /// Append a global effect.
    pub fn add_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Replace the effect set wholesale.
    pub fn set_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    /// Validate and finalize into an immutable [`CompositionTimeline`].
    pub fn build(self) -> Result<CompositionTimeline> {
        let composition = CompositionTimeline {
            id: Uuid::new_v4(),
            sequences: self.sequences,
            effects: self.effects,
        };
        composition.validate()?;
        Ok(composition)
    }
}

/// An immutable list of parallel sequences (first = primary) plus opaque
/// global effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionTimeline {
    id: Uuid,
    sequences: Vec<SequenceTimeline>,
    effects: Vec<Effect>,
}

impl CompositionTimeline {
    /// Unique composition ID.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// All sequences; index 0 is the primary.
    pub fn sequences(&self) -> &[SequenceTimeline] {
        &self.sequences
    }

    /// The primary sequence.
    pub fn primary(&self) -> &SequenceTimeline {
        &self.sequences[0]
    }

    /// Reference duration of the composition: the primary sequence's
    /// total post-speed duration. Secondary sequences are truncated at
    /// this point by consumers.
    pub fn duration(&self) -> Timestamp {
        self.primary().total_duration()
    }

    /// Global effects, in application order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Start a new builder sharing this composition's structure, allowing
    /// an overridden effects set. The original is untouched.
    pub fn build_upon(&self) -> CompositionBuilder {
        CompositionBuilder {
            sequences: self.sequences.clone(),
            effects: self.effects.clone(),
        }
    }

    /// Whether two compositions share the same sequence/span structure.
    /// Effects and removal flags are non-structural: a host can swap in a
    /// `build_upon` result that satisfies this without re-buffering.
    pub fn structurally_equal(&self, other: &Self) -> bool {
        self.sequences.len() == other.sequences.len()
            && self
                .sequences
                .iter()
                .zip(other.sequences.iter())
                .all(|(a, b)| {
                    a.id() == b.id()
                        && a.spans().len() == b.spans().len()
                        && a.spans()
                            .iter()
                            .zip(b.spans().iter())
                            .all(|(x, y)| x.id == y.id && x.duration == y.duration)
                })
    }

    /// Re-run all structural checks. Used after deserialization.
    pub fn validate(&self) -> Result<()> {
        if self.sequences.is_empty() {
            return Err(FramecastError::InvalidSequenceConfiguration(
                "composition has no sequences".into(),
            ));
        }
        for sequence in &self.sequences {
            sequence.validate()?;
        }

        // A looping secondary with a different total duration has no
        // finite truncation point that reconciles it with the primary
        // clock, so it is rejected up front rather than at schedule time.
        let primary_duration = self.primary().total_duration();
        for (i, sequence) in self.sequences.iter().enumerate().skip(1) {
            if sequence.is_looping() && sequence.total_duration() != primary_duration {
                return Err(FramecastError::UnsupportedMismatch(format!(
                    "looping sequence {i} has duration {} but the primary runs {}",
                    sequence.total_duration(),
                    primary_duration
                )));
            }
        }
        Ok(())
    }
}
