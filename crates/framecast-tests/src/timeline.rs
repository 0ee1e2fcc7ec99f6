//! Integration tests for timeline construction and persistence.
//!
//! Builds compositions the way a host application would: assemble
//! sequences, persist them, reload, and derive edited variants.

use framecast_core::{FrameRate, FramecastError, SpeedCurve, Timestamp, TrackType, TrackTypeSet};
use framecast_timeline::{
    CompositionBuilder, CompositionFile, Effect, ItemSpan, MediaSource, SequenceBuilder,
    SequenceTimeline,
};

// ── Helpers ────────────────────────────────────────────────────

fn media_item(path: &str, secs: i64, track_types: TrackTypeSet) -> ItemSpan {
    ItemSpan::media(
        MediaSource::new(path, FrameRate::FPS_30),
        Timestamp::SECOND * secs,
        track_types,
    )
}

fn sample_sequence() -> SequenceTimeline {
    SequenceBuilder::new(TrackTypeSet::both())
        .add_item(media_item("media/intro.mp4", 2, TrackTypeSet::both()))
        .add_gap(Timestamp::SECOND)
        .add_item(
            media_item("media/main.mp4", 4, TrackTypeSet::both())
                .with_speed(SpeedCurve::constant(2.0).unwrap()),
        )
        .build()
        .unwrap()
}

// ── Building ───────────────────────────────────────────────────

#[test]
fn composition_duration_follows_primary_through_speed_and_gaps() {
    // 2s + 1s gap + 4s at 2x = 5s.
    let composition = CompositionBuilder::new(sample_sequence()).build().unwrap();
    assert_eq!(composition.duration(), Timestamp::SECOND * 5);
}

#[test]
fn secondary_sequences_never_affect_duration() {
    let audio = SequenceBuilder::new(TrackTypeSet::audio())
        .add_item(media_item("media/music.mp3", 30, TrackTypeSet::audio()))
        .build()
        .unwrap();
    let composition = CompositionBuilder::new(sample_sequence())
        .add_sequence(audio)
        .build()
        .unwrap();
    assert_eq!(composition.duration(), Timestamp::SECOND * 5);
}

#[test]
fn leading_gap_requires_force_flags_for_all_declared_tracks() {
    let gap_led = |audio: bool, video: bool| {
        SequenceBuilder::new(TrackTypeSet::both())
            .add_gap(Timestamp::SECOND)
            .add_item(media_item("media/late.mp4", 1, TrackTypeSet::both()))
            .experimental_set_force_audio_track(audio)
            .experimental_set_force_video_track(video)
            .build()
    };
    assert!(gap_led(false, false).is_err());
    assert!(gap_led(true, false).is_err());
    assert!(gap_led(false, true).is_err());
    assert!(gap_led(true, true).is_ok());
}

#[test]
fn removal_flags_narrow_effective_tracks() {
    let seq = SequenceBuilder::new(TrackTypeSet::both())
        .add_item(media_item("media/a.mp4", 1, TrackTypeSet::both()).with_remove_audio(true))
        .add_item(media_item("media/b.mp4", 1, TrackTypeSet::both()))
        .build()
        .unwrap();

    let muted = &seq.spans()[0];
    assert!(!muted.effective_track_types().contains(TrackType::Audio));
    assert!(muted.effective_track_types().contains(TrackType::Video));
}

// ── Persistence ────────────────────────────────────────────────

#[test]
fn json_round_trip_preserves_every_field() {
    let composition = CompositionBuilder::new(sample_sequence())
        .add_effect(Effect::new("lut:kodak"))
        .build()
        .unwrap();

    let bytes = CompositionFile::new(composition.clone()).to_json().unwrap();
    let loaded = CompositionFile::from_json(&bytes).unwrap();

    assert_eq!(loaded.composition, composition);
    assert_eq!(loaded.composition.id(), composition.id());
    assert_eq!(loaded.composition.effects(), composition.effects());
    assert_eq!(
        loaded.composition.primary().spans().len(),
        composition.primary().spans().len()
    );
}

#[test]
fn tampered_file_is_rejected_on_load() {
    let composition = CompositionBuilder::new(sample_sequence()).build().unwrap();
    let bytes = CompositionFile::new(composition).to_json().unwrap();

    let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    // Emptying the span list breaks a structural invariant the builder
    // would have caught; loading must catch it too.
    value["composition"]["sequences"][0]["spans"] = serde_json::json!([]);
    let tampered = serde_json::to_vec(&value).unwrap();

    assert!(matches!(
        CompositionFile::from_json(&tampered),
        Err(FramecastError::InvalidSequenceConfiguration(_))
    ));
}

// ── Edit sessions ──────────────────────────────────────────────

#[test]
fn build_upon_gives_a_swap_safe_variant() {
    let original = CompositionBuilder::new(sample_sequence())
        .add_effect(Effect::new("grade:day"))
        .build()
        .unwrap();

    let regraded = original
        .build_upon()
        .set_effects(vec![Effect::new("grade:night")])
        .build()
        .unwrap();

    // Same spans and sequence ids: a host can swap without re-buffering.
    assert!(original.structurally_equal(&regraded));
    assert_ne!(original.effects(), regraded.effects());

    // Adding a sequence breaks structural equality.
    let extended = original
        .build_upon()
        .add_sequence(
            SequenceBuilder::new(TrackTypeSet::audio())
                .add_item(media_item("media/vo.mp3", 5, TrackTypeSet::audio()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    assert!(!original.structurally_equal(&extended));
}

#[test]
fn reloaded_composition_stays_structurally_equal() {
    let composition = CompositionBuilder::new(sample_sequence()).build().unwrap();
    let bytes = CompositionFile::new(composition.clone()).to_json().unwrap();
    let loaded = CompositionFile::from_json(&bytes).unwrap();
    assert!(composition.structurally_equal(&loaded.composition));
}
