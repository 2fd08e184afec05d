//! Flattened (inherited) properties, by-value types and static state.

mod models;

use graft::{Engine, Reflect};
use models::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[test]
fn test_update_inherited_property() {
    let engine = Engine::default();
    let ranked = Arc::new(Ranked::new(1, "Ada".into(), 3));

    let updated = engine.with(&ranked, "name", "Grace".to_string()).unwrap();

    assert_eq!(updated.base.name, "Grace");
    assert_eq!(updated.base.id, 1);
    assert_eq!(updated.rank, 3);
}

#[test]
fn test_update_own_property_keeps_inherited_ones() {
    let engine = Engine::default();
    let ranked = Arc::new(Ranked::new(1, "Ada".into(), 3));

    let updated = engine.with(&ranked, "rank", 4i64).unwrap();

    assert_eq!(updated.rank, 4);
    assert_eq!(updated.base.name, "Ada");
}

#[test]
fn test_two_levels_of_inheritance() {
    let engine = Engine::default();
    let promoted = Arc::new(Promoted::new(1, "Ada".into(), 3, "Lead".into()));

    let renamed = engine.with(&promoted, "id", 2i64).unwrap();
    let retitled = engine
        .with(&renamed, "title", "Principal".to_string())
        .unwrap();

    assert_eq!(retitled.base.base.id, 2);
    assert_eq!(retitled.base.base.name, "Ada");
    assert_eq!(retitled.base.rank, 3);
    assert_eq!(retitled.title, "Principal");
}

#[test]
fn test_flattened_properties_record_declaring_type() {
    let descriptor = Promoted::type_descriptor();
    let declared: Vec<_> = descriptor
        .properties()
        .iter()
        .map(|p| (p.name(), p.declared_in()))
        .collect();

    assert_eq!(
        declared,
        vec![
            ("id", "Named"),
            ("name", "Named"),
            ("rank", "Ranked"),
            ("title", "Promoted"),
        ]
    );
}

#[test]
fn test_inherited_target_converts_from_flat_dto() {
    let engine = Engine::default();
    let named = Arc::new(Named {
        id: 5,
        name: "Flat".into(),
    });
    let promoted = Arc::new(Promoted::new(9, "Deep".into(), 1, "t".into()));

    // Base-class view of a derived instance.
    let as_named: Arc<Named> = engine.convert_from(&promoted).unwrap();
    assert_eq!((as_named.id, as_named.name.as_str()), (9, "Deep"));

    // A flat source cannot feed `rank` or `title`.
    assert!(engine.convert_from::<Promoted, Named>(&named).is_err());
}

#[test]
fn test_by_value_member_update() {
    let engine = Engine::default();
    let segment = Arc::new(Segment {
        start: Point { x: 0, y: 0 },
        end: Point { x: 1, y: 1 },
    });

    let updated = engine.with(&segment, "end.x", 5i64).unwrap();

    assert_eq!(updated.end, Point { x: 5, y: 1 });
    assert_eq!(updated.start, Point { x: 0, y: 0 });
    assert_eq!(segment.end, Point { x: 1, y: 1 });
}

#[test]
fn test_by_value_whole_replacement_and_equality() {
    let engine = Engine::default();
    let segment = Arc::new(Segment {
        start: Point { x: 0, y: 0 },
        end: Point { x: 1, y: 1 },
    });

    let same = engine.with(&segment, "start", Point { x: 0, y: 0 }).unwrap();
    assert!(Arc::ptr_eq(&same, &segment));

    let moved = engine.with(&segment, "start", Point { x: 2, y: 3 }).unwrap();
    assert_eq!(moved.start, Point { x: 2, y: 3 });
}

#[test]
fn test_static_defaults_are_never_touched() {
    let engine = Engine::default();
    let settings = Arc::new(Settings {
        level: 2,
        label: "custom".into(),
        scratch: vec![1, 2, 3],
    });
    Settings::defaults();
    let before = SETTINGS_INITS.load(Ordering::SeqCst);

    let updated = engine.with(&settings, "level", 3i64).unwrap();
    let cloned: Arc<Settings> = engine.convert_from(&settings).unwrap();

    assert_eq!(updated.level, 3);
    assert_eq!(updated.label, "custom");
    // Skipped fields are not carried over.
    assert!(updated.scratch.is_empty());
    assert_eq!(cloned.label, "custom");
    assert_eq!(SETTINGS_INITS.load(Ordering::SeqCst), before);
}

#[test]
fn test_skipped_field_is_not_a_property() {
    let engine = Engine::default();
    let settings = Settings::defaults().clone();

    let err = engine
        .with(&settings, "scratch", "x".to_string())
        .unwrap_err();

    assert!(matches!(err, graft::GraftError::UnsupportedPath { .. }));
    assert_eq!(SETTINGS_INITS.load(Ordering::SeqCst), 1);
}
