//! Path updates on the organization graph.
//!
//! Covers structural sharing, the equality short-circuit and argument
//! validation.

mod models;

use graft::{path, Engine, GraftError, Value, WithExt};
use models::*;
use std::sync::Arc;

#[test]
fn test_update_immediate_property_shares_siblings() {
    let engine = Engine::default();
    let org = Arc::new(Organization {
        name: "org1".into(),
        dept: Some(Arc::new(Department {
            title: "d1".into(),
            manager: None,
            employees: None,
        })),
    });

    let updated = engine.with(&org, "name", "org2".to_string()).unwrap();

    assert_eq!(updated.name, "org2");
    assert_eq!(org.name, "org1");
    assert!(Arc::ptr_eq(dept_of(&updated), dept_of(&org)));
}

#[test]
fn test_update_nested_property() {
    let engine = Engine::default();
    let org = sample_org();
    let id = manager_of(&org).id;

    let updated = engine
        .with(&org, "dept.manager.first", "Foo".to_string())
        .unwrap();

    assert_eq!(manager_of(&updated).first, "Foo");
    assert_eq!(manager_of(&updated).id, id);
    assert_eq!(manager_of(&updated).last, "mgr");
    assert!(!Arc::ptr_eq(&updated, &org));
    assert_eq!(manager_of(&org).first, "dev");
}

#[test]
fn test_rebuilt_ancestors_are_new_and_siblings_are_shared() {
    let engine = Engine::default();
    let org = sample_org();

    let updated = engine
        .with(&org, "dept.manager.last", "Boss".to_string())
        .unwrap();

    assert!(!Arc::ptr_eq(dept_of(&updated), dept_of(&org)));
    assert!(!Arc::ptr_eq(manager_of(&updated), manager_of(&org)));
    let before = dept_of(&org).employees.as_ref().unwrap();
    let after = dept_of(&updated).employees.as_ref().unwrap();
    assert!(before.ptr_eq(after));
    assert_eq!(dept_of(&updated).title, "Development");
}

#[test]
fn test_same_value_returns_original_root() {
    let engine = Engine::default();
    let org = sample_org();
    let id = manager_of(&org).id;

    let updated = engine.with(&org, "dept.manager.id", id).unwrap();

    assert!(Arc::ptr_eq(&updated, &org));
}

#[test]
fn test_same_value_on_immediate_property_returns_original_root() {
    let engine = Engine::default();
    let org = sample_org();

    let updated = engine.with(&org, "name", "org1".to_string()).unwrap();

    assert!(Arc::ptr_eq(&updated, &org));
}

#[test]
fn test_equal_object_is_a_no_op() {
    let engine = Engine::default();
    let org = sample_org();
    let manager = manager_of(&org);
    let twin = Arc::new(Employee {
        id: manager.id,
        first: manager.first.clone(),
        last: manager.last.clone(),
    });

    let updated = engine.with(&org, "dept.manager", Some(twin)).unwrap();

    assert!(Arc::ptr_eq(&updated, &org));
}

#[test]
fn test_replace_whole_subtree() {
    let engine = Engine::default();
    let org = sample_org();
    let replacement = Employee::shared("New", "Manager");

    let updated = engine
        .with(&org, "dept.manager", Some(replacement.clone()))
        .unwrap();

    assert!(Arc::ptr_eq(manager_of(&updated), &replacement));
}

#[test]
fn test_set_to_null_and_back() {
    let engine = Engine::default();
    let org = sample_org();

    let cleared = engine
        .with(&org, "dept.manager", None::<Arc<Employee>>)
        .unwrap();
    assert!(dept_of(&cleared).manager.is_none());

    let restored = engine
        .with(&cleared, "dept.manager", Some(Employee::shared("a", "b")))
        .unwrap();
    assert_eq!(manager_of(&restored).first, "a");
}

#[test]
fn test_builder_path_and_macro() {
    let engine = Engine::default();
    let org = sample_org();

    let by_builder = engine
        .with(
            &org,
            graft::Path::root().key("dept").key("title"),
            "Ops".to_string(),
        )
        .unwrap();
    let by_macro = engine
        .with(&org, path!("dept", "title"), "Ops".to_string())
        .unwrap();

    assert_eq!(dept_of(&by_builder).title, "Ops");
    assert_eq!(dept_of(&by_macro).title, "Ops");
}

#[test]
fn test_successive_updates_compose() {
    let engine = Engine::default();
    let org = sample_org();

    let step1 = engine.with(&org, "name", "org2".to_string()).unwrap();
    let step2 = engine
        .with(&step1, "dept.title", "Research".to_string())
        .unwrap();

    assert_eq!(step2.name, "org2");
    assert_eq!(dept_of(&step2).title, "Research");
    assert!(Arc::ptr_eq(
        manager_of(&step2),
        manager_of(&org)
    ));
}

#[test]
fn test_with_ext() {
    let engine = Engine::default();
    let org = sample_org();

    let updated = org
        .with_in(&engine, "dept.manager.last", "Ext".to_string())
        .unwrap();

    assert_eq!(manager_of(&updated).last, "Ext");
}

#[test]
fn test_untyped_apply() {
    let engine = Engine::default();
    let org: Value = Value::object(sample_org());

    let updated = engine
        .apply(org.clone(), "dept.title", Value::Str("Untyped".into()))
        .unwrap();

    let updated: Arc<Organization> = graft::FieldValue::from_value(updated).unwrap();
    assert_eq!(dept_of(&updated).title, "Untyped");
}

#[test]
fn test_null_root() {
    let engine = Engine::default();
    let err = engine
        .apply(Value::Null, "name", Value::Str("x".into()))
        .unwrap_err();
    assert!(matches!(err, GraftError::NullArgument { argument: "root" }));
}

#[test]
fn test_empty_path() {
    let engine = Engine::default();
    let org = sample_org();
    for empty in ["", "$"] {
        let err = engine.with(&org, empty, "x".to_string()).unwrap_err();
        assert!(
            matches!(err, GraftError::NullArgument { argument: "path" }),
            "{empty:?}: {err:?}"
        );
    }
}

#[test]
fn test_traversing_null_is_path_not_found() {
    let engine = Engine::default();
    let org = Arc::new(Organization {
        name: "o".into(),
        dept: None,
    });

    let err = engine
        .with(&org, "dept.manager.first", "x".to_string())
        .unwrap_err();

    match err {
        GraftError::PathNotFound { path } => assert_eq!(path.to_string(), "$.dept.manager"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_wrong_value_type_is_type_mismatch() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine.with(&org, "dept.title", 42i64).unwrap_err();

    match err {
        GraftError::TypeMismatch {
            path,
            expected,
            found,
        } => {
            assert_eq!(path.to_string(), "$.dept.title");
            assert_eq!(expected, "string");
            assert_eq!(found, "int");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(dept_of(&org).title, "Development");
}

#[test]
fn test_unknown_property_is_unsupported_path() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine
        .with(&org, "dept.boss.first", "x".to_string())
        .unwrap_err();

    match err {
        GraftError::UnsupportedPath { expression, .. } => assert_eq!(expression, "$.dept.boss"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_member_on_scalar_is_unsupported_path() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine
        .with(&org, "name.length", 3i64)
        .unwrap_err();

    assert!(matches!(err, GraftError::UnsupportedPath { .. }));
}

#[test]
fn test_index_on_non_list_is_unsupported_path() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine
        .with(&org, "dept.manager[0]", None::<Arc<Employee>>)
        .unwrap_err();

    match err {
        GraftError::UnsupportedPath { expression, .. } => {
            assert_eq!(expression, "$.dept.manager[0]")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_index_on_root_is_unsupported_path() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine.with(&org, "[0]", "x".to_string()).unwrap_err();

    assert!(matches!(err, GraftError::UnsupportedPath { .. }));
}

#[test]
fn test_malformed_path_text() {
    let engine = Engine::default();
    let org = sample_org();

    let err = engine.with(&org, "dept..title", "x".to_string()).unwrap_err();

    assert!(matches!(err, GraftError::UnsupportedPath { .. }));
}

#[test]
fn test_engines_are_independent() {
    let a = Engine::default();
    let b = Engine::default();
    let org = sample_org();

    a.with(&org, "name", "x".to_string()).unwrap();

    assert_ne!(a.cache_sizes(), (0, 0));
    assert_eq!(b.cache_sizes(), (0, 0));
}
