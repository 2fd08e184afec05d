//! Structural updates for immutable object graphs.
//!
//! `graft` produces a modified copy of an immutable object graph from a root
//! object, a path to one property or list element, and a new value. Every
//! ancestor along the path is rebuilt through one of its constructors;
//! everything off the path is shared with the original by `Arc` identity.
//!
//! # Core Concepts
//!
//! - **Reflect**: Trait exposing a type's properties and constructors, usually
//!   derived with `#[derive(Reflect)]`
//! - **Path**: A navigation path such as `dept.employees[1].last`
//! - **Strategy**: Which constructor rebuilds a type and which property feeds
//!   each parameter, resolved once per type and cached
//! - **Engine**: Applies updates, owns the caches and change handlers
//! - **Config**: Index write policy and per-type strategy overrides
//!
//! # Quick Start
//!
//! ```
//! use graft::{Engine, Reflect, SharedList};
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Reflect)]
//! struct Employee {
//!     first: String,
//!     last: String,
//! }
//!
//! #[derive(Debug, Reflect)]
//! struct Department {
//!     title: String,
//!     manager: Option<Arc<Employee>>,
//!     employees: SharedList<Arc<Employee>>,
//! }
//!
//! let alice = Arc::new(Employee { first: "Alice".into(), last: "Smith".into() });
//! let dept = Arc::new(Department {
//!     title: "Development".into(),
//!     manager: Some(alice.clone()),
//!     employees: SharedList::new(vec![alice.clone()]),
//! });
//!
//! let engine = Engine::default();
//! let updated = engine.with(&dept, "manager.first", "Alicia".to_string()).unwrap();
//!
//! assert_eq!(updated.manager.as_ref().unwrap().first, "Alicia");
//! assert_eq!(dept.manager.as_ref().unwrap().first, "Alice");
//! // Off-path subtrees are shared.
//! assert!(updated.employees.ptr_eq(&dept.employees));
//! ```
//!
//! # Change notifications
//!
//! ```
//! use graft::{Engine, Reflect};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Debug, Reflect)]
//! struct Counter {
//!     value: i64,
//! }
//!
//! let engine = Engine::default();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = seen.clone();
//! engine.on_change(move |event| sink.lock().unwrap().push(event.affected_properties.clone()));
//!
//! let counter = Arc::new(Counter { value: 1 });
//! engine.with(&counter, "value", 2i64).unwrap();
//! engine.with(&counter, "value", 1i64).unwrap(); // unchanged, no event
//!
//! assert_eq!(*seen.lock().unwrap(), vec![vec!["value".to_string()]]);
//! ```

extern crate self as graft;

mod config;
mod engine;
mod error;
mod eval;
mod ext;
mod notify;
mod path;
mod reflect;
mod steps;
mod strategy;
mod value;
mod walker;

// Core types
pub use config::{Config, IndexWrite, Options, StrategyOverride};
pub use engine::Engine;
pub use error::{GraftError, GraftResult};
pub use ext::WithExt;
pub use notify::{ChangeEvent, ChangeHandler, ChangeSink};
pub use path::{IntoPath, Path, Seg};

// Reflection
pub use reflect::{
    downcast_ref, Arguments, AsAny, ConstructorDescriptor, DescriptorBuilder, PropertyDescriptor,
    Reflect, TypeDescriptor,
};
pub use value::{FieldValue, FrozenList, ListAccess, SharedList, Shape, Value};

// Engine internals, exposed for inspection and pre-warming
pub use eval::{evaluate, trace};
pub use steps::{AccessStep, CompiledPath, Slot, StepExtractor};
pub use strategy::{Binding, Resolver, Strategy};

// Re-export derive macro when feature is enabled
#[cfg(feature = "derive")]
pub use graft_derive::Reflect;
