//! Shared test models.

#![allow(dead_code)]

use graft::{FrozenList, Reflect, SharedList};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

// ============================================================================
// Organization graph
// ============================================================================

#[derive(Debug, Clone, Reflect)]
pub struct Employee {
    pub id: Uuid,
    pub first: String,
    pub last: String,
}

impl Employee {
    pub fn shared(first: &str, last: &str) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            first: first.into(),
            last: last.into(),
        })
    }
}

#[derive(Debug, Reflect)]
pub struct Department {
    pub title: String,
    pub manager: Option<Arc<Employee>>,
    pub employees: Option<SharedList<Arc<Employee>>>,
}

#[derive(Debug, Reflect)]
pub struct Organization {
    pub name: String,
    pub dept: Option<Arc<Department>>,
}

pub fn staff() -> SharedList<Arc<Employee>> {
    SharedList::new(vec![
        Employee::shared("Alice", "Smith"),
        Employee::shared("Bob", "Jones"),
        Employee::shared("Carol", "White"),
    ])
}

/// "org1" with department "Development", a manager and three employees.
pub fn sample_org() -> Arc<Organization> {
    Arc::new(Organization {
        name: "org1".into(),
        dept: Some(Arc::new(Department {
            title: "Development".into(),
            manager: Some(Employee::shared("dev", "mgr")),
            employees: Some(staff()),
        })),
    })
}

pub fn dept_of(org: &Organization) -> &Arc<Department> {
    org.dept.as_ref().expect("dept")
}

pub fn manager_of(org: &Organization) -> &Arc<Employee> {
    dept_of(org).manager.as_ref().expect("manager")
}

// ============================================================================
// Immutable lists
// ============================================================================

#[derive(Debug, Reflect)]
pub struct Team {
    pub name: String,
    pub members: FrozenList<Arc<Employee>>,
}

#[derive(Debug, Reflect)]
pub struct Tagged {
    pub tags: SharedList<String>,
}

/// The list is not a constructor parameter.
#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "name"))]
pub struct Roster {
    pub name: String,
    pub members: SharedList<String>,
}

impl Roster {
    pub fn new(name: String) -> Self {
        Self {
            name,
            members: SharedList::new(Vec::new()),
        }
    }
}

/// The constructor narrows `count`, so rebuilding fails once it exceeds `u8`.
#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "items, count"))]
pub struct Bounded {
    pub items: SharedList<String>,
    pub count: i64,
}

impl Bounded {
    pub fn new(items: SharedList<String>, count: u8) -> Self {
        Self {
            items,
            count: i64::from(count),
        }
    }
}

// ============================================================================
// Constructor selection
// ============================================================================

/// Two public constructors: needs an override.
#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "id, first_name, last_name"))]
#[graft(constructor(name = "from_names", params = "first_name_not_matching_property_name, last_name"))]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(id: i64, first_name: String, last_name: String) -> Self {
        Self {
            id,
            first_name,
            last_name,
        }
    }

    pub fn from_names(first_name: String, last_name: String) -> Self {
        Self::new(0, first_name, last_name)
    }
}

/// One public constructor plus a hidden one.
#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "code, label"))]
#[graft(constructor(name = "unlabeled", params = "code", hidden))]
pub struct Badge {
    pub code: i64,
    pub label: String,
}

impl Badge {
    pub fn new(code: i64, label: String) -> Self {
        Self { code, label }
    }

    pub fn unlabeled(code: i64) -> Self {
        Self::new(code, "none".into())
    }
}

// ============================================================================
// Computed properties
// ============================================================================

#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "user_name"))]
#[graft(computed(name = "nick_name", ty = "String"))]
pub struct PropertyMismatch {
    pub user_name: String,
}

impl PropertyMismatch {
    pub fn new(user_name: String) -> Self {
        Self { user_name }
    }

    pub fn nick_name(&self) -> String {
        format!("~{}~", self.user_name)
    }
}

#[derive(Debug, Reflect)]
pub struct MismatchHolder {
    pub label: String,
    pub inner: Arc<PropertyMismatch>,
}

// ============================================================================
// Inheritance
// ============================================================================

#[derive(Debug, Clone, Reflect)]
pub struct Named {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "id, name, rank"))]
pub struct Ranked {
    #[graft(flatten)]
    pub base: Named,
    pub rank: i64,
}

impl Ranked {
    pub fn new(id: i64, name: String, rank: i64) -> Self {
        Self {
            base: Named { id, name },
            rank,
        }
    }
}

#[derive(Debug, Reflect)]
#[graft(constructor(name = "new", params = "id, name, rank, title"))]
pub struct Promoted {
    #[graft(flatten)]
    pub base: Ranked,
    pub title: String,
}

impl Promoted {
    pub fn new(id: i64, name: String, rank: i64, title: String) -> Self {
        Self {
            base: Ranked::new(id, name, rank),
            title,
        }
    }
}

// ============================================================================
// Value types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Reflect)]
#[graft(by_value)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Reflect)]
#[graft(by_value)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

// ============================================================================
// Static initialization
// ============================================================================

pub static SETTINGS_INITS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug, Reflect)]
pub struct Settings {
    pub level: i64,
    pub label: String,
    #[graft(skip)]
    pub scratch: Vec<u8>,
}

impl Settings {
    /// Process-wide default instance, built on first use.
    pub fn defaults() -> &'static Arc<Settings> {
        static DEFAULTS: OnceLock<Arc<Settings>> = OnceLock::new();
        DEFAULTS.get_or_init(|| {
            SETTINGS_INITS.fetch_add(1, Ordering::SeqCst);
            Arc::new(Settings {
                level: 1,
                label: "default".into(),
                scratch: Vec::new(),
            })
        })
    }
}

// ============================================================================
// Deep nesting
// ============================================================================

#[derive(Debug, Reflect)]
pub struct Level4 {
    pub value: String,
}

#[derive(Debug, Reflect)]
pub struct Level3 {
    pub level4: Arc<Level4>,
    pub note: String,
}

#[derive(Debug, Reflect)]
pub struct Level2 {
    pub level3: Arc<Level3>,
}

#[derive(Debug, Reflect)]
pub struct Level1 {
    pub level2: Arc<Level2>,
    pub sibling: Arc<Level4>,
}

pub fn levels() -> Arc<Level1> {
    Arc::new(Level1 {
        level2: Arc::new(Level2 {
            level3: Arc::new(Level3 {
                level4: Arc::new(Level4 {
                    value: "deep".into(),
                }),
                note: "n".into(),
            }),
        }),
        sibling: Arc::new(Level4 {
            value: "side".into(),
        }),
    })
}

// ============================================================================
// Conversion sources
// ============================================================================

/// Same properties as `Employee`, different order and casing.
#[derive(Debug, Reflect)]
pub struct EmployeeDto {
    #[graft(rename = "Last")]
    pub last: String,
    #[graft(rename = "First")]
    pub first: String,
    #[graft(rename = "Id")]
    pub id: Uuid,
}

/// Missing `id`, so it cannot become an `Employee`.
#[derive(Debug, Reflect)]
pub struct PartialDto {
    pub first: String,
    pub last: String,
}
