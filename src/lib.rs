//! # quarry
//!
//! Typed query construction and execution over a declared entity model.
//!
//! Entities are described by static [`EntityDescriptor`]s. Queries are built
//! from [`EntityPath`] aliases and their [`Path`]s, translated to SQL with
//! positional parameters, run against a [`Store`] and mapped back into
//! scalars, [`Tuple`](projection::Tuple)s, managed [`Entity`]s or caller-defined
//! result types.
//!
//! ```rust
//! use quarry::prelude::*;
//!
//! static MEMBER: EntityDescriptor = EntityDescriptor::new("Member", "member", "id", &[
//!     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
//!     FieldDescriptor::scalar("username", "username", ScalarKind::String),
//!     FieldDescriptor::scalar("age", "age", ScalarKind::Integer),
//! ]);
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open_in_memory()?;
//! create_tables(store.connection(), &[&MEMBER])?;
//! let session = Session::new(store);
//! for (id, name, age) in [(1, "member1", 10), (2, "member2", 20)] {
//!     session.persist(
//!         NewEntity::of(&MEMBER).set("id", id)?.set("username", name)?.set("age", age)?,
//!     );
//! }
//! session.flush()?;
//!
//! let m = EntityPath::new(&MEMBER, "m");
//! let (username, age) = (m.path("username")?, m.path("age")?);
//! let found = session
//!     .query()
//!     .select_from(&m)
//!     .r#where(username.eq("member1")?.and(age.between(10, 30)?))
//!     .fetch_one()?
//!     .expect("member1 exists");
//! assert_eq!(found.get::<i64>("age")?, 10);
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! | Feature   | Enables                                            |
//! |-----------|----------------------------------------------------|
//! | `sqlite`  | [`SqliteStore`](sqlite::SqliteStore) over rusqlite (default) |
//! | `serde`   | `Deserialize` for [`EngineConfig`] and [`Dialect`] |
//! | `toml`    | [`EngineConfig::from_toml_str`]                    |
//! | `tracing` | structured query and session events                |

pub use quarry_core::*;

#[cfg(feature = "sqlite")]
pub use quarry_sqlite as sqlite;

#[cfg(feature = "sqlite")]
pub use rusqlite;

pub mod prelude {
    pub use quarry_core::prelude::*;
    pub use quarry_core::{constructor_target, field_target, setter_target};

    #[cfg(feature = "sqlite")]
    pub use quarry_sqlite::{SqliteStore, create_tables};
}
