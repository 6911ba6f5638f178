//! SQLite store for quarry, backed by `rusqlite`.
//!
//! ```
//! use quarry_core::prelude::*;
//! use quarry_sqlite::{SqliteStore, create_tables};
//!
//! static TEAM: EntityDescriptor = EntityDescriptor::new("Team", "team", "id", &[
//!     FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
//!     FieldDescriptor::scalar("name", "name", ScalarKind::String),
//! ]);
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let store = SqliteStore::open_in_memory()?;
//! create_tables(store.connection(), &[&TEAM])?;
//!
//! let session = Session::new(store);
//! session.persist(NewEntity::of(&TEAM).set("id", 1)?.set("name", "teamA")?);
//! session.flush()?;
//!
//! let t = EntityPath::new(&TEAM, "t");
//! let names: Vec<String> = session.query().select(t.path("name")?).from(&t).fetch()?;
//! assert_eq!(names, ["teamA"]);
//! # Ok(())
//! # }
//! ```

mod ddl;
mod store;
mod values;

pub use ddl::{create_table_sql, create_tables};
pub use store::SqliteStore;
pub use values::{SqliteParam, ValueError, from_value_ref};
