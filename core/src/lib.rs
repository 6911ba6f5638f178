//! Core of the quarry query engine: entity metamodel consumption, typed
//! expressions, predicates, statement builders, SQL translation, row mapping
//! and the persistence context. Store backends live in sibling crates.

pub mod builder;
pub mod config;
pub mod dialect;
pub mod entity;
pub mod error;
pub mod execute;
pub mod expr;
pub mod path;
pub mod predicate;
pub mod projection;
pub mod row;
pub mod schema;
pub mod session;
pub mod sql;
pub mod statement;
pub mod store;
pub mod subquery;
pub mod tracing;
pub mod translate;
pub mod types;
pub mod value;

// Re-export key types and traits
pub use builder::{QueryFactory, SelectQuery};
pub use config::EngineConfig;
pub use dialect::Dialect;
pub use entity::Entity;
pub use error::{QueryError, Result, StoreError};
pub use execute::QueryResults;
pub use expr::{Expression, constant};
pub use path::{Association, EntityPath, Path};
pub use predicate::{Predicate, PredicateBuilder};
pub use row::Row;
pub use schema::{EntityDescriptor, FieldDescriptor};
pub use session::{NewEntity, PersistenceContext, Session};
pub use store::Store;
pub use translate::{TranslatedQuery, Translator};
pub use types::ScalarKind;
pub use value::{FromValue, Value};

pub mod prelude {
    pub use crate::builder::{Detached, QueryFactory};
    pub use crate::config::EngineConfig;
    pub use crate::dialect::Dialect;
    pub use crate::entity::{AssociationState, Entity};
    pub use crate::error::{QueryError, Result, StoreError};
    pub use crate::execute::QueryResults;
    pub use crate::expr::{
        CaseBuilder, Expression, OrderSpecifier, boolean_template, constant, number_template,
        string_template, template,
    };
    pub use crate::path::{Association, EntityPath, Path};
    pub use crate::predicate::{IntoCondition, Predicate, PredicateBuilder, exists};
    pub use crate::projection::{
        ConstructorTarget, FieldTarget, Projections, SetterTarget, Tuple,
    };
    pub use crate::schema::{EntityDescriptor, FieldDescriptor};
    pub use crate::session::{NewEntity, PersistenceContext, Session};
    pub use crate::store::Store;
    pub use crate::subquery;
    pub use crate::translate::{TranslatedQuery, Translator};
    pub use crate::types::ScalarKind;
    pub use crate::value::{FromValue, Value};
}
