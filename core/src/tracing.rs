//! Tracing utilities for query and session observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level tracing event with the SQL text and parameter count.
///
/// ```ignore
/// quarry_trace_query!("translated", &sql, params.len());
/// ```
#[macro_export]
macro_rules! quarry_trace_query {
    ($stage:literal, $sql:expr, $param_count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(stage = $stage, sql = %$sql, params = $param_count, "quarry.query");
    };
}

/// Emit a debug-level event with the bound parameter values.
///
/// Only called when [`EngineConfig::log_parameters`](crate::config::EngineConfig) is set.
#[macro_export]
macro_rules! quarry_trace_params {
    ($params:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(params = ?$params, "quarry.params");
    };
}

/// Emit an info-level tracing event for session lifecycle (flush, clear).
///
/// ```ignore
/// quarry_trace_session!("flush", pending);
/// ```
#[macro_export]
macro_rules! quarry_trace_session {
    ($event:literal, $count:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(event = $event, entities = $count, "quarry.session");
    };
}

/// Emit a debug-level event when a row resolves to an already-managed entity.
#[macro_export]
macro_rules! quarry_trace_identity_hit {
    ($entity:expr, $id:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(entity = $entity, id = %$id, "quarry.identity_hit");
    };
}

/// Emit a warning-level event when paging is applied after fetching.
#[macro_export]
macro_rules! quarry_trace_in_memory_paging {
    ($limit:expr, $offset:expr) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(limit = ?$limit, offset = ?$offset, "quarry.paging_in_memory");
    };
}
