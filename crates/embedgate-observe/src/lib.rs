//! Observability for embedgate: tracing subscriber setup and span attribute names.

pub mod span_attrs;
pub mod tracing_setup;
