//! Backend abstraction: one trait, one type-erased wrapper.

pub mod adapter;
pub mod box_backend;
