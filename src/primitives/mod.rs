//! Core compute primitives.
//!
//! Feature tables, probability tables and correlation matrices all share the
//! row-major [`Matrix`] type.

mod matrix;

pub use matrix::Matrix;
