//! Crate-wide error type and result alias.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors surfaced by the kernel.
///
/// Constraint (multiplicity) violations are deliberately not represented
/// here: they are collected into a [`crate::check::ConstraintReport`] so a
/// full validation pass can finish before the caller decides what to do.
#[derive(Debug, Error)]
pub enum GraphError {
    /// An id space reached its configured maximum capacity.
    #[error("capacity exceeded: {0}")]
    CapacityExceeded(&'static str),
    /// A structural operation was rejected (self-relocation, wrong
    /// endpoint types, instantiating an abstract class, ...).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    /// A write was attempted while the read-only gate is set.
    #[error("graph is read-only")]
    ReadOnly,
    /// The named element does not exist in this graph.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The attribute name is not declared for the element's class.
    #[error("no such attribute `{name}` on class `{class}`")]
    NoSuchAttribute {
        /// Name of the element's class.
        class: String,
        /// The undeclared attribute name.
        name: String,
    },
    /// A value's shape does not match the attribute's declared domain.
    #[error("value {value} does not conform to domain {domain}")]
    NotConformant {
        /// Name of the rejecting domain.
        domain: String,
        /// Display form of the rejected value.
        value: String,
    },
    /// Malformed attribute text.
    #[error("parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset into the input where parsing failed.
        position: usize,
        /// What went wrong.
        message: String,
    },
    /// The schema under construction is inconsistent.
    #[error("schema error: {0}")]
    Schema(String),
}
