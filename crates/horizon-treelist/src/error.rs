//! Error types for the tree/list control.

use thiserror::Error;

use crate::config::MAX_LAYOUT_SIZE;
use crate::model::RowKey;

/// Errors reported by container operations and validated setters.
///
/// Every fallible operation checks its arguments before touching any state,
/// so an `Err` always means nothing was mutated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeListError {
    /// The key does not name a live row of this control.
    #[error("row {0} does not belong to this control")]
    UnknownRow(RowKey),

    /// A positional index was past the end of a container.
    #[error("index {index} out of range for container of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// A size, padding or offset that must not be negative was negative.
    #[error("{name} must not be negative (got {value})")]
    NegativeValue { name: &'static str, value: i32 },

    /// A size that must be strictly positive was zero or negative.
    #[error("{name} must be greater than zero (got {value})")]
    NonPositiveValue { name: &'static str, value: i32 },

    /// A layout size exceeded its upper bound.
    #[error("{name} must be at most {max} (got {value})")]
    ValueTooLarge {
        name: &'static str,
        value: i32,
        max: i32,
    },

    /// No column resize is in progress.
    #[error("no column resize in progress")]
    NoResizeInProgress,
}

/// Result type for tree/list operations.
pub type Result<T> = std::result::Result<T, TreeListError>;

/// Rejects negative values for the named property.
pub(crate) fn ensure_non_negative(name: &'static str, value: i32) -> Result<i32> {
    if value < 0 {
        tracing::debug!(target: crate::logging::targets::CONTROL, name, value, "rejected negative value");
        return Err(TreeListError::NegativeValue { name, value });
    }
    Ok(value)
}

/// Rejects zero or negative values for the named property.
pub(crate) fn ensure_positive(name: &'static str, value: i32) -> Result<i32> {
    if value <= 0 {
        tracing::debug!(target: crate::logging::targets::CONTROL, name, value, "rejected non-positive value");
        return Err(TreeListError::NonPositiveValue { name, value });
    }
    Ok(value)
}

/// Rejects values above `max` for the named property.
pub(crate) fn ensure_at_most(name: &'static str, value: i32, max: i32) -> Result<i32> {
    if value > max {
        tracing::debug!(target: crate::logging::targets::CONTROL, name, value, max, "rejected oversized value");
        return Err(TreeListError::ValueTooLarge { name, value, max });
    }
    Ok(value)
}

/// Accepts `0..=MAX_LAYOUT_SIZE` for the named row-layout size.
pub(crate) fn ensure_layout_size(name: &'static str, value: i32) -> Result<i32> {
    ensure_non_negative(name, value)?;
    ensure_at_most(name, value, MAX_LAYOUT_SIZE)
}
