//! Error types for the view runtime.

use std::fmt;

use crate::transition::TransitionKind;
use crate::view::ViewId;

/// Errors that can occur while requesting, pooling or driving views.
///
/// None of these are fatal; every operation that reports one leaves the
/// runtime in the state it was in before the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// The view type was never added through a library.
    NotRegistered {
        /// Type name of the requested view.
        type_name: &'static str,
    },

    /// The pool had no instance of the type and no template to clone.
    NoTemplate {
        /// Type name of the requested view.
        type_name: &'static str,
    },

    /// An instance was returned to the pool that is not currently borrowed.
    InvalidReturn {
        /// Type name of the returned view.
        type_name: &'static str,
    },

    /// A show/close request arrived while the view could not honour it.
    ReentrantTransition {
        /// The view the request was made on.
        view: ViewId,
        /// Direction of the rejected request.
        kind: TransitionKind,
    },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NotRegistered { type_name } => {
                write!(f, "View type not registered: {}", type_name)
            }
            ViewError::NoTemplate { type_name } => {
                write!(f, "No pooled instance or template for view type: {}", type_name)
            }
            ViewError::InvalidReturn { type_name } => {
                write!(f, "Returned view is not borrowed from the pool: {}", type_name)
            }
            ViewError::ReentrantTransition { view, kind } => {
                write!(f, "{} request rejected for {}: transition in flight", kind, view)
            }
        }
    }
}

impl std::error::Error for ViewError {}

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;
