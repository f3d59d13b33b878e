//! User-authored fit functions
//!
//! A [`FunctionSpec`] names an expression over `x`, its display (LaTeX) form
//! and one display label per free parameter. Specs live in a
//! [`FunctionTable`], independent of the settings tree, which only refers to
//! them by name. [`FunctionDraft`] implements the editing workflow.

pub mod editor;
pub mod table;

use thiserror::Error;

pub use editor::FunctionDraft;
pub use table::{FunctionSpec, FunctionTable};

/// Errors raised by the function table and editor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    #[error("Please type in a function name")]
    EmptyName,

    #[error("Function name is not an identifier: {name}")]
    InvalidName { name: String },

    #[error("Function name already defined: {name}")]
    DuplicateName { name: String },

    #[error("Unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("Function is selected by a fit and cannot be deleted: {name}")]
    InUse { name: String },

    #[error("Malformed function definitions: {message}")]
    Malformed { message: String },
}
