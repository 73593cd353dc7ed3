//! Error types for simpl-filters
//!
//! Filter and pipeline errors carry the same kind of fixed negative codes as
//! [`SimplError`], so a pipeline can report any failure as a single integer.

use std::path::PathBuf;

use simpl_core::SimplError;
use thiserror::Error;

/// Fixed negative error codes raised by filters and the pipeline
pub mod codes {
    /// Replace value does not fit an integer element type
    pub const INTEGER_VALUE_OUT_OF_RANGE: i32 = -100;
    /// Replace value does not fit a floating point element type
    pub const FLOAT_VALUE_OUT_OF_RANGE: i32 = -101;

    /// `execute` called on a pipeline that is not idle
    pub const ALREADY_EXECUTING: i32 = -200;
    /// `cancel` called on a pipeline that is not executing
    pub const CANNOT_CANCEL: i32 = -201;
    /// `preflight` called on a pipeline that is not idle
    pub const PREFLIGHT_WHILE_EXECUTING: i32 = -203;

    /// An array that must be single-component has more components
    pub const NOT_SCALAR_ARRAY: i32 = -11002;

    pub const INVALID_CONFIG: i32 = -12000;
}

/// Main error type for filters and pipelines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Failure raised by the data model or the dispatcher
    #[error(transparent)]
    Core(#[from] SimplError),

    /// The replace value cannot be represented by the array's element type
    #[error("The {role} value {value} is outside the range of {type_name} ({min} to {max})")]
    InvalidReplaceValue {
        role: &'static str,
        value: f64,
        type_name: &'static str,
        min: f64,
        max: f64,
        code: i32,
    },

    /// A single-component array was required
    #[error("The array '{name}' has {components} components; only single-component arrays are supported")]
    NotScalarArray { name: String, components: usize },

    #[error("Pipeline '{pipeline}' could not be executed because it is already executing")]
    AlreadyExecuting { pipeline: String },

    #[error("Pipeline '{pipeline}' could not be canceled because it is {reason}")]
    CannotCancel {
        pipeline: String,
        reason: &'static str,
    },

    #[error("Pipeline '{pipeline}' could not be preflighted because it is executing")]
    PreflightWhileExecuting { pipeline: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FilterError {
    /// Fixed negative code for this error
    pub fn code(&self) -> i32 {
        match self {
            FilterError::Core(err) => err.code(),
            FilterError::InvalidReplaceValue { code, .. } => *code,
            FilterError::NotScalarArray { .. } => codes::NOT_SCALAR_ARRAY,
            FilterError::AlreadyExecuting { .. } => codes::ALREADY_EXECUTING,
            FilterError::CannotCancel { .. } => codes::CANNOT_CANCEL,
            FilterError::PreflightWhileExecuting { .. } => codes::PREFLIGHT_WHILE_EXECUTING,
            FilterError::Config(_) => codes::INVALID_CONFIG,
        }
    }
}

/// Result type alias for filter operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Configuration loading and validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid TOML: {0}")]
    Toml(String),

    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Value out of range: {0}")]
    OutOfRange(String),

    #[error("Unknown log level: {0}")]
    UnknownLevel(String),
}
