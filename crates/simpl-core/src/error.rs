//! Error types for simpl-core
//!
//! Every variant maps to a fixed negative error code through
//! [`SimplError::code`]. The codes are what observers and the pipeline log
//! report, and the legacy values are kept for compatibility with existing
//! pipeline fixtures.

use thiserror::Error;

/// Fixed negative error codes
pub mod codes {
    /// The array's element type is not in the closed scalar set
    pub const UNSUPPORTED_TYPE: i32 = -401;
    /// A data container named by a path does not exist
    pub const MISSING_DATA_CONTAINER: i32 = -402;
    /// An attribute matrix named by a path does not exist
    pub const MISSING_ATTRIBUTE_MATRIX: i32 = -403;
    /// An array named by a path (or held through a handle) does not exist
    pub const MISSING_ARRAY: i32 = -404;

    /// A prerequisite array has a different element type than required
    pub const ARRAY_TYPE_MISMATCH: i32 = -501;
    /// A prerequisite array has a different tuple count than its matrix
    pub const ARRAY_TUPLE_MISMATCH: i32 = -502;
    /// A prerequisite array has different component dimensions than required
    pub const ARRAY_COMPONENT_MISMATCH: i32 = -503;

    pub const EMPTY_ARRAY_NAME: i32 = -10001;
    pub const DUPLICATE_NAME: i32 = -10002;
    pub const SHAPE_MISMATCH: i32 = -10005;
    pub const INDEX_OUT_OF_RANGE: i32 = -10006;
    pub const ALLOCATION_FAILURE: i32 = -10007;
    pub const INVALID_DIMENSIONS: i32 = -10008;
    pub const ALIASED_ARRAYS: i32 = -10009;
    pub const TUPLE_COUNTS_DIFFER: i32 = -10200;

    pub const EMPTY_PATH: i32 = -80000;
    pub const INVALID_PATH: i32 = -80001;
    pub const SLASH_IN_DATA_CONTAINER: i32 = -80005;
    pub const SLASH_IN_ATTRIBUTE_MATRIX: i32 = -80006;
    pub const SLASH_IN_DATA_ARRAY: i32 = -80007;
}

/// Which element of a [`DataArrayPath`](crate::DataArrayPath) an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPart {
    DataContainer,
    AttributeMatrix,
    DataArray,
}

impl std::fmt::Display for PathPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPart::DataContainer => write!(f, "DataContainer"),
            PathPart::AttributeMatrix => write!(f, "AttributeMatrix"),
            PathPart::DataArray => write!(f, "DataArray"),
        }
    }
}

/// Main error type for simpl-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimplError {
    /// Dispatch or creation found no matching element type
    #[error("The array '{name}' is of unsupported type '{type_name}'. The following types are supported: {supported}")]
    UnsupportedType {
        name: String,
        type_name: String,
        supported: String,
    },

    /// Integer type tag outside the closed set
    #[error("Unknown scalar type tag {0}")]
    UnknownTypeTag(i32),

    /// Type name outside the closed set
    #[error("Unknown scalar type name '{0}'")]
    UnknownTypeName(String),

    #[error("The DataContainer '{name}' was not found in the DataContainerArray")]
    MissingDataContainer { name: String },

    #[error("The AttributeMatrix '{name}' was not found in the DataContainer '{data_container}'")]
    MissingAttributeMatrix { data_container: String, name: String },

    #[error("The DataArray at path '{path}' was not found")]
    MissingArray { path: String },

    /// A handle outlived the array it pointed to
    #[error("Array handle {index}:{generation} no longer refers to a live array")]
    StaleHandle { index: u32, generation: u32 },

    #[error("The DataArrayPath object was empty")]
    EmptyPath,

    #[error("The DataArrayPath is invalid because one of the elements was empty: '{path}'")]
    InvalidPath { path: String },

    #[error("The {part} '{name}' has forward slashes in its name")]
    ForwardSlash { part: PathPart, name: String },

    #[error("The name of the array was empty. Please provide a name for this array.")]
    EmptyArrayName,

    #[error("'{container}' already contains an object named '{name}'")]
    DuplicateName { container: String, name: String },

    #[error("The array '{name}' has type '{actual}' but type '{expected}' is required")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("The array '{name}' has {actual} tuples but {expected} are required")]
    TupleMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("The array '{name}' has component dimensions {actual:?} but {expected:?} are required")]
    ComponentMismatch {
        name: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("The number of tuples for the DataArray {first} is {first_tuples} and for DataArray {other} is {other_tuples}. The number of tuples must match.")]
    TupleCountsDiffer {
        first: String,
        first_tuples: usize,
        other: String,
        other_tuples: usize,
    },

    /// A tuple-sized write received the wrong number of values
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Index out of range: tuple {index}, number of tuples {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Could not allocate {elements} elements for array '{name}'")]
    AllocationFailure { name: String, elements: usize },

    #[error("Invalid dimensions {dims:?}: {reason}")]
    InvalidDimensions { dims: Vec<usize>, reason: String },

    /// Two handles that must name different arrays name the same one
    #[error("Array handle {index} was passed as both source and destination")]
    AliasedArrays { index: u32 },
}

impl SimplError {
    /// Fixed negative code reported alongside the message
    pub fn code(&self) -> i32 {
        match self {
            SimplError::UnsupportedType { .. }
            | SimplError::UnknownTypeTag(_)
            | SimplError::UnknownTypeName(_) => codes::UNSUPPORTED_TYPE,
            SimplError::MissingDataContainer { .. } => codes::MISSING_DATA_CONTAINER,
            SimplError::MissingAttributeMatrix { .. } => codes::MISSING_ATTRIBUTE_MATRIX,
            SimplError::MissingArray { .. } | SimplError::StaleHandle { .. } => {
                codes::MISSING_ARRAY
            }
            SimplError::EmptyPath => codes::EMPTY_PATH,
            SimplError::InvalidPath { .. } => codes::INVALID_PATH,
            SimplError::ForwardSlash { part, .. } => match part {
                PathPart::DataContainer => codes::SLASH_IN_DATA_CONTAINER,
                PathPart::AttributeMatrix => codes::SLASH_IN_ATTRIBUTE_MATRIX,
                PathPart::DataArray => codes::SLASH_IN_DATA_ARRAY,
            },
            SimplError::EmptyArrayName => codes::EMPTY_ARRAY_NAME,
            SimplError::DuplicateName { .. } => codes::DUPLICATE_NAME,
            SimplError::TypeMismatch { .. } => codes::ARRAY_TYPE_MISMATCH,
            SimplError::TupleMismatch { .. } => codes::ARRAY_TUPLE_MISMATCH,
            SimplError::ComponentMismatch { .. } => codes::ARRAY_COMPONENT_MISMATCH,
            SimplError::TupleCountsDiffer { .. } => codes::TUPLE_COUNTS_DIFFER,
            SimplError::ShapeMismatch { .. } => codes::SHAPE_MISMATCH,
            SimplError::IndexOutOfRange { .. } => codes::INDEX_OUT_OF_RANGE,
            SimplError::AllocationFailure { .. } => codes::ALLOCATION_FAILURE,
            SimplError::InvalidDimensions { .. } => codes::INVALID_DIMENSIONS,
            SimplError::AliasedArrays { .. } => codes::ALIASED_ARRAYS,
        }
    }
}

/// Result type alias for simpl-core operations
pub type SimplResult<T> = Result<T, SimplError>;
