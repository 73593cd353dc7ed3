//! simpl-core - Typed attribute arrays and runtime element-type dispatch
//!
//! This crate provides the data model that SIMPL filters operate on and the
//! machinery that lets an algorithm written once run over every element type.
//!
//! # Key Components
//!
//! - **ScalarType / Element**: The closed set of twelve primitive element types
//!   and the bit-exact tag/name table persisted in pipeline files
//! - **AttributeArray / DataArray**: Named, multi-component, tuple-major arrays
//!   behind a type-erased handle
//! - **DataContainerArray**: Data containers and attribute matrices owning
//!   their arrays in a generation-checked arena
//! - **Dispatch**: Visitor and functor-family dispatch over the element type,
//!   failing with `UnsupportedType` (-401) outside the closed set
//! - **Factory**: Array creation "like" another array or from a type tag
//! - **Observer**: Pipeline messages and the observers that receive them
//!
//! # Example
//!
//! ```
//! use simpl_core::{dispatch, ArrayVisitor, DataArray, Element, SimplResult};
//!
//! struct Total;
//!
//! impl ArrayVisitor for Total {
//!     type Output = f64;
//!
//!     fn visit<T: Element>(self, array: &DataArray<T>) -> SimplResult<f64> {
//!         Ok(array.as_slice().iter().map(|v| v.to_f64()).sum())
//!     }
//! }
//!
//! let array = DataArray::<u8>::with_values("a", &[1], vec![1, 2, 3]).unwrap();
//! assert_eq!(dispatch(&array, Total).unwrap(), 6.0);
//! ```

pub mod array;
pub mod container;
pub mod dispatch;
pub mod error;
pub mod factory;
pub mod observer;
pub mod path;
pub mod scalar;

pub use array::{AttributeArray, BoxedArray, DataArray, StringArray};
pub use container::{ArrayId, AttributeMatrix, DataContainer, DataContainerArray};
pub use dispatch::{
    dispatch, dispatch_mut, execute_template, probe_scalar_type, unsupported_type,
    ArrayVisitor, ArrayVisitorMut, Dispatcher, FunctorFamily, TypedFunctor,
};
pub use error::{codes, PathPart, SimplError, SimplResult};
pub use factory::{
    create_array, create_array_from_type_name, create_array_from_type_tag, create_array_like,
};
pub use observer::{
    notify_error, notify_status, notify_warning, MessageCollector, MessageKind, NullObserver,
    Observer, PipelineMessage, Reporter, TracingObserver,
};
pub use path::{DataArrayPath, PATH_SEPARATOR};
pub use scalar::{Element, ScalarType};
