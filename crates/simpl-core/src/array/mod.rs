//! Attribute arrays
//!
//! An attribute array is a named, homogeneous, multi-component array. Code
//! that does not care about the element type works through the object-safe
//! [`AttributeArray`] trait; typed code recovers the concrete
//! [`DataArray<T>`] with [`is_type`](trait.AttributeArray.html#method.is_type)
//! and the `downcast_*` helpers, or lets the dispatcher do it.
//!
//! # Layout
//!
//! Buffers are contiguous and tuple-major: component `c` of tuple `t` lives
//! at `t * number_of_components + c`.

mod data_array;
mod string_array;

pub use data_array::{tuple_count, DataArray};
pub use string_array::StringArray;

use std::any::Any;
use std::fmt;

use crate::error::SimplResult;
use crate::scalar::{Element, ScalarType};

/// Type-erased handle to an attribute array
pub trait AttributeArray: fmt::Debug + Send + Sync + 'static {
    /// Array name, unique within its attribute matrix
    fn name(&self) -> &str;

    /// Rename the array
    fn set_name(&mut self, name: &str);

    /// Element type tag, `None` for arrays outside the closed scalar set
    fn scalar_type(&self) -> Option<ScalarType>;

    /// Type name as persisted in pipeline files (`float`, `StringDataArray`, ...)
    fn type_as_string(&self) -> String;

    /// Number of tuples (logical rows)
    fn number_of_tuples(&self) -> usize;

    /// Dimensions of a single tuple
    fn component_dimensions(&self) -> &[usize];

    /// Number of components per tuple (product of the component dimensions)
    fn number_of_components(&self) -> usize {
        self.component_dimensions().iter().product()
    }

    /// Total number of elements described by the shape
    fn size(&self) -> usize {
        self.number_of_tuples() * self.number_of_components()
    }

    /// Size in bytes of one element
    fn type_size(&self) -> usize;

    /// Length in bytes of the backing buffer (0 for placeholders)
    fn byte_len(&self) -> usize;

    /// Has the backing buffer been allocated?
    fn is_allocated(&self) -> bool;

    /// Resize to `num_tuples`, allocating the buffer if needed.
    ///
    /// Only container-mediated resizes should call this; algorithms never
    /// reallocate an array they are iterating.
    fn resize_tuples(&mut self, num_tuples: usize) -> SimplResult<()>;

    /// Copy tuple `from` over tuple `to`
    fn copy_tuple(&mut self, from: usize, to: usize) -> SimplResult<()>;

    /// Remove the tuples at the given indices, keeping the remaining order
    fn erase_tuples(&mut self, indices: &[usize]) -> SimplResult<()>;

    /// Reset every element to its zero value
    fn initialize_with_zeros(&mut self);

    /// Copy this array. With `force_no_allocate` the copy keeps the shape but
    /// has no buffer, which is what preflight passes work on.
    fn deep_copy(&self, force_no_allocate: bool) -> Box<dyn AttributeArray>;

    /// Create an empty array of the same concrete type
    fn create_new_array(
        &self,
        num_tuples: usize,
        component_dims: &[usize],
        name: &str,
        allocate: bool,
    ) -> SimplResult<Box<dyn AttributeArray>>;

    /// Multi-line summary of the array
    fn info_string(&self) -> String {
        format!(
            "Name: {}\nType: {}\nNumber of Tuples: {}\nNumber of Components: {}\nComponent Dimensions: {:?}\nTotal Elements: {}\nTotal Memory Required: {}\n",
            self.name(),
            self.type_as_string(),
            self.number_of_tuples(),
            self.number_of_components(),
            self.component_dimensions(),
            self.size(),
            self.size() * self.type_size(),
        )
    }

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn AttributeArray {
    /// Check whether this array stores elements of type `T`. Never panics.
    pub fn is_type<T: Element>(&self) -> bool {
        self.as_any().is::<DataArray<T>>()
    }

    /// Borrow as a typed array if the element type is `T`
    pub fn downcast_ref<T: Element>(&self) -> Option<&DataArray<T>> {
        self.as_any().downcast_ref::<DataArray<T>>()
    }

    /// Mutably borrow as a typed array if the element type is `T`
    pub fn downcast_mut<T: Element>(&mut self) -> Option<&mut DataArray<T>> {
        self.as_any_mut().downcast_mut::<DataArray<T>>()
    }

    /// Borrow as any concrete attribute array type
    pub fn downcast_array<A: AttributeArray>(&self) -> Option<&A> {
        self.as_any().downcast_ref::<A>()
    }
}

/// Owned, type-erased attribute array
pub type BoxedArray = Box<dyn AttributeArray>;
