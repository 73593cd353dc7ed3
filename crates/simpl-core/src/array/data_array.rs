//! Typed storage for one attribute array

use std::any::Any;
use std::collections::BTreeSet;

use ndarray::{ArrayView2, ArrayViewMut2};

use super::AttributeArray;
use crate::error::{SimplError, SimplResult};
use crate::scalar::{Element, ScalarType};

/// Named, multi-component array of `T`
#[derive(Debug, Clone, PartialEq)]
pub struct DataArray<T: Element> {
    name: String,
    num_tuples: usize,
    component_dims: Vec<usize>,
    num_components: usize,
    data: Vec<T>,
    allocated: bool,
}

impl<T: Element> DataArray<T> {
    /// Create an array of `num_tuples` tuples shaped by `component_dims`.
    ///
    /// With `allocate = false` the array records its shape but holds a
    /// zero-length placeholder buffer; a zero component dimension is then
    /// accepted and gives a zero-component placeholder. Fails when
    /// `component_dims` is empty, when it contains a zero and `allocate` is
    /// set, or when the element count cannot be allocated.
    pub fn create(
        num_tuples: usize,
        component_dims: &[usize],
        name: &str,
        allocate: bool,
    ) -> SimplResult<Self> {
        let num_components = validate_component_dims(component_dims, !allocate)?;
        let elements =
            num_tuples
                .checked_mul(num_components)
                .ok_or_else(|| SimplError::AllocationFailure {
                    name: name.to_string(),
                    elements: usize::MAX,
                })?;

        let data = if allocate {
            allocate_buffer::<T>(name, elements)?
        } else {
            Vec::new()
        };

        Ok(Self {
            name: name.to_string(),
            num_tuples,
            component_dims: component_dims.to_vec(),
            num_components,
            data,
            allocated: allocate,
        })
    }

    /// Create an array whose tuple count is the product of `tuple_dims`
    pub fn create_with_tuple_dims(
        tuple_dims: &[usize],
        component_dims: &[usize],
        name: &str,
        allocate: bool,
    ) -> SimplResult<Self> {
        Self::create(tuple_count(tuple_dims)?, component_dims, name, allocate)
    }

    /// Wrap existing values. `values.len()` must be a multiple of the
    /// number of components.
    pub fn with_values(name: &str, component_dims: &[usize], values: Vec<T>) -> SimplResult<Self> {
        let num_components = validate_component_dims(component_dims, false)?;
        if values.len() % num_components != 0 {
            return Err(SimplError::ShapeMismatch {
                expected: num_components,
                actual: values.len() % num_components,
            });
        }
        Ok(Self {
            name: name.to_string(),
            num_tuples: values.len() / num_components,
            component_dims: component_dims.to_vec(),
            num_components,
            data: values,
            allocated: true,
        })
    }

    /// Element type tag of this array
    pub fn scalar_type(&self) -> ScalarType {
        T::SCALAR_TYPE
    }

    /// Whole buffer, tuple-major
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Whole buffer, tuple-major
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the array and return its buffer
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Raw pointer to the first component of tuple `tuple_offset`.
    ///
    /// No bounds check is performed: the pointer is computed with wrapping
    /// arithmetic and may point past the buffer. Dereferencing it is only
    /// sound for `tuple_offset < number_of_tuples()` on an allocated array.
    /// Use [`DataArray::tuple`] when the index is not already known to be valid.
    pub fn get_pointer(&mut self, tuple_offset: usize) -> *mut T {
        self.data
            .as_mut_ptr()
            .wrapping_add(tuple_offset.wrapping_mul(self.num_components))
    }

    /// Const variant of [`DataArray::get_pointer`], with the same caveats
    pub fn get_const_pointer(&self, tuple_offset: usize) -> *const T {
        self.data
            .as_ptr()
            .wrapping_add(tuple_offset.wrapping_mul(self.num_components))
    }

    /// Checked view of one tuple
    pub fn tuple(&self, index: usize) -> Option<&[T]> {
        if index >= self.allocated_tuples() {
            return None;
        }
        let start = index.checked_mul(self.num_components)?;
        let end = start.checked_add(self.num_components)?;
        self.data.get(start..end)
    }

    /// Checked mutable view of one tuple
    pub fn tuple_mut(&mut self, index: usize) -> Option<&mut [T]> {
        if index >= self.allocated_tuples() {
            return None;
        }
        let start = index.checked_mul(self.num_components)?;
        let end = start.checked_add(self.num_components)?;
        self.data.get_mut(start..end)
    }

    /// Copy of one full tuple
    pub fn get_tuple(&self, index: usize) -> SimplResult<Vec<T>> {
        self.tuple(index)
            .map(|t| t.to_vec())
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Overwrite one full tuple. `values` must hold exactly one value per component.
    pub fn set_tuple(&mut self, index: usize, values: &[T]) -> SimplResult<()> {
        if values.len() != self.num_components {
            return Err(SimplError::ShapeMismatch {
                expected: self.num_components,
                actual: values.len(),
            });
        }
        let err = self.out_of_range(index);
        let tuple = self.tuple_mut(index).ok_or(err)?;
        tuple.copy_from_slice(values);
        Ok(())
    }

    /// Broadcast `value` into every component of tuple `index`
    pub fn initialize_tuple(&mut self, index: usize, value: T) -> SimplResult<()> {
        let err = self.out_of_range(index);
        let tuple = self.tuple_mut(index).ok_or(err)?;
        tuple.fill(value);
        Ok(())
    }

    /// Set every element to `value`
    pub fn initialize_with_value(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Single element by flat index
    pub fn get_value(&self, index: usize) -> Option<T> {
        self.data.get(index).copied()
    }

    /// Set a single element by flat index
    pub fn set_value(&mut self, index: usize, value: T) -> SimplResult<()> {
        let len = self.data.len();
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SimplError::IndexOutOfRange { index, len }),
        }
    }

    /// Copy `total_src_tuples` tuples of `source`, starting at
    /// `src_tuple_offset`, into this array starting at `dest_tuple_offset`.
    ///
    /// Both arrays must be allocated, share the component count, and the
    /// source and destination ranges must fit.
    pub fn copy_from_array(
        &mut self,
        dest_tuple_offset: usize,
        source: &DataArray<T>,
        src_tuple_offset: usize,
        total_src_tuples: usize,
    ) -> SimplResult<()> {
        if source.num_components != self.num_components {
            return Err(SimplError::ComponentMismatch {
                name: source.name.clone(),
                expected: self.component_dims.clone(),
                actual: source.component_dims.clone(),
            });
        }
        let src_end = src_tuple_offset
            .checked_add(total_src_tuples)
            .filter(|&end| end <= source.allocated_tuples())
            .ok_or(SimplError::IndexOutOfRange {
                index: src_tuple_offset.saturating_add(total_src_tuples),
                len: source.allocated_tuples(),
            })?;
        let dest_end = dest_tuple_offset
            .checked_add(total_src_tuples)
            .filter(|&end| end <= self.allocated_tuples())
            .ok_or(SimplError::IndexOutOfRange {
                index: dest_tuple_offset.saturating_add(total_src_tuples),
                len: self.allocated_tuples(),
            })?;

        let c = self.num_components;
        self.data[dest_tuple_offset * c..dest_end * c]
            .copy_from_slice(&source.data[src_tuple_offset * c..src_end * c]);
        Ok(())
    }

    /// Tuples x components view of the buffer
    pub fn view(&self) -> SimplResult<ArrayView2<'_, T>> {
        let shape = (self.allocated_tuples(), self.num_components);
        ArrayView2::from_shape(shape, &self.data).map_err(|e| SimplError::InvalidDimensions {
            dims: self.component_dims.clone(),
            reason: e.to_string(),
        })
    }

    /// Mutable tuples x components view of the buffer
    pub fn view_mut(&mut self) -> SimplResult<ArrayViewMut2<'_, T>> {
        let shape = (self.allocated_tuples(), self.num_components);
        let dims = self.component_dims.clone();
        ArrayViewMut2::from_shape(shape, &mut self.data).map_err(|e| {
            SimplError::InvalidDimensions {
                dims,
                reason: e.to_string(),
            }
        })
    }

    /// Tuples actually backed by the buffer (0 for placeholders)
    fn allocated_tuples(&self) -> usize {
        self.data
            .len()
            .checked_div(self.num_components)
            .unwrap_or(0)
    }

    fn out_of_range(&self, index: usize) -> SimplError {
        SimplError::IndexOutOfRange {
            index,
            len: self.allocated_tuples(),
        }
    }
}

impl<T: Element> AttributeArray for DataArray<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn scalar_type(&self) -> Option<ScalarType> {
        Some(T::SCALAR_TYPE)
    }

    fn type_as_string(&self) -> String {
        T::SCALAR_TYPE.name().to_string()
    }

    fn number_of_tuples(&self) -> usize {
        self.num_tuples
    }

    fn component_dimensions(&self) -> &[usize] {
        &self.component_dims
    }

    fn number_of_components(&self) -> usize {
        self.num_components
    }

    fn type_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn byte_len(&self) -> usize {
        self.data.len() * std::mem::size_of::<T>()
    }

    fn is_allocated(&self) -> bool {
        self.allocated
    }

    fn resize_tuples(&mut self, num_tuples: usize) -> SimplResult<()> {
        let elements = num_tuples.checked_mul(self.num_components).ok_or_else(|| {
            SimplError::AllocationFailure {
                name: self.name.clone(),
                elements: usize::MAX,
            }
        })?;
        if elements > self.data.len() {
            self.data
                .try_reserve_exact(elements - self.data.len())
                .map_err(|_| SimplError::AllocationFailure {
                    name: self.name.clone(),
                    elements,
                })?;
        }
        self.data.resize(elements, T::default());
        self.num_tuples = num_tuples;
        self.allocated = true;
        Ok(())
    }

    fn copy_tuple(&mut self, from: usize, to: usize) -> SimplResult<()> {
        let len = self.allocated_tuples();
        if from >= len || to >= len {
            return Err(SimplError::IndexOutOfRange {
                index: from.max(to),
                len,
            });
        }
        let c = self.num_components;
        self.data.copy_within(from * c..(from + 1) * c, to * c);
        Ok(())
    }

    fn erase_tuples(&mut self, indices: &[usize]) -> SimplResult<()> {
        if indices.is_empty() {
            return Ok(());
        }
        let len = self.allocated_tuples();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(SimplError::IndexOutOfRange { index: bad, len });
        }

        let erase: BTreeSet<usize> = indices.iter().copied().collect();
        let c = self.num_components;
        let mut kept = Vec::with_capacity((len - erase.len()) * c);
        for (t, tuple) in self.data.chunks_exact(c).enumerate() {
            if !erase.contains(&t) {
                kept.extend_from_slice(tuple);
            }
        }
        self.num_tuples = kept.len() / c;
        self.data = kept;
        Ok(())
    }

    fn initialize_with_zeros(&mut self) {
        self.data.fill(T::default());
    }

    fn deep_copy(&self, force_no_allocate: bool) -> Box<dyn AttributeArray> {
        if force_no_allocate {
            Box::new(Self {
                name: self.name.clone(),
                num_tuples: self.num_tuples,
                component_dims: self.component_dims.clone(),
                num_components: self.num_components,
                data: Vec::new(),
                allocated: false,
            })
        } else {
            Box::new(self.clone())
        }
    }

    fn create_new_array(
        &self,
        num_tuples: usize,
        component_dims: &[usize],
        name: &str,
        allocate: bool,
    ) -> SimplResult<Box<dyn AttributeArray>> {
        let array = Self::create(num_tuples, component_dims, name, allocate)?;
        Ok(Box::new(array))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Check component dimensions and return the number of components.
/// `allow_zero` admits zero dimensions for unallocated placeholders.
fn validate_component_dims(component_dims: &[usize], allow_zero: bool) -> SimplResult<usize> {
    if component_dims.is_empty() {
        return Err(SimplError::InvalidDimensions {
            dims: Vec::new(),
            reason: "at least one component dimension is required".to_string(),
        });
    }
    if !allow_zero && component_dims.contains(&0) {
        return Err(SimplError::InvalidDimensions {
            dims: component_dims.to_vec(),
            reason: "component dimensions must be non-zero".to_string(),
        });
    }
    component_dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| SimplError::InvalidDimensions {
            dims: component_dims.to_vec(),
            reason: "component count overflows".to_string(),
        })
}

/// Number of tuples described by `tuple_dims`, failing when the product overflows
pub fn tuple_count(tuple_dims: &[usize]) -> SimplResult<usize> {
    tuple_dims
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| SimplError::InvalidDimensions {
            dims: tuple_dims.to_vec(),
            reason: "tuple count overflows".to_string(),
        })
}

fn allocate_buffer<T: Element>(name: &str, elements: usize) -> SimplResult<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|_| SimplError::AllocationFailure {
            name: name.to_string(),
            elements,
        })?;
    data.resize(elements, T::default());
    Ok(data)
}
