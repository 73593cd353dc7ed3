//! Array of strings, one per tuple
//!
//! String arrays live in the same attribute matrices as numeric arrays but
//! are not part of the scalar set, so numeric dispatch rejects them.

use std::any::Any;
use std::collections::BTreeSet;

use super::AttributeArray;
use crate::error::{SimplError, SimplResult};

/// Named array holding one string per tuple
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringArray {
    name: String,
    num_tuples: usize,
    values: Vec<String>,
    allocated: bool,
}

const STRING_COMPONENT_DIMS: [usize; 1] = [1];

impl StringArray {
    /// Create an array of `num_tuples` empty strings (or a placeholder)
    pub fn create(num_tuples: usize, name: &str, allocate: bool) -> Self {
        Self {
            name: name.to_string(),
            num_tuples,
            values: if allocate {
                vec![String::new(); num_tuples]
            } else {
                Vec::new()
            },
            allocated: allocate,
        }
    }

    /// Wrap existing values
    pub fn from_values(name: &str, values: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            num_tuples: values.len(),
            values,
            allocated: true,
        }
    }

    /// Value at `index`
    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Set the value at `index`
    pub fn set_value(&mut self, index: usize, value: impl Into<String>) -> SimplResult<()> {
        let len = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(SimplError::IndexOutOfRange { index, len })?;
        *slot = value.into();
        Ok(())
    }

    /// All values
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl AttributeArray for StringArray {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn scalar_type(&self) -> Option<crate::ScalarType> {
        None
    }

    fn type_as_string(&self) -> String {
        "StringDataArray".to_string()
    }

    fn number_of_tuples(&self) -> usize {
        self.num_tuples
    }

    fn component_dimensions(&self) -> &[usize] {
        &STRING_COMPONENT_DIMS
    }

    fn type_size(&self) -> usize {
        std::mem::size_of::<String>()
    }

    fn byte_len(&self) -> usize {
        self.values.iter().map(String::len).sum()
    }

    fn is_allocated(&self) -> bool {
        self.allocated
    }

    fn resize_tuples(&mut self, num_tuples: usize) -> SimplResult<()> {
        self.values.resize(num_tuples, String::new());
        self.num_tuples = num_tuples;
        self.allocated = true;
        Ok(())
    }

    fn copy_tuple(&mut self, from: usize, to: usize) -> SimplResult<()> {
        let len = self.values.len();
        if from >= len || to >= len {
            return Err(SimplError::IndexOutOfRange {
                index: from.max(to),
                len,
            });
        }
        self.values[to] = self.values[from].clone();
        Ok(())
    }

    fn erase_tuples(&mut self, indices: &[usize]) -> SimplResult<()> {
        let len = self.values.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(SimplError::IndexOutOfRange { index: bad, len });
        }
        let erase: BTreeSet<usize> = indices.iter().copied().collect();
        let mut index = 0;
        self.values.retain(|_| {
            let keep = !erase.contains(&index);
            index += 1;
            keep
        });
        self.num_tuples = self.values.len();
        Ok(())
    }

    fn initialize_with_zeros(&mut self) {
        self.values.iter_mut().for_each(String::clear);
    }

    fn deep_copy(&self, force_no_allocate: bool) -> Box<dyn AttributeArray> {
        if force_no_allocate {
            Box::new(Self::create(self.num_tuples, &self.name, false))
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
        if component_dims != STRING_COMPONENT_DIMS.as_slice() {
            return Err(SimplError::InvalidDimensions {
                dims: component_dims.to_vec(),
                reason: "string arrays hold exactly one component".to_string(),
            });
        }
        Ok(Box::new(Self::create(num_tuples, name, allocate)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
