//! Container hierarchy: data container array, data containers, attribute matrices
//!
//! Arrays are owned by a single arena in the [`DataContainerArray`]. Attribute
//! matrices hold only [`ArrayId`]s into that arena, and so do filters. An id
//! carries the generation of the slot it was issued for, so a handle kept
//! across a removal resolves to `MissingArray` instead of to whatever array
//! reused the slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::array::{tuple_count, AttributeArray, BoxedArray, DataArray};
use crate::error::{PathPart, SimplError, SimplResult};
use crate::factory;
use crate::observer::Reporter;
use crate::path::DataArrayPath;
use crate::scalar::Element;

/// Non-owning handle to an array in a [`DataContainerArray`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArrayId {
    index: u32,
    generation: u32,
}

impl ArrayId {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    array: Option<BoxedArray>,
}

/// Named group of arrays that all share the same tuple count
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMatrix {
    name: String,
    tuple_dims: Vec<usize>,
    num_tuples: usize,
    arrays: BTreeMap<String, ArrayId>,
}

impl AttributeMatrix {
    fn new(name: &str, tuple_dims: &[usize]) -> SimplResult<Self> {
        Ok(Self {
            name: name.to_string(),
            tuple_dims: tuple_dims.to_vec(),
            num_tuples: tuple_count(tuple_dims)?,
            arrays: BTreeMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tuple_dimensions(&self) -> &[usize] {
        &self.tuple_dims
    }

    /// Number of tuples every array in this matrix must have
    pub fn number_of_tuples(&self) -> usize {
        self.num_tuples
    }

    /// Id of the array called `name`
    pub fn array_id(&self, name: &str) -> Option<ArrayId> {
        self.arrays.get(name).copied()
    }

    pub fn contains_array(&self, name: &str) -> bool {
        self.arrays.contains_key(name)
    }

    /// Array names in sorted order
    pub fn array_names(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }
}

/// Named group of attribute matrices
#[derive(Debug, Clone, PartialEq)]
pub struct DataContainer {
    name: String,
    matrices: BTreeMap<String, AttributeMatrix>,
}

impl DataContainer {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            matrices: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute_matrix(&self, name: &str) -> Option<&AttributeMatrix> {
        self.matrices.get(name)
    }

    pub fn attribute_matrices(&self) -> impl Iterator<Item = &AttributeMatrix> {
        self.matrices.values()
    }
}

/// Root of the container hierarchy and owner of every array
#[derive(Debug, Default)]
pub struct DataContainerArray {
    containers: BTreeMap<String, DataContainer>,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl DataContainerArray {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Containers and matrices =====

    /// Add an empty data container
    pub fn create_data_container(&mut self, name: &str) -> SimplResult<()> {
        validate_name(PathPart::DataContainer, name)?;
        if self.containers.contains_key(name) {
            return Err(SimplError::DuplicateName {
                container: "DataContainerArray".to_string(),
                name: name.to_string(),
            });
        }
        debug!(data_container = name, "create data container");
        self.containers
            .insert(name.to_string(), DataContainer::new(name));
        Ok(())
    }

    /// Add an empty attribute matrix to an existing data container
    pub fn create_attribute_matrix(
        &mut self,
        data_container: &str,
        name: &str,
        tuple_dims: &[usize],
    ) -> SimplResult<()> {
        validate_name(PathPart::AttributeMatrix, name)?;
        let dc = self.containers.get_mut(data_container).ok_or_else(|| {
            SimplError::MissingDataContainer {
                name: data_container.to_string(),
            }
        })?;
        if dc.matrices.contains_key(name) {
            return Err(SimplError::DuplicateName {
                container: data_container.to_string(),
                name: name.to_string(),
            });
        }
        let matrix = AttributeMatrix::new(name, tuple_dims)?;
        debug!(data_container, attribute_matrix = name, ?tuple_dims, "create attribute matrix");
        dc.matrices.insert(name.to_string(), matrix);
        Ok(())
    }

    pub fn data_container(&self, name: &str) -> Option<&DataContainer> {
        self.containers.get(name)
    }

    pub fn data_containers(&self) -> impl Iterator<Item = &DataContainer> {
        self.containers.values()
    }

    /// Attribute matrix named by the first two elements of `path`
    pub fn attribute_matrix(&self, path: &DataArrayPath) -> SimplResult<&AttributeMatrix> {
        let dc = self.containers.get(&path.data_container).ok_or_else(|| {
            SimplError::MissingDataContainer {
                name: path.data_container.clone(),
            }
        })?;
        dc.matrices
            .get(&path.attribute_matrix)
            .ok_or_else(|| SimplError::MissingAttributeMatrix {
                data_container: path.data_container.clone(),
                name: path.attribute_matrix.clone(),
            })
    }

    fn attribute_matrix_mut(&mut self, path: &DataArrayPath) -> SimplResult<&mut AttributeMatrix> {
        let dc = self.containers.get_mut(&path.data_container).ok_or_else(|| {
            SimplError::MissingDataContainer {
                name: path.data_container.clone(),
            }
        })?;
        dc.matrices
            .get_mut(&path.attribute_matrix)
            .ok_or_else(|| SimplError::MissingAttributeMatrix {
                data_container: path.data_container.clone(),
                name: path.attribute_matrix.clone(),
            })
    }

    /// Change the tuple dimensions of a matrix and resize every array in it.
    ///
    /// On failure the arrays already resized are shrunk back and the matrix
    /// keeps its old dimensions.
    pub fn resize_attribute_matrix(
        &mut self,
        path: &DataArrayPath,
        tuple_dims: &[usize],
    ) -> SimplResult<()> {
        let num_tuples = tuple_count(tuple_dims)?;
        let matrix = self.attribute_matrix(path)?;
        let old_tuples = matrix.number_of_tuples();
        let ids: Vec<ArrayId> = matrix.arrays.values().copied().collect();
        debug!(path = %path, num_tuples, "resize attribute matrix");

        for (done, &id) in ids.iter().enumerate() {
            let resized = self.resolve_mut(id).and_then(|a| a.resize_tuples(num_tuples));
            if let Err(err) = resized {
                warn!(path = %path, num_tuples, error = %err, "resize failed, restoring arrays");
                for &resized in &ids[..done] {
                    self.resolve_mut(resized)?.resize_tuples(old_tuples)?;
                }
                return Err(err);
            }
        }

        let matrix = self.attribute_matrix_mut(path)?;
        matrix.tuple_dims = tuple_dims.to_vec();
        matrix.num_tuples = num_tuples;
        Ok(())
    }

    // ===== Arena =====

    /// Move `array` into the matrix named by `path`. The array keeps its own
    /// name; only the data container and attribute matrix of `path` are used.
    ///
    /// The array's tuple count must equal the matrix's.
    pub fn insert_array(&mut self, path: &DataArrayPath, array: BoxedArray) -> SimplResult<ArrayId> {
        let name = array.name().to_string();
        if name.is_empty() {
            return Err(SimplError::EmptyArrayName);
        }
        validate_name(PathPart::DataArray, &name)?;
        let matrix = self.attribute_matrix(path)?;
        if matrix.contains_array(&name) {
            return Err(SimplError::DuplicateName {
                container: matrix.name.clone(),
                name,
            });
        }
        if array.number_of_tuples() != matrix.number_of_tuples() {
            return Err(SimplError::TupleMismatch {
                name,
                expected: matrix.number_of_tuples(),
                actual: array.number_of_tuples(),
            });
        }

        let id = self.allocate_slot(array);
        self.attribute_matrix_mut(path)?.arrays.insert(name.clone(), id);
        trace!(path = %path.with_array(name.as_str()), index = id.index, "insert array");
        Ok(id)
    }

    /// Remove the array named by `path` and return it. Existing ids for it
    /// become stale.
    pub fn remove_array(&mut self, path: &DataArrayPath) -> SimplResult<BoxedArray> {
        let id = self.array_id(path)?;
        self.attribute_matrix_mut(path)?.arrays.remove(&path.data_array);
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .ok_or_else(|| stale(id))?;
        let array = slot.array.take().ok_or_else(|| stale(id))?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        trace!(path = %path, "remove array");
        Ok(array)
    }

    fn allocate_slot(&mut self, array: BoxedArray) -> ArrayId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.array = Some(array);
            return ArrayId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            array: Some(array),
        });
        ArrayId {
            index,
            generation: 0,
        }
    }

    /// Borrow the array behind `id`, failing if it was removed
    pub fn resolve(&self, id: ArrayId) -> SimplResult<&dyn AttributeArray> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.array.as_deref())
            .ok_or_else(|| stale(id))
    }

    /// Mutably borrow the array behind `id`, failing if it was removed
    pub fn resolve_mut(&mut self, id: ArrayId) -> SimplResult<&mut dyn AttributeArray> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                array: Some(array),
            }) if *generation == id.generation => Ok(array.as_mut()),
            _ => Err(stale(id)),
        }
    }

    /// Borrow the array behind `id` as a `DataArray<T>`
    pub fn resolve_typed<T: Element>(&self, id: ArrayId) -> SimplResult<&DataArray<T>> {
        let array = self.resolve(id)?;
        array
            .downcast_ref::<T>()
            .ok_or_else(|| type_mismatch::<T>(array))
    }

    /// Borrow two different arrays at once, the first mutably
    pub fn resolve_pair_mut(
        &mut self,
        target: ArrayId,
        source: ArrayId,
    ) -> SimplResult<(&mut dyn AttributeArray, &dyn AttributeArray)> {
        if target.index == source.index {
            return Err(SimplError::AliasedArrays {
                index: target.index,
            });
        }
        self.resolve(target)?;
        self.resolve(source)?;

        let (t, s) = (target.index as usize, source.index as usize);
        let (target_slot, source_slot) = if t < s {
            let (head, tail) = self.slots.split_at_mut(s);
            (&mut head[t], &tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(t);
            (&mut tail[0], &head[s])
        };
        let target_array: &mut dyn AttributeArray =
            target_slot.array.as_deref_mut().ok_or_else(|| stale(target))?;
        let source_array: &dyn AttributeArray =
            source_slot.array.as_deref().ok_or_else(|| stale(source))?;
        Ok((target_array, source_array))
    }

    /// Id of the array named by `path`
    pub fn array_id(&self, path: &DataArrayPath) -> SimplResult<ArrayId> {
        if path.is_empty() {
            return Err(SimplError::EmptyPath);
        }
        if !path.is_valid() {
            return Err(SimplError::InvalidPath {
                path: path.to_string(),
            });
        }
        self.attribute_matrix(path)?
            .array_id(&path.data_array)
            .ok_or_else(|| SimplError::MissingArray {
                path: path.to_string(),
            })
    }

    /// Borrow the array named by `path`
    pub fn array(&self, path: &DataArrayPath) -> SimplResult<&dyn AttributeArray> {
        self.resolve(self.array_id(path)?)
    }

    /// Mutably borrow the array named by `path`
    pub fn array_mut(&mut self, path: &DataArrayPath) -> SimplResult<&mut dyn AttributeArray> {
        let id = self.array_id(path)?;
        self.resolve_mut(id)
    }

    /// Paths of every array, sorted
    pub fn array_paths(&self) -> Vec<DataArrayPath> {
        let mut paths = Vec::new();
        for dc in self.containers.values() {
            for matrix in dc.matrices.values() {
                for name in matrix.arrays.keys() {
                    paths.push(DataArrayPath::new(&dc.name, &matrix.name, name));
                }
            }
        }
        paths
    }

    /// Number of live arrays
    pub fn array_count(&self) -> usize {
        self.slots.iter().filter(|s| s.array.is_some()).count()
    }

    // ===== Filter helpers =====

    /// Look up a required input array. Failures are reported once through
    /// `reporter` with codes -80000, -80001, -402, -403 or -404.
    pub fn get_prereq_array(
        &self,
        path: &DataArrayPath,
        reporter: &Reporter<'_>,
    ) -> SimplResult<ArrayId> {
        reporter.report(self.array_id(path))
    }

    /// Look up a required input array of element type `T`.
    ///
    /// Beyond [`DataContainerArray::get_prereq_array`], the array must hold
    /// `T` (-501), match its matrix's tuple count (-502) and, when
    /// `component_dims` is non-empty, have exactly those component
    /// dimensions (-503).
    pub fn get_prereq_array_of<T: Element>(
        &self,
        path: &DataArrayPath,
        component_dims: &[usize],
        reporter: &Reporter<'_>,
    ) -> SimplResult<ArrayId> {
        reporter.report(self.check_prereq_array::<T>(path, component_dims))
    }

    fn check_prereq_array<T: Element>(
        &self,
        path: &DataArrayPath,
        component_dims: &[usize],
    ) -> SimplResult<ArrayId> {
        let id = self.array_id(path)?;
        let array = self.resolve(id)?;
        if !array.is_type::<T>() {
            return Err(type_mismatch::<T>(array));
        }
        let expected_tuples = self.attribute_matrix(path)?.number_of_tuples();
        if array.number_of_tuples() != expected_tuples {
            return Err(SimplError::TupleMismatch {
                name: array.name().to_string(),
                expected: expected_tuples,
                actual: array.number_of_tuples(),
            });
        }
        if !component_dims.is_empty() && array.component_dimensions() != component_dims {
            return Err(SimplError::ComponentMismatch {
                name: array.name().to_string(),
                expected: component_dims.to_vec(),
                actual: array.component_dimensions().to_vec(),
            });
        }
        Ok(id)
    }

    /// Check that `path` can receive a new array: valid names, existing
    /// container and matrix, no array of that name yet
    fn check_new_array_path(&self, path: &DataArrayPath) -> SimplResult<usize> {
        if path.data_array.is_empty() {
            return Err(SimplError::EmptyArrayName);
        }
        path.validate()?;
        let matrix = self.attribute_matrix(path)?;
        if matrix.contains_array(&path.data_array) {
            return Err(SimplError::DuplicateName {
                container: matrix.name.clone(),
                name: path.data_array.clone(),
            });
        }
        Ok(matrix.number_of_tuples())
    }

    /// Create an output array from a persisted type tag, sized to its matrix.
    ///
    /// Without `allocate` the array is a placeholder, which is what preflight
    /// creates.
    pub fn create_non_prereq_array_from_type_tag(
        &mut self,
        path: &DataArrayPath,
        tag: i32,
        component_dims: &[usize],
        init_value: f64,
        allocate: bool,
        reporter: &Reporter<'_>,
    ) -> SimplResult<ArrayId> {
        let result = self.check_new_array_path(path).and_then(|num_tuples| {
            let array = factory::create_array_from_type_tag(
                tag,
                &[num_tuples],
                component_dims,
                &path.data_array,
                allocate,
                init_value,
            )?;
            self.insert_array(path, array)
        });
        reporter.report(result)
    }

    /// Create an output array with the same element type as the array `like`
    pub fn create_non_prereq_array_like(
        &mut self,
        path: &DataArrayPath,
        like: ArrayId,
        component_dims: &[usize],
        allocate: bool,
        reporter: &Reporter<'_>,
    ) -> SimplResult<ArrayId> {
        let result = self.check_new_array_path(path).and_then(|num_tuples| {
            let array = factory::create_array_like(
                self.resolve(like)?,
                &[num_tuples],
                component_dims,
                &path.data_array,
                allocate,
            )?;
            self.insert_array(path, array)
        });
        reporter.report(result)
    }

    /// Check that every path names an array and all of them share a tuple
    /// count. Reports the first failure (-10200 for differing counts).
    pub fn validate_number_of_tuples(
        &self,
        paths: &[DataArrayPath],
        reporter: &Reporter<'_>,
    ) -> SimplResult<()> {
        reporter.report(self.check_number_of_tuples(paths))
    }

    fn check_number_of_tuples(&self, paths: &[DataArrayPath]) -> SimplResult<()> {
        let Some((first_path, rest)) = paths.split_first() else {
            return Ok(());
        };
        let first = self.array(first_path)?;
        for path in rest {
            let other = self.array(path)?;
            if other.number_of_tuples() != first.number_of_tuples() {
                return Err(SimplError::TupleCountsDiffer {
                    first: first_path.to_string(),
                    first_tuples: first.number_of_tuples(),
                    other: path.to_string(),
                    other_tuples: other.number_of_tuples(),
                });
            }
        }
        Ok(())
    }

    /// Copy the whole hierarchy. Ids issued for this container resolve to
    /// the corresponding arrays of the copy.
    ///
    /// With `force_no_allocate` every array becomes a placeholder that keeps
    /// its shape, which is what preflight runs against.
    pub fn deep_copy(&self, force_no_allocate: bool) -> Self {
        Self {
            containers: self.containers.clone(),
            slots: self
                .slots
                .iter()
                .map(|slot| Slot {
                    generation: slot.generation,
                    array: slot.array.as_ref().map(|a| a.deep_copy(force_no_allocate)),
                })
                .collect(),
            free: self.free.clone(),
        }
    }
}

fn validate_name(part: PathPart, name: &str) -> SimplResult<()> {
    if name.is_empty() {
        return Err(SimplError::EmptyArrayName);
    }
    if name.contains('/') {
        return Err(SimplError::ForwardSlash {
            part,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn stale(id: ArrayId) -> SimplError {
    SimplError::StaleHandle {
        index: id.index,
        generation: id.generation,
    }
}

fn type_mismatch<T: Element>(array: &dyn AttributeArray) -> SimplError {
    SimplError::TypeMismatch {
        name: array.name().to_string(),
        expected: T::SCALAR_TYPE.name().to_string(),
        actual: array.type_as_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::StringArray;
    use crate::error::codes;
    use crate::observer::MessageCollector;

    fn cell_data() -> (DataContainerArray, DataArrayPath) {
        let mut dca = DataContainerArray::new();
        dca.create_data_container("ImageDataContainer").unwrap();
        dca.create_attribute_matrix("ImageDataContainer", "CellData", &[2, 2])
            .unwrap();
        (dca, DataArrayPath::matrix("ImageDataContainer", "CellData"))
    }

    #[test]
    fn test_insert_and_resolve() {
        let (mut dca, am) = cell_data();
        let array = DataArray::<f32>::create(4, &[1], "Confidence", true).unwrap();
        let id = dca.insert_array(&am, Box::new(array)).unwrap();
        assert_eq!(dca.resolve(id).unwrap().name(), "Confidence");
        assert_eq!(dca.array_id(&am.with_array("Confidence")).unwrap(), id);
        assert_eq!(dca.array_paths(), vec![am.with_array("Confidence")]);
    }

    #[test]
    fn test_insert_rejects_wrong_tuple_count_and_duplicates() {
        let (mut dca, am) = cell_data();
        let wrong = DataArray::<u8>::create(3, &[1], "Mask", true).unwrap();
        assert_eq!(dca.insert_array(&am, Box::new(wrong)).unwrap_err().code(), -502);

        let mask = DataArray::<u8>::create(4, &[1], "Mask", true).unwrap();
        dca.insert_array(&am, Box::new(mask.clone())).unwrap();
        assert_eq!(dca.insert_array(&am, Box::new(mask)).unwrap_err().code(), -10002);
    }

    #[test]
    fn test_removed_array_handle_is_stale() {
        let (mut dca, am) = cell_data();
        let first = DataArray::<i32>::create(4, &[1], "A", true).unwrap();
        let id = dca.insert_array(&am, Box::new(first)).unwrap();
        dca.remove_array(&am.with_array("A")).unwrap();
        assert_eq!(dca.resolve(id).unwrap_err().code(), -404);

        // Slot is reused with a new generation
        let second = DataArray::<i32>::create(4, &[1], "B", true).unwrap();
        let new_id = dca.insert_array(&am, Box::new(second)).unwrap();
        assert_eq!(new_id.index(), id.index());
        assert_ne!(new_id.generation(), id.generation());
        assert!(dca.resolve(id).is_err());
        assert_eq!(dca.resolve(new_id).unwrap().name(), "B");
    }

    #[test]
    fn test_prereq_lookup_codes() {
        let (mut dca, am) = cell_data();
        let collector = MessageCollector::new();
        let reporter = Reporter::new(&collector, "Test");
        let ids = DataArray::<i32>::create(4, &[1], "Ids", true).unwrap();
        dca.insert_array(&am, Box::new(ids)).unwrap();

        let cases = [
            (DataArrayPath::default(), -80000),
            (DataArrayPath::matrix("ImageDataContainer", "CellData"), -80001),
            (DataArrayPath::new("Missing", "CellData", "Ids"), -402),
            (DataArrayPath::new("ImageDataContainer", "Missing", "Ids"), -403),
            (am.with_array("Missing"), -404),
        ];
        for (path, code) in cases {
            let err = dca.get_prereq_array(&path, &reporter).unwrap_err();
            assert_eq!(err.code(), code, "{path}");
        }
        assert_eq!(collector.error_count(), 5);

        let ok = dca.get_prereq_array_of::<i32>(&am.with_array("Ids"), &[1], &reporter);
        assert!(ok.is_ok());
        let wrong_type = dca.get_prereq_array_of::<f32>(&am.with_array("Ids"), &[], &reporter);
        assert_eq!(wrong_type.unwrap_err().code(), -501);
        let wrong_dims = dca.get_prereq_array_of::<i32>(&am.with_array("Ids"), &[3], &reporter);
        assert_eq!(wrong_dims.unwrap_err().code(), -503);
        assert_eq!(collector.error_count(), 7);
    }

    #[test]
    fn test_create_non_prereq_arrays() {
        let (mut dca, am) = cell_data();
        let collector = MessageCollector::new();
        let reporter = Reporter::new(&collector, "Test");

        let id = dca
            .create_non_prereq_array_from_type_tag(&am.with_array("Out"), 2, &[3], 5.0, true, &reporter)
            .unwrap();
        let out = dca.resolve_typed::<i16>(id).unwrap();
        assert_eq!(out.number_of_tuples(), 4);
        assert!(out.as_slice().iter().all(|&v| v == 5));

        let like = dca
            .create_non_prereq_array_like(&am.with_array("Like"), id, &[1], false, &reporter)
            .unwrap();
        let like = dca.resolve(like).unwrap();
        assert!(like.is_type::<i16>());
        assert!(!like.is_allocated());

        let dup = dca.create_non_prereq_array_from_type_tag(&am.with_array("Out"), 2, &[1], 0.0, true, &reporter);
        assert_eq!(dup.unwrap_err().code(), -10002);
        let empty = dca.create_non_prereq_array_from_type_tag(&am, 2, &[1], 0.0, true, &reporter);
        assert_eq!(empty.unwrap_err().code(), -10001);
        assert_eq!(collector.error_count(), 2);
    }

    #[test]
    fn test_validate_number_of_tuples() {
        let mut dca = DataContainerArray::new();
        dca.create_data_container("dc").unwrap();
        dca.create_attribute_matrix("dc", "a", &[3]).unwrap();
        dca.create_attribute_matrix("dc", "b", &[4]).unwrap();
        let a = DataArrayPath::matrix("dc", "a");
        let b = DataArrayPath::matrix("dc", "b");
        dca.insert_array(&a, Box::new(DataArray::<u8>::create(3, &[1], "x", true).unwrap()))
            .unwrap();
        dca.insert_array(&a, Box::new(DataArray::<u8>::create(3, &[2], "y", true).unwrap()))
            .unwrap();
        dca.insert_array(&b, Box::new(StringArray::create(4, "z", true)))
            .unwrap();

        let collector = MessageCollector::new();
        let reporter = Reporter::new(&collector, "Test");
        assert!(dca
            .validate_number_of_tuples(&[a.with_array("x"), a.with_array("y")], &reporter)
            .is_ok());
        let err = dca
            .validate_number_of_tuples(&[a.with_array("x"), b.with_array("z")], &reporter)
            .unwrap_err();
        assert_eq!(err.code(), -10200);
        assert_eq!(collector.error_count(), 1);
    }

    #[test]
    fn test_deep_copy_keeps_ids_and_drops_buffers() {
        let (mut dca, am) = cell_data();
        let id = dca
            .insert_array(&am, Box::new(DataArray::<f64>::create(4, &[3], "V", true).unwrap()))
            .unwrap();
        let copy = dca.deep_copy(true);
        let placeholder = copy.resolve(id).unwrap();
        assert_eq!(placeholder.number_of_tuples(), 4);
        assert_eq!(placeholder.byte_len(), 0);
        assert_eq!(dca.resolve(id).unwrap().byte_len(), 4 * 3 * 8);
    }

    #[test]
    fn test_resize_attribute_matrix_resizes_arrays() {
        let (mut dca, am) = cell_data();
        let id = dca
            .insert_array(&am, Box::new(DataArray::<u16>::create(4, &[2], "V", false).unwrap()))
            .unwrap();
        dca.resize_attribute_matrix(&am, &[3, 3]).unwrap();
        let array = dca.resolve(id).unwrap();
        assert_eq!(array.number_of_tuples(), 9);
        assert_eq!(array.byte_len(), 9 * 2 * 2);
    }

    #[test]
    fn test_failed_resize_keeps_matrix_and_arrays_in_step() {
        let (mut dca, am) = cell_data();
        // Resized first (names sort), and succeeds since it holds no elements
        let empty = DataArray::<u8>::create(4, &[0], "Empty", false).unwrap();
        let small = DataArray::<u8>::create(4, &[1], "Small", true).unwrap();
        let wide = DataArray::<u64>::create(4, &[4], "Wide", true).unwrap();
        let empty_id = dca.insert_array(&am, Box::new(empty)).unwrap();
        let small_id = dca.insert_array(&am, Box::new(small)).unwrap();
        let wide_id = dca.insert_array(&am, Box::new(wide)).unwrap();

        let err = dca
            .resize_attribute_matrix(&am, &[usize::MAX / 4])
            .unwrap_err();
        assert!(matches!(err, SimplError::AllocationFailure { .. }));

        let matrix = dca.attribute_matrix(&am).unwrap();
        assert_eq!(matrix.number_of_tuples(), 4);
        assert_eq!(matrix.tuple_dimensions(), &[2, 2]);
        assert_eq!(dca.resolve(empty_id).unwrap().number_of_tuples(), 4);
        assert_eq!(dca.resolve(small_id).unwrap().number_of_tuples(), 4);
        assert_eq!(dca.resolve(small_id).unwrap().byte_len(), 4);
        assert_eq!(dca.resolve(wide_id).unwrap().number_of_tuples(), 4);
    }

    #[test]
    fn test_overflowing_tuple_dims_are_rejected() {
        let (mut dca, am) = cell_data();
        let err = dca
            .create_attribute_matrix("ImageDataContainer", "Huge", &[usize::MAX, 2])
            .unwrap_err();
        assert_eq!(err.code(), codes::INVALID_DIMENSIONS);
        assert!(dca
            .attribute_matrix(&DataArrayPath::matrix("ImageDataContainer", "Huge"))
            .is_err());

        let err = dca.resize_attribute_matrix(&am, &[usize::MAX, 2]).unwrap_err();
        assert_eq!(err.code(), codes::INVALID_DIMENSIONS);
        assert_eq!(dca.attribute_matrix(&am).unwrap().number_of_tuples(), 4);
    }

    #[test]
    fn test_resolve_pair_mut() {
        let (mut dca, am) = cell_data();
        let a = dca
            .insert_array(&am, Box::new(DataArray::<u8>::create(4, &[1], "A", true).unwrap()))
            .unwrap();
        let b = dca
            .insert_array(&am, Box::new(DataArray::<u8>::with_values("B", &[1], vec![1, 2, 3, 4]).unwrap()))
            .unwrap();
        let (target, source) = dca.resolve_pair_mut(a, b).unwrap();
        assert_eq!(target.name(), "A");
        assert_eq!(source.name(), "B");
        assert_eq!(dca.resolve_pair_mut(a, a).unwrap_err().code(), -10009);
    }
}
