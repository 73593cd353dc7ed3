//! Creation helpers
//!
//! These enumerate the same closed type set as the dispatcher so that an
//! array created "like" another, or from a persisted type tag, always lands
//! on one of the twelve element types.

use tracing::{debug, warn};

use crate::array::{AttributeArray, BoxedArray, DataArray};
use crate::dispatch::{match_scalar_type, unsupported_type};
use crate::error::{SimplError, SimplResult};
use crate::scalar::{Element, ScalarType};

/// Create an array of `scalar_type`. With `allocate`, every element is set
/// to `init_value` converted with `as`-cast semantics.
pub fn create_array(
    scalar_type: ScalarType,
    tuple_dims: &[usize],
    component_dims: &[usize],
    name: &str,
    allocate: bool,
    init_value: f64,
) -> SimplResult<BoxedArray> {
    debug!(%scalar_type, name, ?tuple_dims, ?component_dims, allocate, "create array");
    match_scalar_type!(Some(scalar_type), T => {
        let mut array = DataArray::<T>::create_with_tuple_dims(tuple_dims, component_dims, name, allocate)?;
        if allocate {
            array.initialize_with_value(T::from_f64(init_value));
        }
        Ok(Box::new(array) as BoxedArray)
    }, _ => Err(SimplError::UnknownTypeTag(scalar_type.tag())))
}

/// Create an empty array of the same concrete element type as `existing`.
///
/// Fails with `UnsupportedType` (-401) when `existing` is outside the closed
/// scalar set.
pub fn create_array_like(
    existing: &dyn AttributeArray,
    tuple_dims: &[usize],
    component_dims: &[usize],
    name: &str,
    allocate: bool,
) -> SimplResult<BoxedArray> {
    match existing.scalar_type() {
        Some(scalar_type) => {
            create_array(scalar_type, tuple_dims, component_dims, name, allocate, 0.0)
        }
        None => {
            warn!(
                source = existing.name(),
                type_name = %existing.type_as_string(),
                "cannot create array like unsupported type"
            );
            Err(unsupported_type(existing))
        }
    }
}

/// Create an array from a persisted integer type tag (0..=11)
pub fn create_array_from_type_tag(
    tag: i32,
    tuple_dims: &[usize],
    component_dims: &[usize],
    name: &str,
    allocate: bool,
    init_value: f64,
) -> SimplResult<BoxedArray> {
    let scalar_type = ScalarType::from_tag(tag).ok_or_else(|| {
        warn!(tag, "unknown scalar type tag");
        SimplError::UnknownTypeTag(tag)
    })?;
    create_array(scalar_type, tuple_dims, component_dims, name, allocate, init_value)
}

/// Create an array from a persisted type name (`float`, `int32_t`, ...)
pub fn create_array_from_type_name(
    type_name: &str,
    tuple_dims: &[usize],
    component_dims: &[usize],
    name: &str,
    allocate: bool,
) -> SimplResult<BoxedArray> {
    let scalar_type = ScalarType::from_name(type_name)
        .ok_or_else(|| SimplError::UnknownTypeName(type_name.to_string()))?;
    create_array(scalar_type, tuple_dims, component_dims, name, allocate, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::StringArray;

    #[test]
    fn test_create_from_tag_initializes() {
        let array = create_array_from_type_tag(4, &[2, 3], &[2], "ids", true, 7.0).unwrap();
        let typed = array.downcast_ref::<i32>().unwrap();
        assert_eq!(typed.number_of_tuples(), 6);
        assert!(typed.as_slice().iter().all(|&v| v == 7));
    }

    #[test]
    fn test_create_from_unknown_tag_fails() {
        let err = create_array_from_type_tag(12, &[1], &[1], "a", true, 0.0).unwrap_err();
        assert_eq!(err, SimplError::UnknownTypeTag(12));
        assert_eq!(err.code(), -401);
        assert!(create_array_from_type_tag(-1, &[1], &[1], "a", true, 0.0).is_err());
    }

    #[test]
    fn test_create_like_string_array_fails() {
        let strings = StringArray::create(3, "names", true);
        let err = create_array_like(&strings, &[3], &[1], "copy", true).unwrap_err();
        assert_eq!(err.code(), -401);
    }

    #[test]
    fn test_create_from_type_name() {
        let array = create_array_from_type_name("uint64_t", &[4], &[1], "a", false).unwrap();
        assert_eq!(array.scalar_type(), Some(ScalarType::UInt64));
        assert!(!array.is_allocated());
        assert!(create_array_from_type_name("complex", &[4], &[1], "a", false).is_err());
    }
}
