//! Generic array algorithms
//!
//! Each algorithm is written once as a dispatch visitor and runs over every
//! element type. Tuple-wise work goes through [`for_each_tuple_mut`], which
//! splits the buffer into whole tuples and, with the `parallel` feature,
//! hands them to rayon when the array is large enough.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use simpl_core::{
    ArrayVisitor, ArrayVisitorMut, AttributeArray, DataArray, Element, ScalarType, SimplError,
    SimplResult,
};

use crate::config::ParallelConfig;
use crate::error::{codes, FilterError, FilterResult};

/// Run `f` on every tuple of `array` with its tuple index
pub fn for_each_tuple_mut<T, F>(array: &mut DataArray<T>, parallel: &ParallelConfig, f: F)
where
    T: Element,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    let components = array.number_of_components().max(1);
    let num_tuples = array.number_of_tuples();
    let data = array.as_mut_slice();

    #[cfg(feature = "parallel")]
    {
        if parallel.should_parallelize(num_tuples) {
            tracing::debug!(num_tuples, components, "parallel tuple loop");
            data.par_chunks_mut(components)
                .enumerate()
                .for_each(|(index, tuple)| f(index, tuple));
            return;
        }
    }

    #[cfg(not(feature = "parallel"))]
    let _ = (parallel, num_tuples);

    for (index, tuple) in data.chunks_mut(components).enumerate() {
        f(index, tuple);
    }
}

/// Multiply every element by `factor`
#[derive(Debug, Clone)]
pub struct Scale {
    pub factor: f64,
    pub parallel: ParallelConfig,
}

impl Scale {
    pub fn new(factor: f64) -> Self {
        Self {
            factor,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

impl ArrayVisitorMut for Scale {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        let factor = self.factor;
        for_each_tuple_mut(array, &self.parallel, |_, tuple| {
            for value in tuple.iter_mut() {
                *value = T::from_f64(value.to_f64() * factor);
            }
        });
        Ok(())
    }
}

/// Sum of every element, widened to f64
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl ArrayVisitor for Sum {
    type Output = f64;

    fn visit<T: Element>(self, array: &DataArray<T>) -> SimplResult<f64> {
        Ok(array.as_slice().iter().map(|v| v.to_f64()).sum())
    }
}

/// Copy every tuple of `source` into the visited array.
///
/// The source must hold the same element type and have the same shape.
#[derive(Debug, Clone, Copy)]
pub struct CopyTuples<'s> {
    pub source: &'s dyn AttributeArray,
}

impl ArrayVisitorMut for CopyTuples<'_> {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        let source = self
            .source
            .downcast_ref::<T>()
            .ok_or_else(|| SimplError::TypeMismatch {
                name: self.source.name().to_string(),
                expected: T::SCALAR_TYPE.name().to_string(),
                actual: self.source.type_as_string(),
            })?;
        if source.number_of_tuples() != array.number_of_tuples() {
            return Err(SimplError::TupleMismatch {
                name: source.name().to_string(),
                expected: array.number_of_tuples(),
                actual: source.number_of_tuples(),
            });
        }
        array.copy_from_array(0, source, 0, source.number_of_tuples())
    }
}

/// Broadcast `value` into every tuple whose mask entry is true
#[derive(Debug, Clone)]
pub struct ConditionalReplace<'m> {
    pub mask: &'m DataArray<bool>,
    pub value: f64,
    pub parallel: ParallelConfig,
}

impl<'m> ConditionalReplace<'m> {
    pub fn new(mask: &'m DataArray<bool>, value: f64) -> Self {
        Self {
            mask,
            value,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

impl ArrayVisitorMut for ConditionalReplace<'_> {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        if self.mask.number_of_tuples() != array.number_of_tuples() {
            return Err(SimplError::TupleMismatch {
                name: self.mask.name().to_string(),
                expected: array.number_of_tuples(),
                actual: self.mask.number_of_tuples(),
            });
        }
        let mask_components = self.mask.number_of_components().max(1);
        let mask = self.mask.as_slice();
        let value = T::from_f64(self.value);
        for_each_tuple_mut(array, &self.parallel, |index, tuple| {
            if mask.get(index * mask_components).copied().unwrap_or(false) {
                tuple.fill(value);
            }
        });
        Ok(())
    }
}

/// Replace every element equal to `remove` with `replace`
#[derive(Debug, Clone)]
pub struct ReplaceValue {
    pub remove: f64,
    pub replace: f64,
    pub parallel: ParallelConfig,
}

impl ReplaceValue {
    pub fn new(remove: f64, replace: f64) -> Self {
        Self {
            remove,
            replace,
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }
}

impl ArrayVisitorMut for ReplaceValue {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        let remove = T::from_f64(self.remove);
        let replace = T::from_f64(self.replace);
        for_each_tuple_mut(array, &self.parallel, |_, tuple| {
            for value in tuple.iter_mut().filter(|v| **v == remove) {
                *value = replace;
            }
        });
        Ok(())
    }
}

/// Set every element to `value`
#[derive(Debug, Clone, Copy)]
pub struct FillValue {
    pub value: f64,
}

impl ArrayVisitorMut for FillValue {
    type Output = ();

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<()> {
        array.initialize_with_value(T::from_f64(self.value));
        Ok(())
    }
}

/// Check that `value` can be stored as a `T` and convert it.
///
/// Integers accept `[T::MIN, T::MAX]` (-100). Floats accept zero and
/// magnitudes in `[MIN_POSITIVE, MAX]` (-101). Any non-zero value is `true`
/// for bool.
pub fn check_replace_value<T: Element>(role: &'static str, value: f64) -> FilterResult<T> {
    let scalar_type = T::SCALAR_TYPE;
    let valid = match scalar_type {
        ScalarType::Bool => true,
        ScalarType::Float | ScalarType::Double => {
            let magnitude = value.abs();
            value == 0.0 || (T::SMALLEST_POSITIVE..=T::HIGHEST).contains(&magnitude)
        }
        _ => (T::LOWEST..=T::HIGHEST).contains(&value),
    };
    if !valid {
        let (min, code) = if scalar_type.is_float() {
            (T::SMALLEST_POSITIVE, codes::FLOAT_VALUE_OUT_OF_RANGE)
        } else {
            (T::LOWEST, codes::INTEGER_VALUE_OUT_OF_RANGE)
        };
        return Err(FilterError::InvalidReplaceValue {
            role,
            value,
            type_name: scalar_type.name(),
            min,
            max: T::HIGHEST,
            code,
        });
    }
    Ok(T::from_f64(value))
}

/// Run [`check_replace_value`] for the visited array's element type.
///
/// Every type in the scalar set passes through here, `size_t` included: it is
/// range checked as an unsigned integer like `uint64_t` rather than rejected.
/// Arrays outside the set fail in dispatch with -401 before any check runs.
#[derive(Debug, Clone, Copy)]
pub struct CheckReplaceValue {
    pub role: &'static str,
    pub value: f64,
}

impl ArrayVisitor for CheckReplaceValue {
    type Output = FilterResult<()>;

    fn visit<T: Element>(self, _array: &DataArray<T>) -> SimplResult<FilterResult<()>> {
        Ok(check_replace_value::<T>(self.role, self.value).map(|_| ()))
    }
}
