//! Runtime element-type dispatch
//!
//! Algorithms are written once, generically over [`Element`], and run
//! against a type-erased [`AttributeArray`]. Two calling styles are offered:
//!
//! * **Visitors** ([`ArrayVisitor`], [`ArrayVisitorMut`]): the dispatcher
//!   resolves the element type and calls `visit::<T>` with the typed array.
//! * **Functor families** ([`FunctorFamily`]): one functor is instantiated
//!   per candidate type in [`ScalarType::PROBE_ORDER`]; the first whose
//!   predicate accepts the array is executed.
//!
//! Both fail with [`SimplError::UnsupportedType`] (-401) when the array is
//! outside the closed scalar set, without running any part of the algorithm.
//! [`Dispatcher`] wraps the same calls and reports each failure exactly once
//! to an [`Observer`].
//!
//! Visitor dispatch reads the array's stored [`ScalarType`] tag, so it is a
//! single match rather than a chain of downcast attempts. The result is the
//! same as probing in [`ScalarType::PROBE_ORDER`] (see [`probe_scalar_type`]).

use tracing::{debug, warn};

use crate::array::{AttributeArray, DataArray};
use crate::error::{SimplError, SimplResult};
use crate::observer::{Observer, Reporter};
use crate::scalar::{Element, ScalarType};

/// Expand `$body` once per scalar type with `$T` bound to the element type.
///
/// `None` (an array outside the closed set) evaluates `$fallback`.
macro_rules! match_scalar_type {
    ($scalar:expr, $T:ident => $body:expr, _ => $fallback:expr) => {
        match $scalar {
            Some($crate::scalar::ScalarType::Float) => {
                type $T = f32;
                $body
            }
            Some($crate::scalar::ScalarType::Double) => {
                type $T = f64;
                $body
            }
            Some($crate::scalar::ScalarType::Int8) => {
                type $T = i8;
                $body
            }
            Some($crate::scalar::ScalarType::UInt8) => {
                type $T = u8;
                $body
            }
            Some($crate::scalar::ScalarType::Int16) => {
                type $T = i16;
                $body
            }
            Some($crate::scalar::ScalarType::UInt16) => {
                type $T = u16;
                $body
            }
            Some($crate::scalar::ScalarType::Int32) => {
                type $T = i32;
                $body
            }
            Some($crate::scalar::ScalarType::UInt32) => {
                type $T = u32;
                $body
            }
            Some($crate::scalar::ScalarType::Int64) => {
                type $T = i64;
                $body
            }
            Some($crate::scalar::ScalarType::UInt64) => {
                type $T = u64;
                $body
            }
            Some($crate::scalar::ScalarType::Bool) => {
                type $T = bool;
                $body
            }
            Some($crate::scalar::ScalarType::SizeT) => {
                type $T = usize;
                $body
            }
            None => $fallback,
        }
    };
}

pub(crate) use match_scalar_type;

/// Generic read-only algorithm over a typed array
pub trait ArrayVisitor {
    type Output;

    fn visit<T: Element>(self, array: &DataArray<T>) -> SimplResult<Self::Output>;
}

/// Generic in-place algorithm over a typed array
pub trait ArrayVisitorMut {
    type Output;

    fn visit<T: Element>(self, array: &mut DataArray<T>) -> SimplResult<Self::Output>;
}

/// Build the -401 error for `array`
pub fn unsupported_type(array: &dyn AttributeArray) -> SimplError {
    SimplError::UnsupportedType {
        name: array.name().to_string(),
        type_name: array.type_as_string(),
        supported: ScalarType::supported_type_list(),
    }
}

/// Resolve the element type by probing each candidate in
/// [`ScalarType::PROBE_ORDER`] with a checked downcast.
///
/// Returns the first match, or `None` when the array is outside the set.
pub fn probe_scalar_type(array: &dyn AttributeArray) -> Option<ScalarType> {
    ScalarType::PROBE_ORDER.into_iter().find(|&candidate| {
        match_scalar_type!(Some(candidate), T => array.is_type::<T>(), _ => false)
    })
}

/// Run `visitor` on `array` instantiated for its element type
pub fn dispatch<V: ArrayVisitor>(array: &dyn AttributeArray, visitor: V) -> SimplResult<V::Output> {
    match_scalar_type!(array.scalar_type(), T => {
        let typed = array.downcast_ref::<T>().ok_or_else(|| unsupported_type(array))?;
        let scalar_type = T::SCALAR_TYPE;
        debug!(array = array.name(), scalar_type = %scalar_type, "dispatch");
        visitor.visit::<T>(typed)
    }, _ => {
        warn!(array = array.name(), type_name = %array.type_as_string(), "unsupported array type");
        Err(unsupported_type(array))
    })
}

/// Run `visitor` on `array` instantiated for its element type, with mutable access
pub fn dispatch_mut<V: ArrayVisitorMut>(
    array: &mut dyn AttributeArray,
    visitor: V,
) -> SimplResult<V::Output> {
    match_scalar_type!(array.scalar_type(), T => {
        let scalar_type = T::SCALAR_TYPE;
        debug!(array = array.name(), scalar_type = %scalar_type, "dispatch_mut");
        match array.downcast_mut::<T>() {
            Some(typed) => visitor.visit::<T>(typed),
            None => Err(unsupported_type(array)),
        }
    }, _ => {
        warn!(array = array.name(), type_name = %array.type_as_string(), "unsupported array type");
        Err(unsupported_type(array))
    })
}

/// A family of functors, one per element type.
///
/// [`execute_template`] instantiates `Functor<T>` for each candidate type,
/// asks its predicate whether it handles the array, and executes the first
/// one that does.
pub trait FunctorFamily {
    /// Extra arguments passed to the executing functor
    type Args<'a>;
    type Output;
    type Functor<T: Element>: TypedFunctor<Self>;
}

/// One member of a [`FunctorFamily`]
pub trait TypedFunctor<F: FunctorFamily + ?Sized>: Default {
    /// Does this functor handle `array`?
    fn predicate(&self, array: &dyn AttributeArray) -> bool;

    /// Run the algorithm. Only called after `predicate` returned true.
    fn execute<'a>(
        &self,
        array: &mut dyn AttributeArray,
        args: F::Args<'a>,
    ) -> SimplResult<F::Output>;
}

macro_rules! try_functor {
    ($family:ty, $T:ty, $array:ident, $args:ident) => {
        let functor: <$family as FunctorFamily>::Functor<$T> = Default::default();
        if functor.predicate(&*$array) {
            let scalar_type = <$T as Element>::SCALAR_TYPE;
            debug!(array = $array.name(), scalar_type = %scalar_type, "execute_template");
            return functor.execute($array, $args);
        }
    };
}

/// Execute the first functor of `F` whose predicate accepts `array`,
/// probing in [`ScalarType::PROBE_ORDER`]
pub fn execute_template<'a, F: FunctorFamily>(
    array: &mut dyn AttributeArray,
    args: F::Args<'a>,
) -> SimplResult<F::Output> {
    try_functor!(F, f32, array, args);
    try_functor!(F, f64, array, args);
    try_functor!(F, i8, array, args);
    try_functor!(F, u8, array, args);
    try_functor!(F, i16, array, args);
    try_functor!(F, u16, array, args);
    try_functor!(F, i32, array, args);
    try_functor!(F, u32, array, args);
    try_functor!(F, i64, array, args);
    try_functor!(F, u64, array, args);
    try_functor!(F, bool, array, args);
    try_functor!(F, usize, array, args);

    warn!(array = array.name(), type_name = %array.type_as_string(), "no functor accepted array");
    Err(unsupported_type(array))
}

/// Dispatch entry point that reports failures to an observer
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'o> {
    reporter: Reporter<'o>,
}

impl<'o> Dispatcher<'o> {
    /// `prefix` names the caller in reported messages, usually a filter label
    pub fn new(observer: &'o dyn Observer, prefix: &'o str) -> Self {
        Self {
            reporter: Reporter::new(observer, prefix),
        }
    }

    pub fn from_reporter(reporter: Reporter<'o>) -> Self {
        Self { reporter }
    }

    pub fn dispatch<V: ArrayVisitor>(
        &self,
        array: &dyn AttributeArray,
        visitor: V,
    ) -> SimplResult<V::Output> {
        self.reporter.report(dispatch(array, visitor))
    }

    pub fn dispatch_mut<V: ArrayVisitorMut>(
        &self,
        array: &mut dyn AttributeArray,
        visitor: V,
    ) -> SimplResult<V::Output> {
        self.reporter.report(dispatch_mut(array, visitor))
    }

    pub fn execute_template<'a, F: FunctorFamily>(
        &self,
        array: &mut dyn AttributeArray,
        args: F::Args<'a>,
    ) -> SimplResult<F::Output> {
        self.reporter.report(execute_template::<F>(array, args))
    }
}
