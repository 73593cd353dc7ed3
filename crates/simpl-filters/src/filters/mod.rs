//! Concrete filters

mod conditional_set_value;
mod replace_value_in_array;

pub use conditional_set_value::ConditionalSetValue;
pub use replace_value_in_array::{ReplaceValueFamily, ReplaceValueFunctor, ReplaceValueInArray};

use simpl_core::Reporter;

use crate::error::FilterResult;

/// Report `result` once if it failed with an error raised by the filter
/// itself. Core errors have already been reported by the helper that raised
/// them.
pub(crate) fn report_filter_error<R>(reporter: &Reporter<'_>, result: FilterResult<R>) -> FilterResult<R> {
    if let Err(err) = &result {
        reporter.error(&err.to_string(), err.code());
    }
    result
}
