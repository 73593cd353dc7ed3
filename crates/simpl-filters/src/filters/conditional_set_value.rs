//! Replace values where a boolean mask is true

use serde::{Deserialize, Serialize};
use simpl_core::{AttributeArray, DataArray, DataArrayPath, Dispatcher, SimplError};

use super::report_filter_error;
use crate::algorithms::{CheckReplaceValue, ConditionalReplace};
use crate::error::FilterResult;
use crate::filter::{Filter, FilterContext};

/// Sets every tuple of the selected array to `replace_value` where the
/// conditional (bool, single-component) array is true.
///
/// The selected array may hold any element type. For bool arrays any
/// non-zero replace value stores `true`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConditionalSetValue {
    pub selected_array_path: DataArrayPath,
    pub conditional_array_path: DataArrayPath,
    pub replace_value: f64,
}

impl ConditionalSetValue {
    pub fn new(
        selected_array_path: DataArrayPath,
        conditional_array_path: DataArrayPath,
        replace_value: f64,
    ) -> Self {
        Self {
            selected_array_path,
            conditional_array_path,
            replace_value,
        }
    }
}

impl Filter for ConditionalSetValue {
    fn name(&self) -> &str {
        "ConditionalSetValue"
    }

    fn human_label(&self) -> &str {
        "Replace Value in Array (Conditional)"
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        let label = self.human_label();
        let (dca, reporter) = ctx.parts(label);

        let selected = dca.get_prereq_array(&self.selected_array_path, &reporter)?;
        dca.get_prereq_array_of::<bool>(&self.conditional_array_path, &[1], &reporter)?;
        dca.validate_number_of_tuples(
            &[
                self.selected_array_path.clone(),
                self.conditional_array_path.clone(),
            ],
            &reporter,
        )?;

        let array = reporter.report(dca.resolve(selected))?;
        let check = Dispatcher::from_reporter(reporter).dispatch(
            array,
            CheckReplaceValue {
                role: "replace",
                value: self.replace_value,
            },
        )?;
        report_filter_error(&reporter, check)
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        let label = self.human_label();
        let parallel = ctx.parallel().clone();
        let (dca, reporter) = ctx.parts(label);

        let selected = dca.get_prereq_array(&self.selected_array_path, &reporter)?;
        let condition =
            dca.get_prereq_array_of::<bool>(&self.conditional_array_path, &[1], &reporter)?;

        // A mask that is also the target is read from a snapshot
        let snapshot: DataArray<bool>;
        let (target, mask) = if selected == condition {
            snapshot = reporter.report(dca.resolve_typed::<bool>(condition))?.clone();
            (reporter.report(dca.resolve_mut(selected))?, &snapshot)
        } else {
            let (target, mask) = reporter.report(dca.resolve_pair_mut(selected, condition))?;
            let mask = reporter.report(mask.downcast_ref::<bool>().ok_or_else(|| {
                SimplError::TypeMismatch {
                    name: mask.name().to_string(),
                    expected: "bool".to_string(),
                    actual: mask.type_as_string(),
                }
            }))?;
            (target, mask)
        };

        Dispatcher::from_reporter(reporter).dispatch_mut(
            target,
            ConditionalReplace::new(mask, self.replace_value).with_parallel(parallel),
        )?;
        Ok(())
    }
}
