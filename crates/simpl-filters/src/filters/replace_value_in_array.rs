//! Replace every occurrence of one value with another

use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use simpl_core::{
    unsupported_type, ArrayVisitorMut, AttributeArray, DataArrayPath, Dispatcher, Element,
    FunctorFamily, SimplResult, TypedFunctor,
};

use super::report_filter_error;
use crate::algorithms::{CheckReplaceValue, ReplaceValue};
use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterContext};

/// Replaces every element of a single-component array equal to
/// `remove_value` with `replace_value`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReplaceValueInArray {
    #[serde(rename = "SelectedArray")]
    pub selected_array_path: DataArrayPath,
    pub remove_value: f64,
    pub replace_value: f64,
}

impl ReplaceValueInArray {
    pub fn new(selected_array_path: DataArrayPath, remove_value: f64, replace_value: f64) -> Self {
        Self {
            selected_array_path,
            remove_value,
            replace_value,
        }
    }
}

/// Functor family running [`ReplaceValue`] through `execute_template`
pub struct ReplaceValueFamily;

#[derive(Debug)]
pub struct ReplaceValueFunctor<T>(PhantomData<T>);

impl<T> Default for ReplaceValueFunctor<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl FunctorFamily for ReplaceValueFamily {
    type Args<'a> = ReplaceValue;
    type Output = ();
    type Functor<T: Element> = ReplaceValueFunctor<T>;
}

impl<T: Element> TypedFunctor<ReplaceValueFamily> for ReplaceValueFunctor<T> {
    fn predicate(&self, array: &dyn AttributeArray) -> bool {
        array.is_type::<T>()
    }

    fn execute<'a>(
        &self,
        array: &mut dyn AttributeArray,
        args: <ReplaceValueFamily as FunctorFamily>::Args<'a>,
    ) -> SimplResult<()> {
        match array.downcast_mut::<T>() {
            Some(typed) => args.visit(typed),
            None => Err(unsupported_type(array)),
        }
    }
}

impl Filter for ReplaceValueInArray {
    fn name(&self) -> &str {
        "ReplaceValueInArray"
    }

    fn human_label(&self) -> &str {
        "Replace Value in Array"
    }

    fn data_check(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        let label = self.human_label();
        let (dca, reporter) = ctx.parts(label);

        let selected = dca.get_prereq_array(&self.selected_array_path, &reporter)?;
        let array = reporter.report(dca.resolve(selected))?;
        if array.number_of_components() > 1 {
            return report_filter_error(
                &reporter,
                Err(FilterError::NotScalarArray {
                    name: array.name().to_string(),
                    components: array.number_of_components(),
                }),
            );
        }

        let dispatcher = Dispatcher::from_reporter(reporter);
        for (role, value) in [("remove", self.remove_value), ("replace", self.replace_value)] {
            let check = dispatcher.dispatch(array, CheckReplaceValue { role, value })?;
            report_filter_error(&reporter, check)?;
        }
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        let label = self.human_label();
        let parallel = ctx.parallel().clone();
        let (dca, reporter) = ctx.parts(label);

        let selected = dca.get_prereq_array(&self.selected_array_path, &reporter)?;
        let array = reporter.report(dca.resolve_mut(selected))?;
        Dispatcher::from_reporter(reporter).execute_template::<ReplaceValueFamily>(
            array,
            ReplaceValue::new(self.remove_value, self.replace_value).with_parallel(parallel),
        )?;
        Ok(())
    }
}
