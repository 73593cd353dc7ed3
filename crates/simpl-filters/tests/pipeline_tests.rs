//! Pipeline integration tests
//!
//! Covers stopping on the first error, cancellation between filters,
//! disabled filters and the preflight error code.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use simpl_core::{
    DataArray, DataArrayPath, DataContainerArray, MessageCollector, MessageKind,
};
use simpl_filters::{
    ConditionalSetValue, ExecutionResult, Filter, FilterContext, FilterError, FilterPipeline,
    FilterResult, PipelineControl, ReplaceValueInArray, State,
};

/// Counts how often it executes
struct Counter {
    runs: Arc<AtomicUsize>,
}

impl Filter for Counter {
    fn name(&self) -> &str {
        "Counter"
    }

    fn human_label(&self) -> &str {
        "Counter"
    }

    fn data_check(&mut self, _ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        Ok(())
    }

    fn execute(&mut self, _ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails during execute without reporting
struct Failing;

impl Filter for Failing {
    fn name(&self) -> &str {
        "Failing"
    }

    fn human_label(&self) -> &str {
        "Always Fails"
    }

    fn data_check(&mut self, _ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        Ok(())
    }

    fn execute(&mut self, _ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        Err(FilterError::NotScalarArray {
            name: "Anything".to_string(),
            components: 3,
        })
    }
}

/// Requests cancellation of its own pipeline
struct Canceler {
    control: PipelineControl,
}

impl Filter for Canceler {
    fn name(&self) -> &str {
        "Canceler"
    }

    fn human_label(&self) -> &str {
        "Canceler"
    }

    fn data_check(&mut self, _ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        Ok(())
    }

    fn execute(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()> {
        assert_eq!(self.control.state(), State::Executing);
        self.control.cancel()?;
        assert!(ctx.is_canceled());
        Ok(())
    }
}

fn phases_container() -> (DataContainerArray, DataArrayPath) {
    let path = DataArrayPath::new("DC", "AM", "Phases");
    let mut dca = DataContainerArray::new();
    dca.create_data_container("DC").unwrap();
    dca.create_attribute_matrix("DC", "AM", &[4]).unwrap();
    let phases = DataArray::<i32>::with_values("Phases", &[1], vec![0, 5, 0, 7]).unwrap();
    let mask = DataArray::with_values("Mask", &[1], vec![true, false, true, false]).unwrap();
    dca.insert_array(&path, Box::new(phases)).unwrap();
    dca.insert_array(&path, Box::new(mask)).unwrap();
    (dca, path)
}

#[test]
fn test_pipeline_runs_real_filters() {
    let (mut dca, path) = phases_container();
    let mut pipeline = FilterPipeline::new("Real");
    pipeline.push_back(ConditionalSetValue::new(
        path.clone(),
        path.with_array("Mask"),
        9.0,
    ));
    pipeline.push_back(ReplaceValueInArray::new(path.clone(), 5.0, 6.0));

    let collector = MessageCollector::new();
    assert_eq!(pipeline.preflight(&dca, &collector).unwrap(), 0);
    assert_eq!(
        pipeline.execute(&mut dca, &collector).unwrap(),
        ExecutionResult::Completed
    );
    assert_eq!(collector.error_count(), 0);

    let id = dca.array_id(&path).unwrap();
    assert_eq!(
        dca.resolve_typed::<i32>(id).unwrap().as_slice(),
        &[9, 6, 9, 7]
    );
}

#[test]
fn test_pipeline_stops_at_first_error() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut pipeline = FilterPipeline::new("Stops");
    pipeline.push_back(Counter { runs: runs.clone() });
    pipeline.push_back(Failing);
    pipeline.push_back(Counter { runs: runs.clone() });

    let collector = MessageCollector::new();
    let mut dca = DataContainerArray::new();
    let result = pipeline.execute(&mut dca, &collector).unwrap();

    assert_eq!(result, ExecutionResult::Failed);
    assert_eq!(pipeline.execution_result(), ExecutionResult::Failed);
    assert_eq!(pipeline.error_code(), -11002);
    assert_eq!(pipeline.state(), State::Idle);
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    let errors = collector.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].prefix, "Always Fails");
    assert_eq!(errors[1].code, -11002);
    assert_eq!(errors[1].progress, Some(100));
    assert_eq!(
        errors[1].text,
        "[2/3] Always Fails caused an error during execution."
    );
}

#[test]
fn test_pipeline_cancels_between_filters() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut pipeline = FilterPipeline::new("Cancels");
    let control = pipeline.control();
    pipeline.push_back(Counter { runs: runs.clone() });
    pipeline.push_back(Canceler { control });
    pipeline.push_back(Counter { runs: runs.clone() });

    let collector = MessageCollector::new();
    let mut dca = DataContainerArray::new();
    let result = pipeline.execute(&mut dca, &collector).unwrap();

    assert_eq!(result, ExecutionResult::Canceled);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(pipeline.state(), State::Idle);
    assert!(!pipeline.control().is_cancel_requested());
    assert_eq!(collector.messages().last().unwrap().text, "Pipeline Canceled");
}

#[test]
fn test_disabled_filters_are_skipped() {
    let runs = Arc::new(AtomicUsize::new(0));
    let mut pipeline = FilterPipeline::new("Skips");
    pipeline.push_back(Failing);
    pipeline.push_back(Counter { runs: runs.clone() });
    assert!(pipeline.set_enabled(0, false));

    let collector = MessageCollector::new();
    let mut dca = DataContainerArray::new();
    let result = pipeline.execute(&mut dca, &collector).unwrap();

    assert_eq!(result, ExecutionResult::Completed);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    let statuses: Vec<String> = collector
        .messages()
        .into_iter()
        .filter(|m| m.kind == MessageKind::Status)
        .map(|m| m.text)
        .collect();
    assert_eq!(
        statuses,
        vec!["[1/2] Always Fails", "[2/2] Counter", "Pipeline Complete"]
    );
}

#[test]
fn test_preflight_ors_error_codes_and_leaves_data_untouched() {
    let (dca, path) = phases_container();
    let mut pipeline = FilterPipeline::new("Preflight");
    pipeline.push_back(ReplaceValueInArray::new(path.with_array("Missing"), 0.0, 1.0));
    pipeline.push_back(ReplaceValueInArray::new(path.clone(), 0.0, 1.0e12));

    let collector = MessageCollector::new();
    let code = pipeline.preflight(&dca, &collector).unwrap();

    assert_eq!(code, -404 | -100);
    assert_eq!(collector.error_count(), 2);
    let id = dca.array_id(&path).unwrap();
    assert_eq!(
        dca.resolve_typed::<i32>(id).unwrap().as_slice(),
        &[0, 5, 0, 7]
    );
}

#[test]
fn test_unsupported_type_fails_pipeline_with_401() {
    let (mut dca, path) = phases_container();
    let names = simpl_core::StringArray::from_values(
        "Names",
        vec!["a".into(), "b".into(), "c".into(), "d".into()],
    );
    dca.insert_array(&path, Box::new(names)).unwrap();

    let mut pipeline = FilterPipeline::new("Strings");
    pipeline.push_back(ReplaceValueInArray::new(path.with_array("Names"), 0.0, 1.0));

    let collector = MessageCollector::new();
    let result = pipeline.execute(&mut dca, &collector).unwrap();

    assert_eq!(result, ExecutionResult::Failed);
    assert_eq!(pipeline.error_code(), -401);
    let errors = collector.errors();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].code, -401);
    assert_eq!(errors[0].prefix, "Replace Value in Array");
}
