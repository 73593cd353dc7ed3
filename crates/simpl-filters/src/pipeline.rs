//! Ordered filter pipelines
//!
//! A [`FilterPipeline`] owns its filters and runs them in order against a
//! [`DataContainerArray`]. `preflight` checks every enabled filter against a
//! placeholder copy of the data; `execute` runs each filter's check and then
//! the filter itself, stopping at the first error or when canceled.
//!
//! Cancellation goes through a [`PipelineControl`], a cloneable handle that
//! can be sent to another thread (or held by a filter) while the pipeline is
//! executing.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use simpl_core::{DataContainerArray, Observer, PipelineMessage, Reporter};
use tracing::{debug, info, warn};

use crate::config::{ParallelConfig, RuntimeConfig};
use crate::error::{FilterError, FilterResult};
use crate::filter::{Filter, FilterContext};

/// Execution state of a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum State {
    #[default]
    Idle,
    Executing,
    Canceling,
}

/// Outcome of the most recent `execute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExecutionResult {
    /// Never executed, or execution is in progress
    #[default]
    Invalid,
    Completed,
    Canceled,
    Failed,
}

#[derive(Debug, Default)]
struct ControlState {
    name: String,
    state: Mutex<State>,
    cancel: AtomicBool,
}

/// Shared handle to a pipeline's execution state
#[derive(Debug, Clone, Default)]
pub struct PipelineControl {
    inner: Arc<ControlState>,
}

impl PipelineControl {
    fn new(name: &str) -> Self {
        Self {
            inner: Arc::new(ControlState {
                name: name.to_string(),
                ..ControlState::default()
            }),
        }
    }

    /// Name of the controlled pipeline
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn state(&self) -> State {
        *self.lock()
    }

    /// Has cancellation been requested for the current execution?
    pub fn is_cancel_requested(&self) -> bool {
        self.inner.cancel.load(Ordering::Acquire)
    }

    /// Ask an executing pipeline to stop after the current filter.
    ///
    /// Fails with -201 when the pipeline is idle or already canceling.
    pub fn cancel(&self) -> FilterResult<()> {
        let mut state = self.lock();
        let current = *state;
        let reason = match current {
            State::Executing => {
                *state = State::Canceling;
                self.inner.cancel.store(true, Ordering::Release);
                info!(pipeline = %self.inner.name, "cancel requested");
                return Ok(());
            }
            State::Idle => "not executing",
            State::Canceling => "already canceling",
        };
        Err(FilterError::CannotCancel {
            pipeline: self.inner.name.clone(),
            reason,
        })
    }

    fn cancel_flag(&self) -> &AtomicBool {
        &self.inner.cancel
    }

    /// Move from idle to executing, returning a guard that moves back
    fn begin_execute(&self) -> FilterResult<ExecutionGuard<'_>> {
        let mut state = self.lock();
        if *state != State::Idle {
            return Err(FilterError::AlreadyExecuting {
                pipeline: self.inner.name.clone(),
            });
        }
        *state = State::Executing;
        self.inner.cancel.store(false, Ordering::Release);
        Ok(ExecutionGuard { control: self })
    }

    fn check_preflight(&self) -> FilterResult<()> {
        if self.state() != State::Idle {
            return Err(FilterError::PreflightWhileExecuting {
                pipeline: self.inner.name.clone(),
            });
        }
        Ok(())
    }

    #[cfg(test)]
    fn set_state(&self, state: State) {
        *self.lock() = state;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns the pipeline to idle when execution ends, however it ends
struct ExecutionGuard<'c> {
    control: &'c PipelineControl,
}

impl Drop for ExecutionGuard<'_> {
    fn drop(&mut self) {
        *self.control.lock() = State::Idle;
        self.control.inner.cancel.store(false, Ordering::Release);
    }
}

struct PipelineEntry {
    filter: Box<dyn Filter>,
    enabled: bool,
}

/// An ordered list of filters
pub struct FilterPipeline {
    entries: Vec<PipelineEntry>,
    control: PipelineControl,
    parallel: ParallelConfig,
    result: ExecutionResult,
    error_code: i32,
}

impl FilterPipeline {
    pub fn new(name: &str) -> Self {
        Self {
            entries: Vec::new(),
            control: PipelineControl::new(name),
            parallel: ParallelConfig::default(),
            result: ExecutionResult::Invalid,
            error_code: 0,
        }
    }

    /// Pipeline using the algorithm settings from `config`
    pub fn with_config(name: &str, config: &RuntimeConfig) -> Self {
        Self {
            parallel: config.parallel.clone(),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        self.control.name()
    }

    /// Handle for observing or canceling this pipeline from elsewhere
    pub fn control(&self) -> PipelineControl {
        self.control.clone()
    }

    pub fn state(&self) -> State {
        self.control.state()
    }

    /// Result of the most recent `execute`
    pub fn execution_result(&self) -> ExecutionResult {
        self.result
    }

    /// Error code of the most recent failed run, 0 otherwise
    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an enabled filter
    pub fn push_back(&mut self, filter: impl Filter + 'static) {
        self.push_boxed(Box::new(filter));
    }

    pub fn push_boxed(&mut self, filter: Box<dyn Filter>) {
        self.entries.push(PipelineEntry {
            filter,
            enabled: true,
        });
    }

    /// Insert a filter at `index`, shifting later filters back
    pub fn insert(&mut self, index: usize, filter: Box<dyn Filter>) {
        let index = index.min(self.entries.len());
        self.entries.insert(
            index,
            PipelineEntry {
                filter,
                enabled: true,
            },
        );
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn Filter>> {
        (index < self.entries.len()).then(|| self.entries.remove(index).filter)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Enable or disable the filter at `index`. Returns false if there is none.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn is_enabled(&self, index: usize) -> Option<bool> {
        self.entries.get(index).map(|entry| entry.enabled)
    }

    /// Human labels of every filter, in order
    pub fn filter_labels(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.filter.human_label().to_string())
            .collect()
    }

    /// Request cancellation, reporting a failure to `observer`
    pub fn cancel(&self, observer: &dyn Observer) -> FilterResult<()> {
        let result = self.control.cancel();
        if let Err(err) = &result {
            self.reporter(observer).error(&err.to_string(), err.code());
        }
        result
    }

    /// Check every enabled filter against a placeholder copy of `dca`.
    ///
    /// Returns the bitwise OR of the filters' error codes, 0 when every
    /// filter passed. Fails with -203 while the pipeline is executing.
    pub fn preflight(
        &mut self,
        dca: &DataContainerArray,
        observer: &dyn Observer,
    ) -> FilterResult<i32> {
        if let Err(err) = self.control.check_preflight() {
            self.reporter(observer).error(&err.to_string(), err.code());
            return Err(err);
        }

        let mut working = dca.deep_copy(true);
        let mut preflight_error = 0;
        for entry in self.entries.iter_mut().filter(|entry| entry.enabled) {
            let mut ctx = FilterContext::preflight(&mut working, observer)
                .with_parallel(self.parallel.clone());
            let filter = entry.filter.as_mut();
            let result = filter.data_check(&mut ctx);
            if let Some(code) = settle(filter, &ctx, result) {
                debug!(filter = filter.name(), code, "preflight error");
                preflight_error |= code;
            }
        }

        info!(pipeline = self.name(), preflight_error, "preflight finished");
        Ok(preflight_error)
    }

    /// Run every enabled filter in order against `dca`.
    ///
    /// Fails with -200 if the pipeline is not idle. Otherwise returns how
    /// execution ended; filter errors are reported to `observer` and end
    /// the run with [`ExecutionResult::Failed`].
    pub fn execute(
        &mut self,
        dca: &mut DataContainerArray,
        observer: &dyn Observer,
    ) -> FilterResult<ExecutionResult> {
        let control = self.control.clone();
        let reporter = Reporter::new(observer, control.name());
        let _guard = match control.begin_execute() {
            Ok(guard) => guard,
            Err(err) => {
                reporter.error(&err.to_string(), err.code());
                return Err(err);
            }
        };

        info!(pipeline = control.name(), filters = self.entries.len(), "execute");
        self.result = ExecutionResult::Invalid;
        self.error_code = 0;

        let total = self.entries.len();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            let step = index + 1;
            let label = entry.filter.human_label().to_string();
            let text = format!("[{step}/{total}] {label}");
            let percent = (step as f64 / (total as f64 + 1.0) * 100.0) as u8;
            reporter.progress(&text, percent);
            reporter.status(&text);

            if entry.enabled {
                let filter = entry.filter.as_mut();
                let mut ctx = FilterContext::new(dca, observer)
                    .with_cancel_flag(control.cancel_flag())
                    .with_parallel(self.parallel.clone());
                let result = filter
                    .data_check(&mut ctx)
                    .and_then(|()| filter.execute(&mut ctx));
                if let Some(code) = settle(filter, &ctx, result) {
                    let mut message = PipelineMessage::error(
                        control.name(),
                        format!("[{step}/{total}] {label} caused an error during execution."),
                        code,
                    );
                    message.progress = Some(100);
                    observer.notify(&message);
                    warn!(pipeline = control.name(), filter = %label, code, "filter failed");
                    self.result = ExecutionResult::Failed;
                    self.error_code = code;
                    return Ok(ExecutionResult::Failed);
                }
            }

            if control.state() == State::Canceling {
                break;
            }
        }

        let (result, text) = if control.state() == State::Canceling {
            (ExecutionResult::Canceled, "Pipeline Canceled")
        } else {
            (ExecutionResult::Completed, "Pipeline Complete")
        };
        reporter.status(text);
        info!(pipeline = control.name(), ?result, "execute finished");
        self.result = result;
        Ok(result)
    }

    fn reporter<'o>(&'o self, observer: &'o dyn Observer) -> Reporter<'o> {
        Reporter::new(observer, self.control.name())
    }
}

/// Turn a filter pass into its error code, reporting the error if the
/// filter returned it without reporting it
fn settle(filter: &dyn Filter, ctx: &FilterContext<'_>, result: FilterResult<()>) -> Option<i32> {
    match result {
        Ok(()) => ctx.error_code(),
        Err(err) => {
            if ctx.error_code().is_none() {
                ctx.reporter(filter.human_label())
                    .error(&err.to_string(), err.code());
            }
            Some(err.code())
        }
    }
}

impl fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("name", &self.name())
            .field("filters", &self.filter_labels())
            .field("state", &self.state())
            .field("result", &self.result)
            .finish()
    }
}
