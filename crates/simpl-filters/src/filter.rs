//! The filter trait and the context filters run in
//!
//! A filter is checked against placeholder data first (`data_check`, the
//! preflight pass) and then run for real (`execute`). Both passes receive a
//! [`FilterContext`] holding the container hierarchy, the observer wrapped
//! in an [`ErrorLatch`], and the pipeline's cancel flag.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use simpl_core::{DataContainerArray, Observer, PipelineMessage, Reporter};

use crate::config::ParallelConfig;
use crate::error::FilterResult;

/// A unit of work in a pipeline
pub trait Filter: Send {
    /// Stable class name, as stored in pipeline files
    fn name(&self) -> &str;

    /// Label shown to users and used as the message prefix
    fn human_label(&self) -> &str;

    /// Validate parameters and inputs, creating placeholder outputs.
    ///
    /// Errors are reported through the context before being returned.
    fn data_check(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()>;

    /// Run the filter on allocated data
    fn execute(&mut self, ctx: &mut FilterContext<'_>) -> FilterResult<()>;
}

/// Observer wrapper that remembers the first error code it forwards
pub struct ErrorLatch<'o> {
    inner: &'o dyn Observer,
    first_error: AtomicI32,
}

impl<'o> ErrorLatch<'o> {
    pub fn new(inner: &'o dyn Observer) -> Self {
        Self {
            inner,
            first_error: AtomicI32::new(0),
        }
    }

    /// Code of the first error forwarded, if any
    pub fn first_error(&self) -> Option<i32> {
        match self.first_error.load(Ordering::Acquire) {
            0 => None,
            code => Some(code),
        }
    }

    pub fn reset(&self) {
        self.first_error.store(0, Ordering::Release);
    }
}

impl Observer for ErrorLatch<'_> {
    fn notify(&self, message: &PipelineMessage) {
        if message.is_error() && message.code < 0 {
            let _ = self.first_error.compare_exchange(
                0,
                message.code,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        self.inner.notify(message);
    }
}

impl std::fmt::Debug for ErrorLatch<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorLatch")
            .field("first_error", &self.first_error())
            .finish()
    }
}

/// Everything a filter can touch while it runs
#[derive(Debug)]
pub struct FilterContext<'a> {
    dca: &'a mut DataContainerArray,
    latch: ErrorLatch<'a>,
    cancel: Option<&'a AtomicBool>,
    preflight: bool,
    parallel: ParallelConfig,
}

impl<'a> FilterContext<'a> {
    /// Context for an execute pass
    pub fn new(dca: &'a mut DataContainerArray, observer: &'a dyn Observer) -> Self {
        Self {
            dca,
            latch: ErrorLatch::new(observer),
            cancel: None,
            preflight: false,
            parallel: ParallelConfig::default(),
        }
    }

    /// Context for a preflight pass
    pub fn preflight(dca: &'a mut DataContainerArray, observer: &'a dyn Observer) -> Self {
        Self {
            preflight: true,
            ..Self::new(dca, observer)
        }
    }

    pub fn with_cancel_flag(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Is this the preflight pass? Outputs must then be created unallocated.
    pub fn is_preflight(&self) -> bool {
        self.preflight
    }

    /// Has the pipeline been asked to stop?
    pub fn is_canceled(&self) -> bool {
        self.cancel
            .map(|flag| flag.load(Ordering::Acquire))
            .unwrap_or(false)
    }

    pub fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    pub fn data_container_array(&self) -> &DataContainerArray {
        &*self.dca
    }

    pub fn data_container_array_mut(&mut self) -> &mut DataContainerArray {
        &mut *self.dca
    }

    /// Observer messages should go to
    pub fn observer(&self) -> &dyn Observer {
        &self.latch
    }

    /// Reporter sending messages under `prefix`
    pub fn reporter<'s>(&'s self, prefix: &'s str) -> Reporter<'s> {
        Reporter::new(&self.latch, prefix)
    }

    /// Split into the container hierarchy and a reporter, so a filter can
    /// mutate arrays while reporting
    pub fn parts<'s>(&'s mut self, prefix: &'s str) -> (&'s mut DataContainerArray, Reporter<'s>) {
        (&mut *self.dca, Reporter::new(&self.latch, prefix))
    }

    /// First error code reported through this context, if any
    pub fn error_code(&self) -> Option<i32> {
        self.latch.first_error()
    }

    pub fn reset_error(&self) {
        self.latch.reset();
    }
}
