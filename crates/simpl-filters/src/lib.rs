//! simpl-filters - Generic algorithms, filters and pipelines over SIMPL arrays
//!
//! Builds on `simpl-core`'s dispatch layer: algorithms are written once as
//! visitors, filters wire them to arrays found by path, and a pipeline runs
//! filters in order with preflight, progress reporting and cancellation.
//!
//! # Key Components
//!
//! - **Algorithms**: `Scale`, `Sum`, `CopyTuples`, `ConditionalReplace`,
//!   `ReplaceValue`, `FillValue` and the replace-value range check
//! - **Filters**: `ConditionalSetValue` and `ReplaceValueInArray`
//! - **Pipeline**: `FilterPipeline` with its `State` / `ExecutionResult`
//!   lifecycle and a cloneable `PipelineControl` for cancellation
//! - **Config / Logging**: `RuntimeConfig` (TOML or JSON) and a
//!   `tracing-subscriber` setup honouring `SIMPL_LOG`
//!
//! # Example
//!
//! ```
//! use simpl_core::{DataArray, DataArrayPath, DataContainerArray, MessageCollector};
//! use simpl_filters::{ExecutionResult, FilterPipeline, ReplaceValueInArray};
//!
//! let path = DataArrayPath::new("DC", "AM", "Phases");
//! let mut dca = DataContainerArray::new();
//! dca.create_data_container("DC").unwrap();
//! dca.create_attribute_matrix("DC", "AM", &[3]).unwrap();
//! let phases = DataArray::<i32>::with_values("Phases", &[1], vec![0, 1, 0]).unwrap();
//! dca.insert_array(&path, Box::new(phases)).unwrap();
//!
//! let mut pipeline = FilterPipeline::new("Cleanup");
//! pipeline.push_back(ReplaceValueInArray::new(path.clone(), 0.0, 2.0));
//!
//! let messages = MessageCollector::new();
//! assert_eq!(pipeline.preflight(&dca, &messages).unwrap(), 0);
//! let result = pipeline.execute(&mut dca, &messages).unwrap();
//! assert_eq!(result, ExecutionResult::Completed);
//! ```

pub mod algorithms;
pub mod config;
pub mod error;
pub mod filter;
pub mod filters;
pub mod logging;
pub mod pipeline;

pub use algorithms::{
    check_replace_value, for_each_tuple_mut, CheckReplaceValue, ConditionalReplace, CopyTuples,
    FillValue, ReplaceValue, Scale, Sum,
};
pub use config::{LoggingConfig, ParallelConfig, RuntimeConfig};
pub use error::{ConfigError, FilterError, FilterResult};
pub use filter::{ErrorLatch, Filter, FilterContext};
pub use filters::{ConditionalSetValue, ReplaceValueFamily, ReplaceValueFunctor, ReplaceValueInArray};
pub use pipeline::{ExecutionResult, FilterPipeline, PipelineControl, State};
