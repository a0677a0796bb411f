//! Processing pipeline components.

mod aggregator;
mod coordinator;
mod processor;

pub use aggregator::{AggregationOptions, aggregate_detections};
pub use coordinator::{collect_input_files, output_dir_for, output_path_for};
pub use processor::{ProcessResult, process_file};
