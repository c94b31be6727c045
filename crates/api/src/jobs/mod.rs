//! In-memory tracking of generation jobs.

pub mod registry;

pub use registry::{JobCounts, JobRegistry};
