//! Domain types shared by the Questsmith crates.
//!
//! Holds the adventure parameters and prompt templates, the job record with
//! its forward-only status machine, and the [`generation::TextGenerator`]
//! seam that provider clients implement.

pub mod adventure;
pub mod error;
pub mod generation;
pub mod job;
pub mod types;
