//! Background tasks.
//!
//! [`generation`] runs one fire-and-forget task per submitted job.
//! [`job_retention`] is a long-running loop intended to be spawned via
//! `tokio::spawn`; it accepts a [`CancellationToken`] for graceful shutdown.
//!
//! [`CancellationToken`]: tokio_util::sync::CancellationToken

pub mod generation;
pub mod job_retention;
