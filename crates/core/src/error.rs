use crate::job::JobStatus;
use crate::types::JobId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Job {id} is already {status}")]
    InvalidTransition { id: JobId, status: JobStatus },
}
