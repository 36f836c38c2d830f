use thiserror::Error;

use crate::tally::Tally;



#[derive(Debug, Error)]
pub enum PipelineError {

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// grand sum through the pipeline differs from what the producer observed
    #[error("sums are not equal: {input} != {output}")]
    SumMismatch { input: i64, output: i64 },

    #[error("counts are not equal: {input} != {output}")]
    CountMismatch { input: u64, output: u64 },

    /// per-worker counts do not add up to the observed count
    #[error("values were split across workers incorrectly: {remainder} left over")]
    PartitionMismatch { remainder: i128 },

    #[error("untruncated runs disagree: {first} != {later}")]
    RunsDiverged { first: Tally, later: Tally },

    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {

    /// Consistency faults point at a logic or race defect, never a transient state
    pub fn is_consistency_fault(&self) -> bool {
        matches!(
            self,
            PipelineError::SumMismatch { .. }
                | PipelineError::CountMismatch { .. }
                | PipelineError::PartitionMismatch { .. }
                | PipelineError::RunsDiverged { .. }
        )
    }
}
