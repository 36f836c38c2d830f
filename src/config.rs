use std::time::Duration;

use crate::error::PipelineError;



pub const SEQUENCE_LEN: usize = 100;
pub const WORKERS: usize = 5;
pub const DEADLINE: Duration = Duration::from_micros(200);
pub const BUFFER_SIZE: usize = 1;

/// Longest sequence whose sum `0 + 1 + .. + (len - 1)` still fits in an `i64`
pub const MAX_SEQUENCE_LEN: usize = 4_294_967_296;



/// Shape of one pipeline run
///
/// ## sequence_len
/// producer emits `0..sequence_len`, bounded by `MAX_SEQUENCE_LEN`
///
/// ## workers
/// number of relay workers, each paired with one aggregator
///
/// ## deadline
/// measured from producer start; values not handed off before it
/// elapses are never emitted
///
/// ## buffer_size
/// capacity of the producer and relay queues, `1` is the closest
/// tokio gets to a rendezvous channel
///
/// ```
/// use std::time::Duration;
/// use tokio_fanout::PipelineConfig;
///
/// let cfg = PipelineConfig::default()
///     .with_sequence_len(10)
///     .with_workers(3)
///     .with_deadline(Duration::from_secs(1));
///
/// assert!(cfg.validate().is_ok());
/// assert!(cfg.with_workers(0).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    pub sequence_len: usize,
    pub workers: usize,
    pub deadline: Duration,
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            sequence_len: SEQUENCE_LEN,
            workers: WORKERS,
            deadline: DEADLINE,
            buffer_size: BUFFER_SIZE,
        }
    }
}

impl PipelineConfig {

    pub fn with_sequence_len(mut self, sequence_len: usize) -> Self {
        self.sequence_len = sequence_len;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }


    /// Results queue holds one entry per worker, so publishing never blocks
    #[inline]
    pub fn results_buffer(&self) -> usize {
        self.workers
    }


    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.sequence_len as u128 > MAX_SEQUENCE_LEN as u128 {
            return Err(PipelineError::InvalidConfig(format!(
                "sequence length {} exceeds {}, its sum would overflow",
                self.sequence_len, MAX_SEQUENCE_LEN
            )));
        }

        if self.workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "pipeline must at-least have 1 worker".to_string(),
            ));
        }

        // tokio mpsc panics on a zero capacity
        if self.buffer_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
