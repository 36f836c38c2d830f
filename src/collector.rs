use std::fmt;

use tokio::sync::mpsc::Receiver;
use tracing::debug;

use crate::{error::PipelineError, tally::Tally};



/// Final collector
///
/// drain the results queue until the join barrier closes it,
/// summing every published worker sum into a grand total
pub async fn drain_results(mut recv: Receiver<i64>) -> i64 {
    let mut total = 0;
    let mut entries = 0usize;

    while let Some(sum) = recv.recv().await {
        total += sum;
        entries += 1;
    }

    debug!(entries, total, "results queue drained");
    total
}




// ------------------------------------------------------



/// Statistics gathered independently at each end of the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// what the producer's observer saw
    pub input: Tally,

    /// grand totals rebuilt from the workers
    pub output: Tally,

    pub per_worker: Vec<Tally>,

    /// deadline fired before the whole sequence was emitted
    pub truncated: bool,
}

impl Report {

    pub fn new(input: Tally, results_sum: i64, per_worker: Vec<Tally>, sequence_len: usize) -> Self {
        let output = Tally {
            count: per_worker.iter().map(|t| t.count).sum(),
            sum: results_sum,
        };

        Report {
            input,
            output,
            per_worker,
            truncated: input.count < sequence_len as u64,
        }
    }


    pub fn worker_counts(&self) -> Vec<u64> {
        self.per_worker.iter().map(|t| t.count).collect()
    }


    /// Cross-check input against output, the first failing check wins
    ///
    /// 1. grand sum equals observed sum
    /// 2. grand count equals observed count
    /// 3. observed count minus every worker count is zero, catches a
    ///    count booked to the wrong worker even when totals agree
    pub fn verify(&self) -> Result<(), PipelineError> {

        if self.input.sum != self.output.sum {
            return Err(PipelineError::SumMismatch {
                input: self.input.sum,
                output: self.output.sum,
            });
        }

        if self.input.count != self.output.count {
            return Err(PipelineError::CountMismatch {
                input: self.input.count,
                output: self.output.count,
            });
        }

        let remainder = self
            .per_worker
            .iter()
            .fold(self.input.count as i128, |left, t| left - t.count as i128);

        if remainder != 0 {
            return Err(PipelineError::PartitionMismatch { remainder });
        }

        Ok(())
    }
}


impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "count: input {} output {}", self.input.count, self.output.count)?;
        writeln!(f, "sum: input {} output {}", self.input.sum, self.output.sum)?;
        write!(f, "per-worker counts: {:?}", self.worker_counts())
    }
}



#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn t(count: u64, sum: i64) -> Tally {
        Tally { count, sum }
    }

    #[tokio::test]
    async fn drains_until_closed() {
        let (tx, rx) = mpsc::channel(3);
        for s in [10i64, 0, 35] {
            tx.send(s).await.unwrap();
        }
        drop(tx);

        assert_eq!(drain_results(rx).await, 45);
    }

    #[test]
    fn consistent_report_passes() {
        let report = Report::new(t(10, 45), 45, vec![t(4, 18), t(0, 0), t(6, 27)], 10);

        assert_eq!(report.output, t(10, 45));
        assert!(!report.truncated);
        assert!(report.verify().is_ok());
    }

    #[test]
    fn truncated_flag() {
        let report = Report::new(t(3, 3), 3, vec![t(3, 3)], 100);
        assert!(report.truncated);
        assert!(report.verify().is_ok());
    }

    #[test]
    fn sum_mismatch_checked_first() {
        let report = Report::new(t(10, 45), 40, vec![t(9, 40)], 10);

        match report.verify() {
            Err(PipelineError::SumMismatch { input: 45, output: 40 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn count_mismatch() {
        let report = Report::new(t(10, 45), 45, vec![t(4, 20), t(5, 25)], 10);

        match report.verify() {
            Err(PipelineError::CountMismatch { input: 10, output: 9 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn partition_mismatch_when_totals_disagree_with_slots() {
        // output rebuilt elsewhere agrees, but the slots do not add up
        let mut report = Report::new(t(10, 45), 45, vec![t(4, 20), t(5, 25)], 10);
        report.output = t(10, 45);

        match report.verify() {
            Err(PipelineError::PartitionMismatch { remainder: 1 }) => {}
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn display_lines() {
        let report = Report::new(t(10, 45), 45, vec![t(7, 30), t(3, 15)], 10);

        assert_eq!(
            report.to_string(),
            "count: input 10 output 10\nsum: input 45 output 45\nper-worker counts: [7, 3]"
        );
    }
}
