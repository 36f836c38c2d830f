use tokio::{sync::mpsc, task::JoinHandle};
use tracing::debug;

use crate::error::PipelineError;



/// Join barrier & closer.
///
/// Owns the last results sender. Waits for every aggregator task, then
/// drops the sender so the results queue closes exactly once, after every
/// publish has happened. Runs on its own task so the sole consumer can
/// drain the queue meanwhile.
pub fn start_join_barrier(aggregators: Vec<JoinHandle<()>>,
                          results: mpsc::Sender<i64>) -> JoinHandle<Result<(), PipelineError>>
{
    tokio::spawn(async move {

        let pending = aggregators.len();
        let mut failed = None;

        // Wait all, even past a failure: closing early could cut a publish
        for handle in aggregators {
            if let Err(e) = handle.await {
                failed.get_or_insert(e);
            }
        }

        debug!(pending, "all aggregators done, closing results queue");
        drop(results);

        match failed {
            Some(e) => Err(PipelineError::Task(e)),
            None => Ok(()),
        }
    })
}
