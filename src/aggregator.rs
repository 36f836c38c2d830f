use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::tally::{SlotWriter, Tally};



pub struct Context {
    recv: mpsc::Receiver<i64>,
    slot: SlotWriter,
    results: mpsc::Sender<i64>,
}

impl Context {

    pub fn new(recv: mpsc::Receiver<i64>,
               slot: SlotWriter,
               results: mpsc::Sender<i64>) -> Self
    {
        Context {
            recv,
            slot,
            results,
        }
    }


    /// Tally one relay's output until it closes, fill this worker's slot,
    /// then publish the local sum. The task finishing is the completion
    /// signal the join barrier waits on, also when nothing was received.
    #[inline]
    pub fn run(mut self) -> JoinHandle<()> {
        // spawn
        tokio::spawn(async move {

            let mut tally = Tally::default();

            while let Some(v) = self.recv.recv().await {
                tally.record(v);
            }

            let worker = self.slot.index();
            debug!(worker, count = tally.count, sum = tally.sum, "aggregator drained");

            self.slot.write(tally);

            // results queue has a slot per worker, never closed before the barrier
            if self.results.send(tally.sum).await.is_err() {
                warn!(worker, "results queue closed before publish");
            }
        })
    }
}
