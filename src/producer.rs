use std::time::Duration;

use async_trait::async_trait;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, trace};



/// Bookkeeping hook the producer awaits after every hand-off.
///
/// Runs on the producer's own task, inside the deadline budget: a slow
/// observer shortens the emitted sequence. Must not fail.
#[async_trait]
pub trait Observer: Send {
    async fn observe(&mut self, value: i64);
}


#[async_trait]
impl<F> Observer for F
where
    F: FnMut(i64) + Send
{
    async fn observe(&mut self, value: i64) {
        (self)(value)
    }
}



// ------------------------------------------------------



pub struct Context<O>
where
    O: Observer + 'static
{
    sender: mpsc::Sender<i64>,
    sequence_len: usize,
    deadline: Duration,
    observer: O,
}

impl<O> Context<O>
where
    O: Observer + 'static
{

    pub fn new(sender: mpsc::Sender<i64>,
               sequence_len: usize,
               deadline: Duration,
               observer: O) -> Self
    {
        Context {
            sender,
            sequence_len,
            deadline,
            observer,
        }
    }


    /// Spawn the producer, the observer is handed back once the output
    /// queue is closed
    #[inline]
    pub fn run(self) -> JoinHandle<O> {
        tokio::spawn(self.emit())
    }


    async fn emit(mut self) -> O {

        // deadline counts from producer start
        let sleep = tokio::time::sleep(self.deadline);
        tokio::pin!(sleep);

        debug!(len = self.sequence_len, deadline = ?self.deadline, "producer started");

        let mut emitted = 0usize;

        for i in 0..self.sequence_len {
            let value = i as i64;

            tokio::select! {
                // expired deadline wins a tie
                biased;

                _ = &mut sleep => {
                    debug!(emitted, remaining = self.sequence_len - emitted, "deadline elapsed, truncating sequence");
                    break;
                }
                res = self.sender.send(value) => {
                    if res.is_err() {
                        // every downstream receiver is gone
                        debug!(emitted, "output queue closed downstream");
                        break;
                    }

                    trace!(value, "emitted");
                    self.observer.observe(value).await;
                    emitted += 1;
                }
            }
        }

        // close output queue, downstream sees end-of-stream
        drop(self.sender);

        debug!(emitted, "producer finished");
        self.observer
    }
}
