use std::sync::Arc;

use tokio::{sync::{mpsc, Mutex}, task::JoinHandle};
use tracing::{debug, trace};



/// One input queue drained by many relay workers (competing consumers)
pub type SharedInput<T> = Arc<Mutex<mpsc::Receiver<T>>>;


pub fn share<T>(recv: mpsc::Receiver<T>) -> SharedInput<T> {
    Arc::new(Mutex::new(recv))
}



// ------------------------------------------------------



pub struct Context<T>
where
    T: Send + 'static
{
    id: usize,
    recv: SharedInput<T>,
    sender: mpsc::Sender<T>,
}

impl<T> Context<T>
where
    T: Send + 'static
{

    pub fn new(id: usize,
               recv: SharedInput<T>,
               sender: mpsc::Sender<T>) -> Self
    {
        Context {
            id,
            recv,
            sender,
        }
    }


    /// Forward every value unchanged until the shared input closes,
    /// then drop the private output so it closes too
    #[inline]
    pub fn run(self) -> JoinHandle<()> {
        // spawn
        tokio::spawn(async move {

            debug!(worker = self.id, "relay started");

            let mut relayed = 0u64;

            loop {
                // lock is held for a single recv only
                let msg = {
                    let mut recv = self.recv.lock().await;
                    recv.recv().await
                };

                let Some(msg) = msg else {
                    break;
                };

                if self.sender.send(msg).await.is_err() {
                    debug!(worker = self.id, "relay output closed downstream");
                    break;
                }

                relayed += 1;
                trace!(worker = self.id, relayed, "relayed");
            }

            debug!(worker = self.id, relayed, "relay finished");
        })
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relays_in_order_and_closes() {
        let (in_tx, in_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);

        let handle = Context::new(0, share(in_rx), out_tx).run();

        for v in [5i64, 1, 9] {
            in_tx.send(v).await.unwrap();
        }
        drop(in_tx);

        let mut got = vec![];
        while let Some(v) = out_rx.recv().await {
            got.push(v);
        }
        handle.await.unwrap();

        assert_eq!(got, vec![5, 1, 9]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn competing_workers_deliver_each_value_once() {
        let (in_tx, in_rx) = mpsc::channel(1);
        let input = share(in_rx);

        let mut outs = vec![];
        let mut handles = vec![];
        for id in 0..3 {
            let (tx, rx) = mpsc::channel(1);
            handles.push(Context::new(id, input.clone(), tx).run());
            outs.push(rx);
        }
        drop(input);

        let feeder = tokio::spawn(async move {
            for v in 0..50i64 {
                in_tx.send(v).await.unwrap();
            }
        });

        let drains: Vec<_> = outs
            .into_iter()
            .map(|mut rx| tokio::spawn(async move {
                let mut got = vec![];
                while let Some(v) = rx.recv().await {
                    got.push(v);
                }
                got
            }))
            .collect();

        feeder.await.unwrap();

        let mut all = vec![];
        for d in drains {
            let got = d.await.unwrap();

            // each worker keeps the relative order of what it received
            assert!(got.windows(2).all(|w| w[0] < w[1]));
            all.extend(got);
        }
        for h in handles {
            h.await.unwrap();
        }

        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn empty_input_closes_output() {
        let (in_tx, in_rx) = mpsc::channel::<i64>(1);
        let (out_tx, mut out_rx) = mpsc::channel(1);
        drop(in_tx);

        Context::new(0, share(in_rx), out_tx).run().await.unwrap();
        assert_eq!(out_rx.recv().await, None);
    }
}
