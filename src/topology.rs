use async_trait::async_trait;
use tokio::sync::mpsc::channel;
use tracing::{debug, info, warn};

use crate::{
    aggregator,
    barrier::start_join_barrier,
    collector::{drain_results, Report},
    config::PipelineConfig,
    error::PipelineError,
    producer::{self, Observer},
    relay,
    tally::{Tally, TallyBoard},
};




/// Observer the producer actually runs: keeps the tally used for
/// verification and forwards to the caller's observer
struct Tee<O> {
    tally: Tally,
    inner: O,
}

#[async_trait]
impl<O> Observer for Tee<O>
where
    O: Observer
{
    async fn observe(&mut self, value: i64) {
        self.tally.record(value);
        self.inner.observe(value).await;
    }
}



/// producer -> relay x N -> aggregator x N -> barrier -> collector
///
/// ```text
///             /  relay-0 -> aggregator-0  \
/// producer  ---  relay-1 -> aggregator-1  ---  results -> collector
///             \  relay-N -> aggregator-N  /
/// ```
///
/// Every stage runs on its own task, the caller is the collector.
/// Returns the report together with the observer, handed back by the
/// producer once it finished.
pub async fn run_pipeline<O>(config: PipelineConfig, observer: O) -> Result<(Report, O), PipelineError>
where
    O: Observer + 'static
{
    config.validate()?;

    debug!(?config, "starting pipeline");


    let (prod_tx, prod_rx) = channel(config.buffer_size);
    let (results_tx, results_rx) = channel(config.results_buffer());
    let (board, slots) = TallyBoard::partition(config.workers);

    let shared_input = relay::share(prod_rx);


    // 1. one relay + aggregator pair per worker slot
    //
    let mut aggregators = Vec::with_capacity(config.workers);

    for slot in slots {
        let (relay_tx, relay_rx) = channel(config.buffer_size);

        relay::Context::new(slot.index(), shared_input.clone(), relay_tx).run();

        aggregators.push(aggregator::Context::new(relay_rx, slot, results_tx.clone()).run());
    }

    // only relays may hold the producer's receiver
    drop(shared_input);


    // 2. barrier takes the last results sender
    //
    let barrier = start_join_barrier(aggregators, results_tx);


    // 3. producer
    //
    let producer = producer::Context::new(prod_tx,
                                          config.sequence_len,
                                          config.deadline,
                                          Tee { tally: Tally::default(), inner: observer }).run();


    // 4. collect: results close only after the producer closed its queue
    //    and every stage behind it drained
    //
    let results_sum = drain_results(results_rx).await;
    barrier.await??;
    let tee = producer.await?;

    let report = Report::new(tee.tally, results_sum, board.snapshot(), config.sequence_len);
    Ok((report, tee.inner))
}



/// Run once, hand the report to `on_report` before it is verified
pub async fn run_and_verify<F>(config: PipelineConfig, on_report: F) -> Result<Report, PipelineError>
where
    F: FnOnce(&Report)
{
    let (report, _) = run_pipeline(config, |_: i64| {}).await?;
    report_then_verify(report, on_report)
}


/// The report is handed out whatever the verification outcome
fn report_then_verify<F>(report: Report, on_report: F) -> Result<Report, PipelineError>
where
    F: FnOnce(&Report)
{
    if report.truncated {
        warn!(emitted = report.input.count, "deadline truncated the sequence");
    }

    info!(input = %report.input, output = %report.output, "pipeline finished");
    on_report(&report);

    report.verify()?;
    Ok(report)
}



/// Run `runs` times, untruncated runs must all end on the same totals
pub async fn run_repeated<F>(config: PipelineConfig, runs: usize, mut on_report: F) -> Result<Vec<Report>, PipelineError>
where
    F: FnMut(usize, &Report)
{
    let mut reports = Vec::with_capacity(runs);
    let mut baseline: Option<Tally> = None;

    for run in 0..runs {
        let report = run_and_verify(config, |r| on_report(run, r)).await?;
        debug!(run, "run verified");

        if !report.truncated {
            match baseline {
                Some(first) if first != report.output => {
                    return Err(PipelineError::RunsDiverged { first, later: report.output });
                }
                Some(_) => {}
                None => baseline = Some(report.output),
            }
        }

        reports.push(report);
    }

    Ok(reports)
}
