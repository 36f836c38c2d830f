use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tokio_fanout::{run_repeated, PipelineConfig, BUFFER_SIZE, DEADLINE, SEQUENCE_LEN, WORKERS};



#[derive(Parser)]
#[command(name = "tokio_fanout")]
#[command(about = "Fan a deadline-bound integer sequence out to workers and verify it fans back in intact")]
#[command(version)]
struct Cli {
    /// Number of values the producer emits (0..len)
    #[arg(long, default_value_t = SEQUENCE_LEN)]
    len: usize,

    /// Number of relay workers
    #[arg(short, long, default_value_t = WORKERS)]
    workers: usize,

    /// Producer deadline in microseconds
    #[arg(short, long, default_value_t = DEADLINE.as_micros() as u64)]
    deadline_us: u64,

    /// Capacity of the producer and relay queues
    #[arg(short, long, default_value_t = BUFFER_SIZE)]
    buffer: usize,

    /// Run the pipeline this many times
    #[arg(short, long, default_value_t = 1)]
    runs: usize,
}


fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(tracing::Level::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}


#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    let config = PipelineConfig::default()
        .with_sequence_len(cli.len)
        .with_workers(cli.workers)
        .with_deadline(Duration::from_micros(cli.deadline_us))
        .with_buffer_size(cli.buffer);

    // anyhow reports a failure once and sets a non-zero exit status
    run_repeated(config, cli.runs, |run, report| {
        if cli.runs > 1 {
            println!("run {}", run + 1);
        }
        println!("{report}");
    })
    .await?;

    Ok(())
}
