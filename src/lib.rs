

/// trait Observer & deadline-bound producer
mod producer;

/// relay workers, competing consumers on one shared queue
mod relay;

/// per-worker count & sum
mod aggregator;

/// join barrier & results queue closer
mod barrier;

/// final collector & verifier
mod collector;


/// syncing components
mod topology;


mod config;
mod error;
mod tally;





pub use async_trait::async_trait;

pub use producer::Observer;

pub use tally::Tally;

pub use collector::Report;

pub use error::PipelineError;


pub use config::{

    PipelineConfig,

    SEQUENCE_LEN,
    MAX_SEQUENCE_LEN,
    WORKERS,
    DEADLINE,
    BUFFER_SIZE

};


pub use topology::{
    run_pipeline,
    run_and_verify,
    run_repeated
};
