use std::{fmt, sync::{Arc, OnceLock}};

use async_trait::async_trait;

use crate::producer::Observer;



/// Running count and sum of the values seen by one stage
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub count: u64,
    pub sum: i64,
}

impl Tally {

    /// Sums stay in range while the sequence respects `MAX_SEQUENCE_LEN`
    #[inline]
    pub fn record(&mut self, value: i64) {
        self.count += 1;
        self.sum += value;
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(count {}, sum {})", self.count, self.sum)
    }
}


#[async_trait]
impl Observer for Tally {
    async fn observe(&mut self, value: i64) {
        self.record(value);
    }
}




// ------------------------------------------------------



/// Per-worker tallies, one slot per worker index.
///
/// Partitioning is static: slot `i` is written only through the
/// `SlotWriter` handed to aggregator `i`, and a writer is consumed by its
/// single write. No two tasks ever alias a slot, so the board carries no
/// lock. Reads are only meaningful once the join barrier has seen every
/// aggregator finish.
pub struct TallyBoard {
    slots: Arc<[OnceLock<Tally>]>,
}

pub struct SlotWriter {
    index: usize,
    slots: Arc<[OnceLock<Tally>]>,
}


impl TallyBoard {

    /// Build a board with `workers` slots and exactly one writer per slot
    pub fn partition(workers: usize) -> (TallyBoard, Vec<SlotWriter>) {
        let slots: Arc<[OnceLock<Tally>]> = (0..workers).map(|_| OnceLock::new()).collect();

        let writers = (0..workers)
            .map(|index| SlotWriter { index, slots: slots.clone() })
            .collect();

        (TallyBoard { slots }, writers)
    }

    /// Unwritten slots read as an empty tally
    pub fn snapshot(&self) -> Vec<Tally> {
        self.slots
            .iter()
            .map(|slot| slot.get().copied().unwrap_or_default())
            .collect()
    }
}


impl SlotWriter {

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn write(self, tally: Tally) {
        let res = self.slots[self.index].set(tally);
        debug_assert!(res.is_ok(), "slot {} written twice", self.index);
    }
}
