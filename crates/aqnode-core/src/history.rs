//! Rolling reading history
//!
//! A [`HistorySeries`] is a fixed-capacity circular store of the most recent
//! integer readings of one quantity. Its capacity is chosen once, from the
//! display width, so that each stored sample maps to exactly one pixel column
//! of the graph.

use alloc::boxed::Box;
use alloc::vec;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

/// Value range a series is plotted against, plus threshold metadata
///
/// `max > min` is a precondition of everything that scales against the
/// range. `warn` and `alarm` are carried for threshold colouring and are not
/// consulted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRange {
    /// Value drawn at the bottom of the graph
    pub min: i32,
    /// Value drawn at the top of the graph
    pub max: i32,
    /// Level at which readings become a concern
    pub warn: i32,
    /// Level at which readings become harmful
    pub alarm: i32,
}

impl SeriesRange {
    pub const fn new(min: i32, max: i32, warn: i32, alarm: i32) -> Self {
        Self {
            min,
            max,
            warn,
            alarm,
        }
    }

    /// Whether the range can be scaled against (`max > min`)
    pub const fn is_valid(&self) -> bool {
        self.max > self.min
    }

    /// Pin a value into `[min, max]`
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Width of the range in value units
    pub const fn span(&self) -> i64 {
        self.max as i64 - self.min as i64
    }
}

/// Errors raised when creating a history series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// A series needs at least one slot
    #[error("history capacity must be greater than zero")]
    ZeroCapacity,
}

/// Fixed-capacity ring of readings with a most-recent cursor
///
/// Writing advances the cursor and overwrites the oldest slot; entries are
/// never shifted. Before the first write the cursor points at slot 0, which
/// reads as zero.
#[derive(Debug, Clone)]
pub struct HistorySeries {
    label: &'static str,
    samples: Box<[i32]>,
    cursor: usize,
    range: SeriesRange,
}

impl HistorySeries {
    /// Allocate a series with `capacity` zeroed slots.
    ///
    /// `capacity` should be the pixel width of the display the series is
    /// drawn on. The sample buffer is allocated here once and never resized.
    ///
    /// `range.max > range.min` is a precondition (checked in debug builds).
    pub fn new(
        label: &'static str,
        capacity: usize,
        range: SeriesRange,
    ) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        debug_assert!(range.is_valid(), "series range max must exceed min");

        Ok(Self {
            label,
            samples: vec![0; capacity].into_boxed_slice(),
            cursor: 0,
            range,
        })
    }

    /// Store a new reading in the slot after the cursor.
    pub fn record(&mut self, value: i32) {
        let capacity = self.samples.len();
        let next = (self.cursor + 1) % capacity;
        if let Some(slot) = self.samples.get_mut(next) {
            *slot = value;
            self.cursor = next;
        }
    }

    /// The reading under the cursor
    pub fn most_recent(&self) -> i32 {
        self.samples.get(self.cursor).copied().unwrap_or_default()
    }

    /// The reading `age` writes before the most recent one (0 = newest).
    ///
    /// Ages wrap around the ring, so `age == capacity` is the newest again.
    pub fn sample_at(&self, age: usize) -> i32 {
        let capacity = self.samples.len();
        let index = (self.cursor + capacity - age % capacity) % capacity;
        self.samples.get(index).copied().unwrap_or_default()
    }

    /// Every slot from newest to oldest
    pub fn iter_newest_first(&self) -> impl Iterator<Item = i32> + '_ {
        (0..self.samples.len()).map(move |age| self.sample_at(age))
    }

    /// Raw slot layout, in storage order
    pub fn slots(&self) -> &[i32] {
        &self.samples
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn range(&self) -> &SeriesRange {
        &self.range
    }
}
