//! Time-ordered queue of scheduled events.

use core::ops::Range;

use crate::event::{Event, FrameTime};

/// Events sorted by time. Consumed through a cursor so the per-frame drain
/// never shifts the vector; consumed events are dropped in [`compact`](Self::compact).
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    /// Next event index to process.
    cursor: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new(), cursor: 0 }
    }

    /// Insert keeping time order; equal times keep insertion order.
    pub fn push(&mut self, event: Event) {
        let pos = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(pos.max(self.cursor), event);
    }

    /// Index range of events at or before `time`, advancing the cursor past them.
    pub fn drain_until(&mut self, time: FrameTime) -> Range<usize> {
        let start = self.cursor;
        while self.cursor < self.events.len() && self.events[self.cursor].time <= time {
            self.cursor += 1;
        }
        start..self.cursor
    }

    /// Get an event by index (for use with `drain_until` ranges).
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Drop events already consumed.
    pub fn compact(&mut self) {
        self.events.drain(..self.cursor);
        self.cursor = 0;
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.cursor = 0;
    }

    /// Events not yet consumed.
    pub fn pending(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
