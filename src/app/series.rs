//! Rolling per-metric history for the performance graphs

use std::collections::{HashMap, VecDeque};

use crate::constants::SERIES_CAPACITY;

/// The metrics that keep a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeriesKey {
    Cpu,
    Ram,
    DiskRead,
    DiskWrite,
    Upload,
    Download,
}

impl SeriesKey {
    pub const ALL: [SeriesKey; 6] = [
        SeriesKey::Cpu,
        SeriesKey::Ram,
        SeriesKey::DiskRead,
        SeriesKey::DiskWrite,
        SeriesKey::Upload,
        SeriesKey::Download,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SeriesKey::Cpu => "CPU %",
            SeriesKey::Ram => "RAM %",
            SeriesKey::DiskRead => "Disk Read KB/s",
            SeriesKey::DiskWrite => "Disk Write KB/s",
            SeriesKey::Upload => "Upload KB/s",
            SeriesKey::Download => "Download KB/s",
        }
    }
}

/// Fixed-capacity FIFO of samples, oldest first.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
    available: bool,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            available: true,
        }
    }

    /// Appends a sample, dropping the oldest once full.
    pub fn append(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
        self.available = true;
    }

    /// Flags the metric as unavailable without appending anything.
    pub fn mark_unavailable(&mut self) {
        self.available = false;
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Owned copy of the samples in insertion order.
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }
}

/// One buffer per `SeriesKey`, all empty at launch.
#[derive(Debug, Clone)]
pub struct SeriesSet {
    buffers: HashMap<SeriesKey, SeriesBuffer>,
}

impl SeriesSet {
    pub fn new() -> Self {
        Self::with_capacity(SERIES_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let buffers = SeriesKey::ALL
            .iter()
            .map(|key| (*key, SeriesBuffer::new(capacity)))
            .collect();
        Self { buffers }
    }

    pub fn append(&mut self, key: SeriesKey, value: f64) {
        if let Some(buffer) = self.buffers.get_mut(&key) {
            buffer.append(value);
        }
    }

    pub fn mark_unavailable(&mut self, key: SeriesKey) {
        if let Some(buffer) = self.buffers.get_mut(&key) {
            buffer.mark_unavailable();
        }
    }

    pub fn values(&self, key: SeriesKey) -> Vec<f64> {
        self.buffers.get(&key).map(SeriesBuffer::values).unwrap_or_default()
    }

    pub fn is_available(&self, key: SeriesKey) -> bool {
        self.buffers.get(&key).is_some_and(SeriesBuffer::is_available)
    }

    pub fn get(&self, key: SeriesKey) -> Option<&SeriesBuffer> {
        self.buffers.get(&key)
    }
}

impl Default for SeriesSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_keeps_most_recent_sixty() {
        let mut series = SeriesSet::new();
        for value in 1..=65 {
            series.append(SeriesKey::Cpu, f64::from(value));
        }
        let expected: Vec<f64> = (6..=65).map(f64::from).collect();
        assert_eq!(series.values(SeriesKey::Cpu), expected);
    }

    #[test]
    fn test_length_is_min_of_ticks_and_capacity() {
        let mut buffer = SeriesBuffer::new(SERIES_CAPACITY);
        for tick in 1..=SERIES_CAPACITY + 5 {
            buffer.append(tick as f64);
            assert_eq!(buffer.values().len(), tick.min(SERIES_CAPACITY));
        }
        assert_eq!(buffer.latest(), Some((SERIES_CAPACITY + 5) as f64));
    }

    #[test]
    fn test_unavailable_does_not_append() {
        let mut series = SeriesSet::new();
        series.append(SeriesKey::DiskRead, 3.0);
        series.mark_unavailable(SeriesKey::DiskRead);
        assert!(!series.is_available(SeriesKey::DiskRead));
        assert_eq!(series.values(SeriesKey::DiskRead), vec![3.0]);

        series.append(SeriesKey::DiskRead, 4.0);
        assert!(series.is_available(SeriesKey::DiskRead));
        assert_eq!(series.values(SeriesKey::DiskRead), vec![3.0, 4.0]);
    }

    #[test]
    fn test_values_are_an_owned_copy() {
        let mut series = SeriesSet::new();
        series.append(SeriesKey::Ram, 10.0);
        let mut copy = series.values(SeriesKey::Ram);
        copy.push(99.0);
        assert_eq!(series.values(SeriesKey::Ram), vec![10.0]);
    }
}
