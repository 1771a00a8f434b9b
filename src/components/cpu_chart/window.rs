use std::fmt;

use crate::event::Sample;

/// Fixed-capacity rolling history of samples.
///
/// The window is always full: it starts as `capacity` zeros and every push
/// evicts the oldest sample, so the length never changes.
#[derive(Clone, PartialEq)]
pub struct SlidingWindow {
    data: Vec<Sample>,
    /// Index of the oldest sample.
    head: usize,
}

impl SlidingWindow {
    /// Creates a window of `capacity` zeros. A capacity of zero is raised to
    /// one.
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![Sample::default(); capacity.max(1)],
            head: 0,
        }
    }

    /// The startup state shown before any event arrives.
    pub fn initial(capacity: usize) -> Self {
        Self::new(capacity)
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Drops the oldest sample and appends `sample` as the newest.
    pub fn push(&mut self, sample: Sample) {
        self.data[self.head] = sample;
        self.head = (self.head + 1) % self.data.len();
    }

    /// Samples in chronological order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.data[self.head..].iter().chain(&self.data[..self.head])
    }

    pub fn snapshot(&self) -> Vec<Sample> {
        self.iter().copied().collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.iter().map(|s| s.value as f64).collect()
    }

    /// The newest sample.
    pub fn latest(&self) -> Sample {
        let newest = (self.head + self.data.len() - 1) % self.data.len();
        self.data[newest]
    }

    pub fn peak(&self) -> f32 {
        self.data.iter().map(|s| s.value).fold(0.0, f32::max)
    }
}

impl fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|s| s.value)).finish()
    }
}
