use std::sync::atomic::{AtomicUsize, Ordering};

use crate::foundation::rng::Rng64;

#[derive(Debug)]
struct Entry<T> {
    value: T,
    enabled: bool,
}

/// Ordered, cyclic collection of asset references with per-entry enabled state.
///
/// Filtered selection walks a fixed shuffled ring of indices, one cursor per filter value, so a
/// run of `next_index(f)` calls visits every matching entry once before any repeats. `next()`
/// ignores the flags and the shuffle and returns entries in their original order.
#[derive(Debug)]
pub struct PathCollection<T> {
    entries: Vec<Entry<T>>,
    ring: Vec<usize>,
    // [disabled, enabled]
    cursors: [usize; 2],
    enabled_count: usize,
    round_robin: AtomicUsize,
}

impl<T> PathCollection<T> {
    /// Build a collection with every entry enabled and a ring shuffled by `rng`.
    pub fn new(values: Vec<T>, rng: &Rng64) -> Self {
        let mut ring: Vec<usize> = (0..values.len()).collect();
        rng.shuffle(&mut ring);
        let enabled_count = values.len();
        Self {
            entries: values
                .into_iter()
                .map(|value| Entry {
                    value,
                    enabled: true,
                })
                .collect(),
            ring,
            cursors: [0, 0],
            enabled_count,
            round_robin: AtomicUsize::new(0),
        }
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the collection has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of currently enabled entries.
    pub fn enabled_count(&self) -> usize {
        self.enabled_count
    }

    /// Entry at `index`.
    pub fn get(&self, index: usize) -> &T {
        &self.entries[index].value
    }

    /// Enabled flag of the entry at `index`.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.entries[index].enabled
    }

    /// Next entry in plain round-robin order, `None` when empty.
    pub fn next(&self) -> Option<&T> {
        if self.entries.is_empty() {
            return None;
        }
        let i = self.round_robin.fetch_add(1, Ordering::Relaxed) % self.entries.len();
        Some(&self.entries[i].value)
    }

    /// Next index whose enabled flag equals `enabled`.
    ///
    /// Panics when no entry matches; callers gate on [`PathCollection::enabled_count`].
    pub fn next_index(&mut self, enabled: bool) -> usize {
        let matching = if enabled {
            self.enabled_count
        } else {
            self.entries.len() - self.enabled_count
        };
        assert!(
            matching > 0,
            "next_index(enabled = {enabled}) called with no matching entry"
        );

        let len = self.ring.len();
        let cursor = &mut self.cursors[usize::from(enabled)];
        loop {
            let index = self.ring[*cursor];
            *cursor = (*cursor + 1) % len;
            if self.entries[index].enabled == enabled {
                return index;
            }
        }
    }

    /// Set the enabled flag of exactly one entry.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        let entry = &mut self.entries[index];
        if entry.enabled == enabled {
            return;
        }
        entry.enabled = enabled;
        if enabled {
            self.enabled_count += 1;
        } else {
            self.enabled_count -= 1;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/show/paths.rs"]
mod tests;
