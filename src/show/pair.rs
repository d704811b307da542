use std::sync::{Arc, mpsc};

use crate::show::theme::Theme;

/// Immutable snapshot of the two displayed themes.
///
/// Taken by the controller after every successful switch and handed to readers, so the render
/// thread never touches the bank's live slot indices.
#[derive(Clone, Debug)]
pub struct ActivePair {
    generation: u64,
    a: Arc<Theme>,
    b: Arc<Theme>,
}

impl ActivePair {
    pub(crate) fn new(generation: u64, a: Arc<Theme>, b: Arc<Theme>) -> Self {
        Self { generation, a, b }
    }

    /// Number of successful switches before this snapshot was taken.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Theme at slot `a` when `alternate`, else slot `b`.
    pub fn get(&self, alternate: bool) -> &Theme {
        if alternate { &self.a } else { &self.b }
    }

    /// Shared handle to the theme returned by [`ActivePair::get`].
    pub fn get_arc(&self, alternate: bool) -> Arc<Theme> {
        Arc::clone(if alternate { &self.a } else { &self.b })
    }
}

/// Reader-side end of the active pair handoff.
pub struct PairReceiver {
    current: ActivePair,
    rx: mpsc::Receiver<ActivePair>,
}

impl PairReceiver {
    pub(crate) fn new(current: ActivePair, rx: mpsc::Receiver<ActivePair>) -> Self {
        Self { current, rx }
    }

    /// Adopt the newest published pair without blocking. Returns `true` if it changed.
    pub fn refresh(&mut self) -> bool {
        let mut changed = false;
        while let Ok(pair) = self.rx.try_recv() {
            self.current = pair;
            changed = true;
        }
        changed
    }

    /// Like [`PairReceiver::refresh`], but returns how many switches the newest pair is ahead
    /// of the previous one. Several switches published between calls all count.
    pub fn catch_up(&mut self) -> u64 {
        let before = self.current.generation;
        self.refresh();
        self.current.generation.saturating_sub(before)
    }

    /// Current snapshot.
    pub fn pair(&self) -> &ActivePair {
        &self.current
    }

    /// Shorthand for `pair().get(alternate)`.
    pub fn get(&self, alternate: bool) -> &Theme {
        self.current.get(alternate)
    }
}
