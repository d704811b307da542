use std::sync::{Arc, mpsc};

use crate::{
    assets::loader::AssetLoader,
    config::{ShowConfig, SystemConfig, ThemeConfig},
    foundation::error::ThemeloopResult,
    foundation::rng::Rng64,
    show::pair::{ActivePair, PairReceiver},
    show::theme::Theme,
};

/// Result of one [`ThemeBank::async_update`] tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The tick was swallowed by the post-switch cooldown.
    CoolingDown,
    /// Normal maintenance ran.
    Maintained,
}

/// Public view of the slot indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slots {
    /// First displayed theme.
    pub a: usize,
    /// Second displayed theme.
    pub b: usize,
    /// Theme warming in; present with three or more themes.
    pub next: Option<usize>,
    /// Theme cooling out; present with four or more themes.
    pub prev: Option<usize>,
}

#[derive(Clone, Copy, Debug)]
enum Rotation {
    // Two themes: switching swaps a and b.
    Pair,
    // Three themes, all permanently loaded.
    Trio { next: usize },
    // Four or more: next fills while prev drains.
    Rolling { next: usize, prev: usize },
}

/// Owns every theme and decides which two are displayed.
///
/// All `&mut self` methods, and `get`/`maybe_upload_next`, belong to one controller context.
/// Other threads read through [`ThemeBank::subscribe`] snapshots.
pub struct ThemeBank {
    themes: Vec<Arc<Theme>>,
    image_cache_size: usize,
    switch_cooldown: u32,
    swap_interval: u32,
    cooldown: u32,
    updates: u32,
    a: usize,
    b: usize,
    rotation: Rotation,
    generation: u64,
    rng: Rng64,
    subscribers: Vec<mpsc::Sender<ActivePair>>,
}

impl std::fmt::Debug for ThemeBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThemeBank")
            .field("themes", &self.themes.len())
            .field("slots", &self.slots())
            .field("cooldown", &self.cooldown)
            .field("generation", &self.generation)
            .finish()
    }
}

impl ThemeBank {
    /// Validate `config` and build a bank from it.
    pub fn from_config(config: &ShowConfig, loader: Arc<dyn AssetLoader>) -> ThemeloopResult<Self> {
        config.validate()?;
        Ok(Self::new(&config.themes, &config.system, loader))
    }

    /// Build the bank and synchronously load the displayed themes.
    ///
    /// Zero themes synthesize one empty theme; a single theme is built twice from the same
    /// configuration so there are always at least two independent caches.
    #[tracing::instrument(skip_all, fields(themes = themes.len(), image_cache_size = system.image_cache_size))]
    pub fn new(themes: &[ThemeConfig], system: &SystemConfig, loader: Arc<dyn AssetLoader>) -> Self {
        let rng = Rng64::from_seed_or_entropy(system.seed);

        let mut configs = themes.to_vec();
        if configs.is_empty() {
            configs.push(ThemeConfig {
                name: "default".to_string(),
                ..ThemeConfig::default()
            });
        }
        if configs.len() == 1 {
            configs.push(configs[0].clone());
        }

        let themes: Vec<Arc<Theme>> = configs
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let name = if c.name.is_empty() {
                    format!("theme-{i}")
                } else {
                    c.name.clone()
                };
                Arc::new(Theme::new(name, c, Arc::clone(&loader), rng.fork()))
            })
            .collect();
        let n = themes.len();

        let mut bank = Self {
            themes,
            image_cache_size: system.image_cache_size,
            switch_cooldown: system.switch_cooldown,
            swap_interval: system.swap_interval,
            cooldown: 0,
            updates: 0,
            a: 0,
            b: 1,
            rotation: Rotation::Pair,
            generation: 0,
            rng,
            subscribers: Vec::new(),
        };
        bank.arm_cooldown();

        if n == 2 {
            let half = bank.image_cache_size / 2;
            for theme in &bank.themes {
                theme.set_target_load(half);
                theme.perform_all_loads();
            }
            tracing::info!(a = bank.a, b = bank.b, target = half, "theme bank ready");
            return bank;
        }

        let third = bank.image_cache_size / 3;
        let a = bank.rng.random(n);
        let b = bank.rng.random_excluding(n, a);
        let next = loop {
            let c = bank.rng.random_excluding(n, a);
            if c != b {
                break c;
            }
        };
        bank.a = a;
        bank.b = b;
        for i in [a, b, next] {
            bank.themes[i].set_target_load(third);
        }
        bank.themes[a].perform_all_loads();
        bank.themes[b].perform_all_loads();

        if n == 3 {
            bank.themes[next].perform_all_loads();
            bank.rotation = Rotation::Trio { next };
        } else {
            let prev = (0..n)
                .find(|i| ![a, b, next].contains(i))
                .unwrap_or_default();
            bank.rotation = Rotation::Rolling { next, prev };
        }
        tracing::info!(slots = ?bank.slots(), target = third, "theme bank ready");
        bank
    }

    /// Number of themes held (always at least two).
    pub fn theme_count(&self) -> usize {
        self.themes.len()
    }

    /// Theme by storage index.
    pub fn theme(&self, index: usize) -> &Theme {
        &self.themes[index]
    }

    /// Current slot assignment.
    pub fn slots(&self) -> Slots {
        let (next, prev) = match self.rotation {
            Rotation::Pair => (None, None),
            Rotation::Trio { next } => (Some(next), None),
            Rotation::Rolling { next, prev } => (Some(next), Some(prev)),
        };
        Slots {
            a: self.a,
            b: self.b,
            next,
            prev,
        }
    }

    /// Remaining cooldown ticks.
    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Stills budget the constructor and switches hand to each active slot.
    pub fn per_slot_target(&self) -> usize {
        match self.rotation {
            Rotation::Pair => self.image_cache_size / 2,
            _ => self.image_cache_size / 3,
        }
    }

    /// Displayed theme at slot `a` when `alternate`, else slot `b`.
    pub fn get(&self, alternate: bool) -> &Theme {
        if alternate {
            &self.themes[self.a]
        } else {
            &self.themes[self.b]
        }
    }

    /// Snapshot of the displayed pair.
    pub fn active_pair(&self) -> ActivePair {
        ActivePair::new(
            self.generation,
            Arc::clone(&self.themes[self.a]),
            Arc::clone(&self.themes[self.b]),
        )
    }

    /// Register a reader; it receives a new snapshot after every successful switch.
    pub fn subscribe(&mut self) -> PairReceiver {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        PairReceiver::new(self.active_pair(), rx)
    }

    /// Push one upload through the warming theme so the switch itself never pays for it.
    pub fn maybe_upload_next(&self) {
        if let Rotation::Rolling { next, .. } = self.rotation
            && self.themes[next].loaded() > 0
        {
            self.themes[next].get_image();
        }
    }

    /// Rotate the displayed themes.
    ///
    /// With four or more themes the switch is refused (returns `false`, nothing changes) until
    /// both the warming and the cooling theme have settled.
    pub fn change_themes(&mut self) -> bool {
        let n = self.themes.len();
        match self.rotation {
            Rotation::Pair => std::mem::swap(&mut self.a, &mut self.b),
            Rotation::Trio { next } => {
                let old_a = self.a;
                self.a = self.b;
                self.b = next;
                self.rotation = Rotation::Trio { next: old_a };
            }
            Rotation::Rolling { next, prev } => {
                if !self.themes[prev].all_loaded() || !self.themes[next].all_loaded() {
                    tracing::debug!(prev, next, "switch refused; themes still settling");
                    return false;
                }
                let new_prev = self.a;
                self.a = self.b;
                self.b = next;
                let new_next = loop {
                    let c = self.rng.random_excluding(n, new_prev);
                    if c != self.a && c != self.b {
                        break c;
                    }
                };
                self.themes[new_prev].set_target_load(0);
                self.themes[new_next].set_target_load(self.image_cache_size / 3);
                self.rotation = Rotation::Rolling {
                    next: new_next,
                    prev: new_prev,
                };
            }
        }

        self.arm_cooldown();
        self.generation += 1;
        tracing::debug!(slots = ?self.slots(), generation = self.generation, "switched themes");
        self.publish();
        true
    }

    /// One maintenance tick.
    pub fn async_update(&mut self) -> UpdateOutcome {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return UpdateOutcome::CoolingDown;
        }

        self.updates += 1;
        if self.updates > self.swap_interval {
            self.themes[self.a].perform_swap();
            self.themes[self.b].perform_swap();
            self.updates = 0;
        }
        match self.rotation {
            Rotation::Pair => {}
            Rotation::Trio { next } => {
                self.themes[next].perform_swap();
            }
            Rotation::Rolling { next, prev } => {
                self.themes[prev].perform_load();
                self.themes[next].perform_load();
            }
        }
        UpdateOutcome::Maintained
    }

    // The arming call counts as the first debounced tick.
    fn arm_cooldown(&mut self) {
        self.cooldown = self.switch_cooldown.saturating_sub(1);
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let pair = self.active_pair();
        self.subscribers.retain(|tx| tx.send(pair.clone()).is_ok());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/show/bank.rs"]
mod tests;
