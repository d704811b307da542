use std::collections::HashSet;
use std::path::PathBuf;

use super::*;
use crate::assets::loader::SyntheticLoader;

fn configs(n: usize, images: usize, animations: usize) -> Vec<ThemeConfig> {
    (0..n)
        .map(|t| ThemeConfig {
            name: format!("t{t}"),
            image_path: (0..images)
                .map(|i| PathBuf::from(format!("t{t}/img{i}.png")))
                .collect(),
            animation_path: (0..animations)
                .map(|i| PathBuf::from(format!("t{t}/anim{i}.gif")))
                .collect(),
            font_path: vec![],
            text_line: vec![format!("line from t{t}")],
        })
        .collect()
}

fn system(image_cache_size: usize, switch_cooldown: u32, seed: u64) -> SystemConfig {
    SystemConfig {
        image_cache_size,
        switch_cooldown,
        seed: Some(seed),
        ..SystemConfig::default()
    }
}

fn bank(n: usize, image_cache_size: usize, seed: u64) -> ThemeBank {
    ThemeBank::new(
        &configs(n, 8, 1),
        &system(image_cache_size, 3, seed),
        Arc::new(SyntheticLoader::new(1)),
    )
}

fn settle(bank: &mut ThemeBank) {
    for _ in 0..10_000 {
        let s = bank.slots();
        let prev_ok = s.prev.is_none_or(|p| bank.theme(p).all_loaded());
        let next_ok = s.next.is_none_or(|n| bank.theme(n).all_loaded());
        if prev_ok && next_ok && bank.cooldown() == 0 {
            return;
        }
        bank.async_update();
    }
    panic!("bank never settled: {bank:?}");
}

fn distinct(s: Slots) -> bool {
    let mut all = vec![s.a, s.b];
    all.extend(s.next);
    all.extend(s.prev);
    let uniq: HashSet<usize> = all.iter().copied().collect();
    uniq.len() == all.len()
}

#[test]
fn zero_themes_synthesize_two_defaults() {
    let mut bank = ThemeBank::new(&[], &system(10, 1, 1), Arc::new(SyntheticLoader::default()));
    assert_eq!(bank.theme_count(), 2);
    assert_eq!(bank.theme(0).name(), "default");
    assert!(bank.get(true).get_image().is_empty());
    assert!(bank.change_themes());
}

#[test]
fn one_theme_becomes_two_independent_caches() {
    let bank = ThemeBank::new(
        &configs(1, 8, 0),
        &system(10, 1, 2),
        Arc::new(SyntheticLoader::new(1)),
    );
    assert_eq!(bank.theme_count(), 2);
    assert!(!std::ptr::eq(bank.theme(0), bank.theme(1)));
    for i in 0..2 {
        assert_eq!(bank.theme(i).target_load(), 5);
        assert_eq!(bank.theme(i).loaded(), 5);
    }
    assert!(!bank.theme(0).get_image().ptr_eq(&bank.theme(1).get_image()));
}

#[test]
fn two_themes_swap_labels_only() {
    let mut bank = bank(2, 10, 3);
    assert_eq!(
        bank.slots(),
        Slots {
            a: 0,
            b: 1,
            next: None,
            prev: None
        }
    );
    for i in 0..2 {
        assert_eq!(bank.theme(i).target_load(), 5);
        assert!(bank.theme(i).all_loaded());
    }

    assert!(std::ptr::eq(bank.get(true), bank.theme(0)));
    assert!(std::ptr::eq(bank.get(false), bank.theme(1)));
    for round in 1..=4 {
        assert!(bank.change_themes());
        let s = bank.slots();
        let flipped = round % 2 == 1;
        assert_eq!((s.a, s.b), if flipped { (1, 0) } else { (0, 1) });
        assert_eq!(bank.theme(0).loaded(), 5);
    }
}

#[test]
fn three_themes_stay_loaded_and_rotate_with_period_three() {
    for seed in 0..10 {
        let mut bank = bank(3, 12, seed);
        for i in 0..3 {
            assert_eq!(bank.theme(i).target_load(), 4);
            assert_eq!(bank.theme(i).loaded(), 4);
        }
        let start = bank.slots();
        assert!(start.next.is_some());
        assert!(start.prev.is_none());
        assert!(distinct(start));

        let mut seen = Vec::new();
        for _ in 0..3 {
            assert!(bank.change_themes());
            assert!(distinct(bank.slots()));
            seen.push(bank.slots());
        }
        assert_eq!(bank.slots(), start, "seed {seed}");
        assert_eq!(seen[0].a, start.b);
        assert_eq!(seen[0].b, start.next.unwrap());
        assert_eq!(seen[0].next, Some(start.a));
    }
}

#[test]
fn five_themes_bootstrap_and_gate_switches() {
    for seed in 0..10 {
        let mut bank = bank(5, 9, seed);
        let s = bank.slots();
        let (next, prev) = (s.next.unwrap(), s.prev.unwrap());
        assert!(distinct(s), "seed {seed}: {s:?}");

        for i in [s.a, s.b] {
            assert_eq!(bank.theme(i).target_load(), 3);
            assert!(bank.theme(i).all_loaded());
            assert_eq!(bank.theme(i).loaded(), 3);
        }
        assert_eq!(bank.theme(next).target_load(), 3);
        assert_eq!(bank.theme(next).loaded(), 0);
        let smallest_free = (0..5).find(|i| ![s.a, s.b, next].contains(i)).unwrap();
        assert_eq!(prev, smallest_free);
        assert_eq!(bank.theme(prev).target_load(), 0);

        let cooldown = bank.cooldown();
        assert!(!bank.change_themes());
        assert_eq!(bank.slots(), s);
        assert_eq!(bank.cooldown(), cooldown);

        settle(&mut bank);
        assert!(bank.theme(next).all_loaded());
        assert!(bank.change_themes());

        let after = bank.slots();
        assert!(distinct(after), "seed {seed}: {after:?}");
        assert_eq!(after.prev, Some(s.a));
        assert_eq!(after.a, s.b);
        assert_eq!(after.b, next);
        assert_eq!(bank.theme(s.a).target_load(), 0);
        assert_eq!(bank.theme(after.next.unwrap()).target_load(), 3);
    }
}

#[test]
fn rolling_switch_drains_prev_and_fills_next() {
    let mut bank = bank(4, 9, 7);
    settle(&mut bank);
    assert!(bank.change_themes());
    let s = bank.slots();
    let (next, prev) = (s.next.unwrap(), s.prev.unwrap());
    assert!(bank.theme(prev).loaded() > 0);

    settle(&mut bank);
    assert_eq!(bank.theme(prev).loaded(), 0);
    assert!(!bank.theme(prev).animation_loaded());
    assert_eq!(bank.theme(next).loaded(), 3);
    assert!(bank.change_themes());
}

#[test]
fn cooldown_swallows_switch_cooldown_minus_one_ticks() {
    let mut bank = ThemeBank::new(
        &configs(2, 4, 0),
        &system(4, 5, 1),
        Arc::new(SyntheticLoader::new(1)),
    );
    while bank.async_update() == UpdateOutcome::CoolingDown {}

    assert!(bank.change_themes());
    for _ in 0..4 {
        assert_eq!(bank.async_update(), UpdateOutcome::CoolingDown);
    }
    assert_eq!(bank.async_update(), UpdateOutcome::Maintained);
}

#[test]
fn zero_cooldown_never_debounces() {
    let mut bank = ThemeBank::new(
        &configs(2, 4, 0),
        &system(4, 0, 1),
        Arc::new(SyntheticLoader::new(1)),
    );
    assert_eq!(bank.async_update(), UpdateOutcome::Maintained);
    assert!(bank.change_themes());
    assert_eq!(bank.async_update(), UpdateOutcome::Maintained);
}

#[test]
fn periodic_swaps_keep_pair_at_target() {
    let mut bank = ThemeBank::new(
        &configs(3, 10, 0),
        &SystemConfig {
            swap_interval: 2,
            ..system(12, 0, 4)
        },
        Arc::new(SyntheticLoader::new(1)),
    );
    for _ in 0..50 {
        assert_eq!(bank.async_update(), UpdateOutcome::Maintained);
    }
    for i in 0..3 {
        assert_eq!(bank.theme(i).loaded(), 4);
    }
}

#[test]
fn subscribers_receive_new_pairs() {
    let mut bank = bank(3, 12, 5);
    let mut rx = bank.subscribe();
    assert_eq!(rx.pair().generation(), 0);
    assert!(!rx.refresh());
    assert!(std::ptr::eq(rx.get(true), bank.get(true)));

    assert!(bank.change_themes());
    assert!(bank.change_themes());
    assert!(rx.refresh());
    assert_eq!(rx.pair().generation(), 2);
    assert!(std::ptr::eq(rx.get(true), bank.get(true)));
    assert!(std::ptr::eq(rx.get(false), bank.get(false)));

    drop(rx);
    assert!(bank.change_themes());
}

#[test]
fn catch_up_counts_every_switch_since_last_read() {
    let mut bank = bank(2, 10, 6);
    let mut rx = bank.subscribe();
    assert_eq!(rx.catch_up(), 0);

    for _ in 0..3 {
        assert!(bank.change_themes());
    }
    assert_eq!(rx.catch_up(), 3);
    assert_eq!(rx.pair().generation(), 3);
    assert_eq!(rx.catch_up(), 0);

    assert!(bank.change_themes());
    assert_eq!(rx.catch_up(), 1);
}

#[test]
fn maybe_upload_next_touches_only_rolling_banks() {
    let bank3 = bank(3, 12, 1);
    bank3.maybe_upload_next();

    let mut bank5 = bank(5, 9, 1);
    bank5.maybe_upload_next();
    settle(&mut bank5);
    let next = bank5.slots().next.unwrap();
    assert!(bank5.theme(next).loaded() > 0);
    bank5.maybe_upload_next();
}

#[test]
fn from_config_validates() {
    let mut cfg = ShowConfig {
        themes: configs(2, 2, 0),
        system: system(4, 1, 1),
    };
    cfg.system.swap_interval = 0;
    assert!(ThemeBank::from_config(&cfg, Arc::new(SyntheticLoader::default())).is_err());
    cfg.system.swap_interval = 3;
    let bank = ThemeBank::from_config(&cfg, Arc::new(SyntheticLoader::default())).unwrap();
    assert_eq!(bank.per_slot_target(), 2);
}
