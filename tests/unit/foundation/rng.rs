use super::*;

#[test]
fn same_seed_same_sequence() {
    let a = Rng64::new(7);
    let b = Rng64::new(7);
    for _ in 0..32 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn random_stays_in_range() {
    let rng = Rng64::new(1);
    for n in 1..20usize {
        for _ in 0..50 {
            assert!(rng.random(n) < n);
        }
    }
}

#[test]
fn random_excluding_never_returns_excluded() {
    let rng = Rng64::new(99);
    for n in 2..8usize {
        for x in 0..n {
            for _ in 0..50 {
                let v = rng.random_excluding(n, x);
                assert!(v < n);
                assert_ne!(v, x);
            }
        }
    }
}

#[test]
fn random_excluding_reaches_every_other_value() {
    let rng = Rng64::new(3);
    let mut seen = [false; 5];
    for _ in 0..500 {
        seen[rng.random_excluding(5, 2)] = true;
    }
    assert_eq!(seen, [true, true, false, true, true]);
}

#[test]
fn random_chance_edges() {
    let rng = Rng64::new(5);
    assert!((0..100).all(|_| rng.random_chance(1)));
    assert!((0..100).all(|_| !rng.random_chance(0)));
    let hits = (0..4000).filter(|_| rng.random_chance(4)).count();
    assert!((700..1300).contains(&hits), "hits={hits}");
}

#[test]
fn shuffle_is_a_permutation() {
    let rng = Rng64::new(11);
    let mut v: Vec<usize> = (0..32).collect();
    rng.shuffle(&mut v);
    let mut sorted = v.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..32).collect::<Vec<_>>());
}

#[test]
fn fork_diverges_from_parent() {
    let parent = Rng64::new(42);
    let child = parent.fork();
    assert_ne!(parent.next_u64(), child.next_u64());
}

#[test]
#[should_panic(expected = "requires n > 0")]
fn random_zero_panics() {
    Rng64::new(0).random(0);
}
