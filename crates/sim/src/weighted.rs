//! Cumulative-weight random selection shared by every table in the crate.

use rand::Rng;

/// Pick one item with probability proportional to `weight(item)`.
///
/// Draws `target` in `0..total`, walks the list accumulating weights and
/// returns the first item whose running total exceeds `target`. If the walk
/// somehow falls through, the last item is returned. `None` only for an empty
/// list or a zero total.
pub fn pick_by<'a, T, R>(items: &'a [T], weight: impl Fn(&T) -> u32, rng: &mut R) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    let total: u64 = items.iter().map(|item| u64::from(weight(item))).sum();
    if total == 0 {
        return None;
    }

    let target = rng.gen_range(0..total);
    let mut cumulative = 0u64;
    for item in items {
        cumulative += u64::from(weight(item));
        if target < cumulative {
            return Some(item);
        }
    }

    items.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_and_zero_weight_lists_pick_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [u32; 0] = [];
        assert!(pick_by(&empty, |w| *w, &mut rng).is_none());
        assert!(pick_by(&[0u32, 0], |w| *w, &mut rng).is_none());
    }

    #[test]
    fn zero_weight_entries_are_never_picked() {
        let mut rng = StdRng::seed_from_u64(2);
        let items = [("a", 0u32), ("b", 5), ("c", 0)];
        for _ in 0..500 {
            let picked = pick_by(&items, |(_, w)| *w, &mut rng).unwrap();
            assert_eq!(picked.0, "b");
        }
    }

    #[test]
    fn frequencies_follow_weights() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = [(0usize, 1u32), (1, 2), (2, 7)];
        let mut counts = [0u32; 3];
        let draws = 20_000;
        for _ in 0..draws {
            counts[pick_by(&items, |(_, w)| *w, &mut rng).unwrap().0] += 1;
        }
        let share = |i: usize| counts[i] as f64 / draws as f64;
        assert!((share(0) - 0.1).abs() < 0.015);
        assert!((share(1) - 0.2).abs() < 0.015);
        assert!((share(2) - 0.7).abs() < 0.015);
    }
}
