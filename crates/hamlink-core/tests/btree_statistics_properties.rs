//! Property-based tests for `BtreeStatistics`.
//!
//! Tests verify the fast-track and page-capacity invariants hold across
//! arbitrary sequences of find/insert/erase outcomes, not just the fixed
//! examples in the unit tests alongside the implementation.

use hamlink_core::BtreeStatistics;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    FindHit(u64),
    FindMiss,
    InsertHit { page: u64, slot: u32, count: u32, rightmost: bool, leftmost: bool },
    InsertMiss,
    EraseHit(u64),
    EraseMiss,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..8).prop_map(Op::FindHit),
        Just(Op::FindMiss),
        (0u64..8, 0u32..16, 1u32..16, any::<bool>(), any::<bool>())
            .prop_map(|(page, slot, count, rightmost, leftmost)| Op::InsertHit {
                page,
                slot: slot % count,
                count,
                rightmost,
                leftmost,
            }),
        Just(Op::InsertMiss),
        (0u64..8).prop_map(Op::EraseHit),
        Just(Op::EraseMiss),
    ]
}

fn apply(stats: &mut BtreeStatistics, op: &Op) {
    match *op {
        Op::FindHit(page) => stats.find_succeeded(page),
        Op::FindMiss => stats.find_failed(),
        Op::InsertHit { page, slot, count, rightmost, leftmost } => {
            stats.insert_succeeded(page, slot, count, rightmost, leftmost);
        },
        Op::InsertMiss => stats.insert_failed(),
        Op::EraseHit(page) => stats.erase_succeeded(page),
        Op::EraseMiss => stats.erase_failed(),
    }
}

proptest! {
    /// A fast-track hint only ever points at a page that registered at least
    /// one find hit in the sequence — never a page it never touched.
    #[test]
    fn find_hint_page_was_actually_hit(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let mut stats = BtreeStatistics::new();
        let mut any_find_hit = false;
        for op in &ops {
            if matches!(op, Op::FindHit(_)) {
                any_find_hit = true;
            }
            apply(&mut stats, op);
        }
        let hints = stats.get_find_hints();
        if hints.try_fast_track {
            prop_assert!(any_find_hit);
        }
    }

    /// Resetting the exact page a fast-track hint points at always clears
    /// it, regardless of what sequence of operations produced that hint.
    #[test]
    fn reset_page_breaks_a_fast_track_pointing_at_it(ops in prop::collection::vec(op_strategy(), 1..32)) {
        let mut stats = BtreeStatistics::new();
        for op in &ops {
            apply(&mut stats, op);
        }
        let hints = stats.get_find_hints();
        if hints.try_fast_track {
            stats.reset_page(hints.leaf_page_addr);
            prop_assert!(!stats.get_find_hints().try_fast_track);
        }
    }

    /// The default page capacity is always the floor of the mean of at most
    /// the last five observed capacities, never above the largest of them.
    #[test]
    fn default_page_capacity_never_exceeds_the_largest_recent_sample(
        samples in prop::collection::vec(1u32..10_000, 1..20)
    ) {
        let mut stats = BtreeStatistics::new();
        for &sample in &samples {
            stats.set_page_capacity(sample);
        }
        let window_len = samples.len().min(5);
        let max_recent = samples[samples.len() - window_len..].iter().copied().max().unwrap_or(0);
        prop_assert!(stats.get_default_page_capacity() <= max_recent);
    }
}
