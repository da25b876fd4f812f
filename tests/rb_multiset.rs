mod common;

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rbtree_core::{FnCompare, RbMultiSet};

/// The number of operations to perform in each proptest case.
const TEST_SIZE: usize = 5_000;

/// Generates values from a small range so that duplicates are common.
fn value_strategy() -> impl Strategy<Value = i16> {
    -200i16..200i16
}

/// A multiset modeled as value -> multiplicity.
#[derive(Debug, Default)]
struct Model(BTreeMap<i16, usize>);

impl Model {
    fn insert(&mut self, v: i16) {
        *self.0.entry(v).or_insert(0) += 1;
    }

    fn remove_one(&mut self, v: i16) -> bool {
        match self.0.get(&v).copied() {
            Some(1) => {
                self.0.remove(&v);
                true
            }
            Some(n) => {
                self.0.insert(v, n - 1);
                true
            }
            None => false,
        }
    }

    fn remove_all(&mut self, v: i16) -> usize {
        self.0.remove(&v).unwrap_or(0)
    }

    fn count(&self, v: i16) -> usize {
        self.0.get(&v).copied().unwrap_or(0)
    }

    fn len(&self) -> usize {
        self.0.values().sum()
    }

    fn pop_first(&mut self) -> Option<i16> {
        let v = *self.0.keys().next()?;
        self.remove_one(v);
        Some(v)
    }

    fn pop_last(&mut self) -> Option<i16> {
        let v = *self.0.keys().next_back()?;
        self.remove_one(v);
        Some(v)
    }

    fn flatten(&self) -> Vec<i16> {
        self.0.iter().flat_map(|(&v, &n)| std::iter::repeat_n(v, n)).collect()
    }
}

#[derive(Debug, Clone)]
enum MultiSetOp {
    Insert(i16),
    RemoveOne(i16),
    RemoveAll(i16),
    Count(i16),
    PopFirst,
    PopLast,
}

fn op_strategy() -> impl Strategy<Value = MultiSetOp> {
    prop_oneof![
        6 => value_strategy().prop_map(MultiSetOp::Insert),
        3 => value_strategy().prop_map(MultiSetOp::RemoveOne),
        1 => value_strategy().prop_map(MultiSetOp::RemoveAll),
        2 => value_strategy().prop_map(MultiSetOp::Count),
        1 => Just(MultiSetOp::PopFirst),
        1 => Just(MultiSetOp::PopLast),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// Replays a random sequence of operations against a counting model.
    #[test]
    fn multiset_ops_match_model(ops in proptest::collection::vec(op_strategy(), TEST_SIZE)) {
        common::init_tracing();
        let mut rb_set: RbMultiSet<i16> = RbMultiSet::new();
        let mut model = Model::default();

        for op in &ops {
            match op {
                MultiSetOp::Insert(v) => {
                    rb_set.insert(*v);
                    model.insert(*v);
                }
                MultiSetOp::RemoveOne(v) => {
                    prop_assert_eq!(rb_set.remove_one(v), model.remove_one(*v), "remove_one({})", v);
                }
                MultiSetOp::RemoveAll(v) => {
                    prop_assert_eq!(rb_set.remove_all(v), model.remove_all(*v), "remove_all({})", v);
                }
                MultiSetOp::Count(v) => {
                    prop_assert_eq!(rb_set.count(v), model.count(*v), "count({})", v);
                    prop_assert_eq!(rb_set.contains(v), model.count(*v) > 0, "contains({})", v);
                }
                MultiSetOp::PopFirst => {
                    prop_assert_eq!(rb_set.pop_first(), model.pop_first(), "pop_first()");
                }
                MultiSetOp::PopLast => {
                    prop_assert_eq!(rb_set.pop_last(), model.pop_last(), "pop_last()");
                }
            }
            prop_assert_eq!(rb_set.len(), model.len());
        }

        prop_assert_eq!(rb_set.iter().copied().collect::<Vec<_>>(), model.flatten());
    }

    /// Tests range queries include every copy of the bounding values.
    #[test]
    fn range_includes_duplicates(
        values in proptest::collection::vec(value_strategy(), 0..2_000),
        lo in value_strategy(),
        hi in value_strategy(),
    ) {
        let rb_set: RbMultiSet<i16> = values.iter().copied().collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();

        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let expected: Vec<_> = sorted.iter().copied().filter(|v| (lo..=hi).contains(v)).collect();
        prop_assert_eq!(rb_set.range(lo..=hi).copied().collect::<Vec<_>>(), expected.clone());

        let mut reversed = expected;
        reversed.reverse();
        prop_assert_eq!(rb_set.range(lo..=hi).rev().copied().collect::<Vec<_>>(), reversed);
    }
}

#[test]
fn stable_order_for_equivalent_elements() {
    // Ordered by the first field only; the second records arrival.
    let mut set = RbMultiSet::with_compare(FnCompare(|a: &(char, u32), b: &(char, u32)| a.0 < b.0));
    for (i, c) in "abracadabra".chars().enumerate() {
        set.insert((c, u32::try_from(i).unwrap()));
    }
    let a_arrivals: Vec<u32> = set.iter().filter(|(c, _)| *c == 'a').map(|(_, i)| *i).collect();
    assert_eq!(a_arrivals, vec![0, 3, 5, 7, 10]);
    assert_eq!(set.count(&('a', 0)), 5);

    // Removing one copy takes the earliest arrival.
    assert!(set.remove_one(&('a', 99)));
    assert_eq!(set.first(), Some(&('a', 3)));
    assert_eq!(set.last(), Some(&('r', 9)));
}

#[test]
fn clone_and_equality() {
    let set = RbMultiSet::from([3, 1, 3, 2]);
    let copy = set.clone();
    assert_eq!(copy, set);
    assert_eq!(format!("{copy:?}"), "{1, 2, 3, 3}");
    assert_eq!(copy.into_iter().collect::<Vec<_>>(), vec![1, 2, 3, 3]);
}
