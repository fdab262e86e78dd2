mod common;

use std::collections::{BTreeMap, BTreeSet};

use covdelta::error::Mismatch;
use covdelta::merge::{consolidate, merge_results};
use covdelta::model::{Branches, Entry, RunResult, ShardSet, Stats};
use covdelta::stats::{coverage_of, to_stats};
use proptest::prelude::*;

/// Per-file shape shared by every shard of one revision: which lines are
/// executable and which outcomes each branch has.
type Layout = BTreeMap<String, (Vec<bool>, BTreeMap<String, BTreeSet<String>>)>;

fn layout() -> impl Strategy<Value = Layout> {
    prop::collection::btree_map(
        "[a-e]\\.rb",
        (
            prop::collection::vec(any::<bool>(), 0..8),
            prop::collection::btree_map(
                "br[0-3]",
                prop::collection::btree_set("out[0-3]", 1..4),
                0..3,
            ),
        ),
        1..5,
    )
}

/// A shard compatible with `layout`: any subset of files, any counts, with
/// or without branch data per file.
fn shard(layout: &Layout) -> BoxedStrategy<RunResult> {
    let files: Vec<BoxedStrategy<Option<(String, Entry)>>> = layout
        .iter()
        .map(|(path, (mask, branch_layout))| {
            let outcomes: usize = branch_layout.values().map(BTreeSet::len).sum();
            let path = path.clone();
            let mask = mask.clone();
            let branch_layout = branch_layout.clone();
            (
                any::<bool>(),
                prop::collection::vec(0u64..5, mask.len()),
                any::<bool>(),
                prop::collection::vec(0u64..5, outcomes),
            )
                .prop_map(move |(present, counts, with_branches, branch_counts)| {
                    if !present {
                        return None;
                    }
                    let lines = mask
                        .iter()
                        .zip(counts)
                        .map(|(&exec, n)| exec.then_some(n))
                        .collect();
                    let branches = with_branches.then(|| {
                        let mut counts = branch_counts.into_iter();
                        branch_layout
                            .iter()
                            .map(|(branch, outs)| {
                                let outs = outs
                                    .iter()
                                    .map(|o| (o.clone(), counts.next().unwrap_or(0)))
                                    .collect();
                                (branch.clone(), outs)
                            })
                            .collect::<Branches>()
                    });
                    Some((path.clone(), Entry { lines, branches }))
                })
                .boxed()
        })
        .collect();

    (files, 0u32..1000)
        .prop_map(|(files, ts)| RunResult {
            coverage: files.into_iter().flatten().collect(),
            timestamp: f64::from(ts),
        })
        .boxed()
}

fn three_shards() -> impl Strategy<Value = (RunResult, RunResult, RunResult)> {
    layout().prop_flat_map(|l| (shard(&l), shard(&l), shard(&l)))
}

proptest! {
    #[test]
    fn prop_merge_is_commutative((a, b, _c) in three_shards()) {
        prop_assert_eq!(merge_results(&a, &b).unwrap(), merge_results(&b, &a).unwrap());
    }

    #[test]
    fn prop_merge_is_associative((a, b, c) in three_shards()) {
        let left = merge_results(&merge_results(&a, &b).unwrap(), &c).unwrap();
        let right = merge_results(&a, &merge_results(&b, &c).unwrap()).unwrap();
        let swapped = merge_results(&merge_results(&b, &a).unwrap(), &c).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(&left, &swapped);
    }

    #[test]
    fn prop_consolidate_ignores_shard_order((a, b, c) in three_shards()) {
        let ordered = ShardSet::from([
            ("1".to_string(), a.clone()),
            ("2".to_string(), b.clone()),
            ("3".to_string(), c.clone()),
        ]);
        let shuffled = ShardSet::from([("1".to_string(), c), ("2".to_string(), a), ("3".to_string(), b)]);
        prop_assert_eq!(consolidate(&ordered).unwrap(), consolidate(&shuffled).unwrap());
    }

    #[test]
    fn prop_merging_never_loses_executable_lines((a, b, _c) in three_shards()) {
        let merged = to_stats(&merge_results(&a, &b).unwrap());
        for (path, stats) in &merged.file_stats {
            for side in [&a, &b] {
                if let Some(entry) = side.coverage.get(path) {
                    let single = Stats::from_entry(entry);
                    prop_assert_eq!(single.lines, stats.lines);
                    prop_assert!(single.lines_covered <= stats.lines_covered);
                }
            }
        }
    }
}

#[test]
fn disjoint_shards_consolidate_to_union() {
    let rspec = common::result(&[("a.rb", vec![Some(1), None, Some(0)])], 100.0);
    let minitest = common::result(&[("b.rb", vec![Some(2), Some(2)])], 50.0);
    let shards = ShardSet::from([
        ("RSpec".to_string(), rspec.clone()),
        ("Minitest".to_string(), minitest.clone()),
    ]);

    let merged = consolidate(&shards).unwrap();
    assert_eq!(merged.timestamp, 100.0);
    assert_eq!(merged.coverage["a.rb"], rspec.coverage["a.rb"]);
    assert_eq!(merged.coverage["b.rb"], minitest.coverage["b.rb"]);

    let coverage = coverage_of(&shards).unwrap();
    assert_eq!(coverage.file_stats["a.rb"], to_stats(&rspec).file_stats["a.rb"]);
    assert_eq!(coverage.file_stats["b.rb"], to_stats(&minitest).file_stats["b.rb"]);
}

#[test]
fn overlapping_shards_sum_hits() {
    let shards = ShardSet::from([
        ("1".to_string(), common::result(&[("a.rb", vec![Some(3), Some(0), Some(1)])], 1.0)),
        ("2".to_string(), common::result(&[("a.rb", vec![Some(2), Some(1), Some(0)])], 2.0)),
    ]);

    let merged = consolidate(&shards).unwrap();
    assert_eq!(merged.coverage["a.rb"].lines, vec![Some(5), Some(1), Some(1)]);

    let coverage = to_stats(&merged);
    assert_eq!(coverage.total_stats.lines, 3);
    assert_eq!(coverage.total_stats.lines_covered, 3);
}

#[test]
fn shards_from_different_revisions_fail() {
    let shards = ShardSet::from([
        ("1".to_string(), common::result(&[("a.rb", vec![Some(1), None])], 1.0)),
        ("2".to_string(), common::result(&[("a.rb", vec![Some(2), Some(3)])], 2.0)),
    ]);

    let err = consolidate(&shards).unwrap_err();
    assert_eq!(err.file, "a.rb");
    assert_eq!(err.source, Mismatch::Executability { line: 2 });
    assert!(coverage_of(&shards).is_err());
}

#[test]
fn empty_shard_set_has_zero_totals() {
    let coverage = coverage_of(&ShardSet::new()).unwrap();
    assert!(coverage.file_stats.is_empty());
    assert_eq!(coverage.total_stats, Stats::default());
    assert!(!coverage.includes_branches);
}
