//! Candidate bundle generation: recursive greedy max-cut over pickup
//! proximity.
//!
//! Max-cut pushes spatially close pickups into the same side of each split,
//! so the cut tree yields O(n log n) spatially coherent groups instead of
//! every O(n choose k) combination. Proximate pairs and all singletons are
//! emitted on top, so no pending order is ever left without a candidate.

use std::collections::BTreeSet;

use bevy_ecs::prelude::Entity;

use crate::config::DispatchConfig;
use crate::dispatch::types::OrderView;
use crate::oracle::DistanceOracle;

/// Recursion limit for the cut tree.
const MAX_SPLIT_DEPTH: usize = 5;

/// Generate candidate order groups over `pending`, as index lists into
/// `pending`. Each group's size is in `[1, max_bundle_size]`; groups are
/// deduplicated by their unordered order-id set.
pub fn generate_bundles(
    pending: &[OrderView],
    oracle: &dyn DistanceOracle,
    cfg: &DispatchConfig,
) -> Vec<Vec<usize>> {
    if pending.is_empty() {
        return Vec::new();
    }
    let n = pending.len();

    // Pairwise pickup distances, computed once.
    let mut dist = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = oracle.distance_km(pending[i].pickup, pending[j].pickup);
            dist[i][j] = d;
            dist[j][i] = d;
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut seen: BTreeSet<Vec<Entity>> = BTreeSet::new();

    let all: Vec<usize> = (0..n).collect();
    split(&all, 0, &dist, pending, cfg, &mut groups, &mut seen);

    // Proximate pairs: make sure no good two-order bundle is missed.
    for i in 0..n {
        for j in (i + 1)..n {
            if dist[i][j] <= cfg.max_pickup_distance_km {
                push_group(vec![i, j], pending, &mut groups, &mut seen);
            }
        }
    }

    // Every order must appear at least as a singleton.
    for i in 0..n {
        push_group(vec![i], pending, &mut groups, &mut seen);
    }

    groups
}

fn split(
    group: &[usize],
    depth: usize,
    dist: &[Vec<f64>],
    pending: &[OrderView],
    cfg: &DispatchConfig,
    groups: &mut Vec<Vec<usize>>,
    seen: &mut BTreeSet<Vec<Entity>>,
) {
    if group.is_empty() {
        return;
    }
    if group.len() == 1 {
        push_group(group.to_vec(), pending, groups, seen);
        return;
    }
    if group.len() <= cfg.max_bundle_size {
        push_group(group.to_vec(), pending, groups, seen);
    }

    let (a, b) = greedy_max_cut(group, dist);
    if a.len() > 1 && a.len() <= cfg.max_bundle_size {
        push_group(a.clone(), pending, groups, seen);
    }
    if b.len() > 1 && b.len() <= cfg.max_bundle_size {
        push_group(b.clone(), pending, groups, seen);
    }

    if depth < MAX_SPLIT_DEPTH {
        if a.len() > cfg.max_bundle_size {
            split(&a, depth + 1, dist, pending, cfg, groups, seen);
        }
        if b.len() > cfg.max_bundle_size {
            split(&b, depth + 1, dist, pending, cfg, groups, seen);
        }
    }
}

/// Greedy 0.5-approximate max-cut: walk the group in input order and place
/// each order on the side it is farther from in total, so close pickups end
/// up together. Ties go to the first side.
fn greedy_max_cut(group: &[usize], dist: &[Vec<f64>]) -> (Vec<usize>, Vec<usize>) {
    let mut a: Vec<usize> = Vec::new();
    let mut b: Vec<usize> = Vec::new();
    for &idx in group {
        let to_a: f64 = a.iter().map(|&j| dist[idx][j]).sum();
        let to_b: f64 = b.iter().map(|&j| dist[idx][j]).sum();
        if to_a >= to_b {
            a.push(idx);
        } else {
            b.push(idx);
        }
    }
    (a, b)
}

fn push_group(
    group: Vec<usize>,
    pending: &[OrderView],
    groups: &mut Vec<Vec<usize>>,
    seen: &mut BTreeSet<Vec<Entity>>,
) {
    let mut key: Vec<Entity> = group.iter().map(|&i| pending[i].entity).collect();
    key.sort();
    if seen.insert(key) {
        groups.push(group);
    }
}
