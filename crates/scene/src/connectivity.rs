//! Connectivity repair for the navigation graph.
//!
//! Two guarantees hold after [`repair`] for any scene with at least two
//! assets:
//! - every asset has at least one outgoing link,
//! - a forward breadth-first walk from asset 0 reaches every asset.
//!
//! The second check is forward reachability from asset 0 only. It is not
//! strong connectivity; an asset may be reachable without a path back.

use std::collections::{HashSet, VecDeque};

use crate::asset::Asset;
use crate::link::NavigationLink;

/// Links added by one repair pass, as `(from, to)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Added for assets that had no outgoing link.
    pub outgoing: Vec<(usize, usize)>,
    /// Added to chain forward-reachable components together.
    pub chained: Vec<(usize, usize)>,
}

impl RepairReport {
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.chained.is_empty()
    }

    pub fn added(&self) -> usize {
        self.outgoing.len() + self.chained.len()
    }
}

/// Forward adjacency list, deduplicated by `(from, to)` pair.
///
/// Neighbor order follows link order. Links with out-of-range endpoints are
/// ignored.
pub fn forward_adjacency(node_count: usize, links: &[NavigationLink]) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); node_count];
    let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(links.len());
    for link in links {
        if link.from_index >= node_count || link.to_index >= node_count {
            continue;
        }
        if seen.insert((link.from_index, link.to_index)) {
            adjacency[link.from_index].push(link.to_index);
        }
    }
    adjacency
}

/// Breadth-first visit order from `start` following forward edges.
pub fn reachable_from(start: usize, adjacency: &[Vec<usize>]) -> Vec<usize> {
    if start >= adjacency.len() {
        return Vec::new();
    }
    let mut visited = vec![false; adjacency.len()];
    let mut order = Vec::with_capacity(adjacency.len());
    let mut queue = VecDeque::new();

    visited[start] = true;
    queue.push_back(start);
    while let Some(node) = queue.pop_front() {
        order.push(node);
        for &next in &adjacency[node] {
            if !visited[next] {
                visited[next] = true;
                queue.push_back(next);
            }
        }
    }
    order
}

/// Splits the graph into forward-reachable components.
///
/// Component 0 is the breadth-first visit order from asset 0. Each remaining
/// component is rooted at the lowest unassigned index and holds the
/// unassigned assets reachable from that root, in depth-first discovery order.
/// The root is always first, so every member is reachable from it.
pub fn forward_components(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let node_count = adjacency.len();
    if node_count == 0 {
        return Vec::new();
    }

    let first = reachable_from(0, adjacency);
    let mut assigned = vec![false; node_count];
    for &node in &first {
        assigned[node] = true;
    }
    let mut components = vec![first];

    // Iterative DFS; the explicit stack keeps deep chains off the call stack.
    let mut stack: Vec<usize> = Vec::new();
    for root in 0..node_count {
        if assigned[root] {
            continue;
        }
        let mut component = Vec::new();
        assigned[root] = true;
        stack.push(root);
        while let Some(node) = stack.pop() {
            component.push(node);
            for &next in adjacency[node].iter().rev() {
                if !assigned[next] {
                    assigned[next] = true;
                    stack.push(next);
                }
            }
        }
        components.push(component);
    }
    components
}

/// Runs both repair phases over `links` in place.
///
/// Auto links are labelled with their target's title. No-op below two assets.
pub fn repair(assets: &[Asset], links: &mut Vec<NavigationLink>) -> RepairReport {
    let node_count = assets.len();
    let mut report = RepairReport::default();
    if node_count < 2 {
        return report;
    }

    let mut out_degree = vec![0usize; node_count];
    for link in links.iter() {
        if link.from_index < node_count && link.to_index < node_count {
            out_degree[link.from_index] += 1;
        }
    }
    for (from, degree) in out_degree.iter().enumerate() {
        if *degree == 0 {
            let to = (from + 1) % node_count;
            links.push(NavigationLink::auto(from, to, assets[to].title.clone()));
            report.outgoing.push((from, to));
        }
    }

    let adjacency = forward_adjacency(node_count, links);
    if reachable_from(0, &adjacency).len() == node_count {
        return report;
    }

    let components = forward_components(&adjacency);
    for pair in components.windows(2) {
        let (Some(&from), Some(&to)) = (pair[0].last(), pair[1].first()) else {
            continue;
        };
        links.push(NavigationLink::auto(from, to, assets[to].title.clone()));
        report.chained.push((from, to));
    }
    report
}
