//! Traversal helpers over [`Graph`].
//!
//! Every helper visits nodes in insertion order and successors in edge insertion order, so
//! results are reproducible for identical inputs.

use crate::Graph;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    /// Nodes that could not be ordered, in insertion order.
    pub remaining: Vec<String>,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "graph has a cycle through {} node(s)", self.remaining.len())
    }
}

impl std::error::Error for CycleError {}

pub fn preorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    fn dfs<N, E, G>(g: &Graph<N, E, G>, v: &str, visited: &mut HashSet<String>, out: &mut Vec<String>)
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        if !visited.insert(v.to_string()) {
            return;
        }
        out.push(v.to_string());
        for w in g.successors(v) {
            dfs(g, w, visited, out);
        }
    }

    let mut visited: HashSet<String> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for r in roots {
        if g.has_node(r) {
            dfs(g, r, &mut visited, &mut out);
        }
    }
    out
}

pub fn postorder<N, E, G>(g: &Graph<N, E, G>, roots: &[&str]) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    fn dfs<N, E, G>(g: &Graph<N, E, G>, v: &str, visited: &mut HashSet<String>, out: &mut Vec<String>)
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        if !visited.insert(v.to_string()) {
            return;
        }
        for w in g.successors(v) {
            dfs(g, w, visited, out);
        }
        out.push(v.to_string());
    }

    let mut visited: HashSet<String> = HashSet::default();
    let mut out: Vec<String> = Vec::new();
    for r in roots {
        if g.has_node(r) {
            dfs(g, r, &mut visited, &mut out);
        }
    }
    out
}

/// Weakly-connected components found by depth-first traversal.
///
/// Components are listed in the order of their first node; nodes inside a component follow
/// the traversal order starting from that node.
pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut seen: HashSet<String> = HashSet::default();
    let mut out: Vec<Vec<String>> = Vec::new();

    for start in g.nodes() {
        if seen.contains(start) {
            continue;
        }
        let mut comp: Vec<String> = Vec::new();
        let mut stack: Vec<String> = vec![start.to_string()];
        while let Some(v) = stack.pop() {
            if !seen.insert(v.clone()) {
                continue;
            }
            // Push in reverse so the first neighbor is visited first.
            let mut next: Vec<&str> = g.neighbors(&v);
            next.retain(|n| !seen.contains(*n));
            for n in next.into_iter().rev() {
                stack.push(n.to_string());
            }
            comp.push(v);
        }
        out.push(comp);
    }

    out
}

/// Kahn topological sort. Fails if any node sits on a cycle.
pub fn topsort<N, E, G>(g: &Graph<N, E, G>) -> Result<Vec<String>, CycleError>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let (order, remaining) = kahn(g, false);
    if remaining.is_empty() {
        Ok(order)
    } else {
        Err(CycleError { remaining })
    }
}

/// Topological order that always covers every node.
///
/// Whenever the queue runs dry while nodes remain (a cycle), the earliest-inserted remaining
/// node is released as if its incoming edges did not exist. The result is a total order that
/// agrees with every edge not on a cycle.
pub fn topsort_breaking_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<String>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    kahn(g, true).0
}

fn kahn<N, E, G>(g: &Graph<N, E, G>, break_cycles: bool) -> (Vec<String>, Vec<String>)
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    let mut indegree: HashMap<&str, usize> = g.nodes().map(|v| (v, 0)).collect();
    for e in g.edges() {
        if e.is_self_loop() {
            continue;
        }
        if let Some(d) = indegree.get_mut(e.w.as_str()) {
            *d += 1;
        }
    }

    let mut done: HashSet<&str> = HashSet::default();
    let mut queue: VecDeque<&str> = g
        .nodes()
        .filter(|v| indegree.get(v).copied().unwrap_or(0) == 0)
        .collect();
    let mut order: Vec<String> = Vec::with_capacity(g.node_count());

    loop {
        while let Some(v) = queue.pop_front() {
            if !done.insert(v) {
                continue;
            }
            order.push(v.to_string());
            for e in g.out_edges(v, None) {
                if e.is_self_loop() {
                    continue;
                }
                let Some((w, d)) = indegree.get_key_value(e.w.as_str()).map(|(k, d)| (*k, *d))
                else {
                    continue;
                };
                let d = d.saturating_sub(1);
                indegree.insert(w, d);
                if d == 0 && !done.contains(w) {
                    queue.push_back(w);
                }
            }
        }

        if order.len() == g.node_count() || !break_cycles {
            break;
        }
        let Some(next) = g.nodes().find(|v| !done.contains(v)) else {
            break;
        };
        indegree.insert(next, 0);
        queue.push_back(next);
    }

    let remaining: Vec<String> = g
        .nodes()
        .filter(|v| !done.contains(v))
        .map(str::to_string)
        .collect();
    (order, remaining)
}

pub fn is_acyclic<N, E, G>(g: &Graph<N, E, G>) -> bool
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    topsort(g).is_ok()
}

/// Strongly connected components of size > 1, plus self-loops (Tarjan).
pub fn find_cycles<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    struct Tarjan<'a, N, E, G>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        g: &'a Graph<N, E, G>,
        index: usize,
        stack: Vec<String>,
        on_stack: BTreeSet<String>,
        indices: BTreeMap<String, usize>,
        lowlink: BTreeMap<String, usize>,
        sccs: Vec<Vec<String>>,
    }

    impl<N, E, G> Tarjan<'_, N, E, G>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        fn low(&self, v: &str) -> usize {
            self.lowlink.get(v).copied().unwrap_or(usize::MAX)
        }

        fn strongconnect(&mut self, v: &str) {
            self.indices.insert(v.to_string(), self.index);
            self.lowlink.insert(v.to_string(), self.index);
            self.index += 1;
            self.stack.push(v.to_string());
            self.on_stack.insert(v.to_string());

            for w in self.g.successors(v) {
                if !self.indices.contains_key(w) {
                    self.strongconnect(w);
                    let next = self.low(v).min(self.low(w));
                    self.lowlink.insert(v.to_string(), next);
                } else if self.on_stack.contains(w) {
                    let w_idx = self.indices.get(w).copied().unwrap_or(usize::MAX);
                    let next = self.low(v).min(w_idx);
                    self.lowlink.insert(v.to_string(), next);
                }
            }

            if Some(self.low(v)) == self.indices.get(v).copied() {
                let mut scc: Vec<String> = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(&w);
                    let is_root = w == v;
                    scc.push(w);
                    if is_root {
                        break;
                    }
                }
                self.sccs.push(scc);
            }
        }
    }

    let mut tarjan = Tarjan {
        g,
        index: 0,
        stack: Vec::new(),
        on_stack: BTreeSet::new(),
        indices: BTreeMap::new(),
        lowlink: BTreeMap::new(),
        sccs: Vec::new(),
    };

    for v in g.nodes() {
        if !tarjan.indices.contains_key(v) {
            tarjan.strongconnect(v);
        }
    }

    let mut cycles: Vec<Vec<String>> = Vec::new();
    for mut scc in tarjan.sccs {
        if scc.len() > 1 {
            scc.sort_by_key(|v| g.node_position(v).unwrap_or(usize::MAX));
            cycles.push(scc);
        } else if g.has_edge(&scc[0], &scc[0], None) || !g.out_edges(&scc[0], Some(&scc[0])).is_empty() {
            cycles.push(scc);
        }
    }

    cycles.sort_by_key(|c| c.first().and_then(|v| g.node_position(v)));
    cycles
}
