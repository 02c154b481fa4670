use crate::feed_graph::{FeedGraph, NodeId};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow the children: what depends on the seeds
    Down,
    /// Follow the parents: what the seeds depend on
    Up,
}

/// Breadth first search over a [FeedGraph]
///
/// The state belongs to the search, the graph is only read: several searches can run on the same graph.
pub struct Search<'g> {
    graph: &'g FeedGraph,
    direction: Direction,
    visited: Vec<bool>,
    queue: VecDeque<NodeId>,
}

impl<'g> Search<'g> {
    pub fn new(graph: &'g FeedGraph, direction: Direction) -> Self {
        Self {
            graph,
            direction,
            visited: vec![false; graph.node_count()],
            queue: VecDeque::new(),
        }
    }

    /// The search will neither visit nor go through these nodes
    pub fn block(&mut self, nodes: impl IntoIterator<Item = NodeId>) -> &mut Self {
        for node in nodes {
            self.visited[node.index()] = true;
        }
        self
    }

    /// Calls `visit` once for every node reachable from the seeds, seeds included
    pub fn run(&mut self, seeds: impl IntoIterator<Item = NodeId>, mut visit: impl FnMut(NodeId)) {
        for seed in seeds {
            self.enqueue(seed);
        }
        let graph = self.graph;
        while let Some(node) = self.queue.pop_front() {
            visit(node);
            let next = match self.direction {
                Direction::Down => graph.children(node),
                Direction::Up => graph.parents(node),
            };
            for &n in next {
                self.enqueue(n);
            }
        }
    }

    fn enqueue(&mut self, node: NodeId) {
        let visited = &mut self.visited[node.index()];
        if !*visited {
            *visited = true;
            self.queue.push_back(node);
        }
    }
}

pub fn search(
    graph: &FeedGraph,
    seeds: impl IntoIterator<Item = NodeId>,
    direction: Direction,
    visit: impl FnMut(NodeId),
) {
    Search::new(graph, direction).run(seeds, visit)
}

/// Every node reachable from the seeds in the given direction, seeds included
pub fn closure(
    graph: &FeedGraph,
    seeds: impl IntoIterator<Item = NodeId>,
    direction: Direction,
) -> FxHashSet<NodeId> {
    let mut reached = FxHashSet::default();
    search(graph, seeds, direction, |node| {
        reached.insert(node);
    });
    reached
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeKey, Table};

    // a -> b -> c -> a, c -> d
    fn cycle() -> (FeedGraph, Vec<NodeId>) {
        let mut graph = FeedGraph::new();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| graph.intern(NodeKey::new(Table::Stop, id)))
            .collect();
        graph.link(ids[0], ids[1]);
        graph.link(ids[1], ids[2]);
        graph.link(ids[2], ids[0]);
        graph.link(ids[2], ids[3]);
        (graph, ids)
    }

    #[test]
    fn terminates_on_cycles() {
        let (graph, ids) = cycle();
        let mut order = Vec::new();
        search(&graph, [ids[0]], Direction::Down, |n| order.push(n));
        assert_eq!(ids, order);

        let up = closure(&graph, [ids[3]], Direction::Up);
        assert_eq!(4, up.len());
        let up = closure(&graph, [ids[0]], Direction::Up);
        assert!(!up.contains(&ids[3]));
    }

    #[test]
    fn blocked_nodes_are_barriers() {
        let (graph, ids) = cycle();
        let mut reached = Vec::new();
        Search::new(&graph, Direction::Down)
            .block([ids[2]])
            .run([ids[0], ids[2]], |n| reached.push(n));
        assert_eq!(vec![ids[0], ids[1]], reached);
    }

    #[test]
    fn no_seed_visits_nothing() {
        let (graph, _) = cycle();
        assert!(closure(&graph, [], Direction::Down).is_empty());
    }
}
