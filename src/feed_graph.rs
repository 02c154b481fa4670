use crate::edge_rules::{self, Contribution};
use crate::error::Error;
use crate::node::{Node, NodeKey, Table};
use crate::selection::BoundingBox;
use gtfs_structures::FeedReader;
use id_arena::{Arena, Id};
use rstar::primitives::GeomWithData;
use rstar::{RTree, AABB};
use rustc_hash::{FxHashMap, FxHashSet};

pub type NodeId = Id<Node>;

type StopLocation = GeomWithData<[f64; 2], NodeId>;

/// Dependency graph between the entities of one feed
///
/// An edge `a -> b` means that `b` references `a`: `b` is a child of `a` and `a` is a parent of `b`.
/// Following children finds what depends on an entity, following parents finds what it needs.
pub struct FeedGraph {
    nodes: Arena<Node>,
    // table -> entity id -> node
    index: FxHashMap<Table, FxHashMap<String, NodeId>>,
    children: Vec<Vec<NodeId>>,
    parents: Vec<Vec<NodeId>>,
    edges: FxHashSet<(NodeId, NodeId)>,
    stop_locations: RTree<StopLocation>,
}

impl Default for FeedGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedGraph {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            index: FxHashMap::default(),
            children: Vec::new(),
            parents: Vec::new(),
            edges: FxHashSet::default(),
            stop_locations: RTree::new(),
        }
    }

    /// Builds the graph with a single pass over every table of the feed
    pub fn build<R: FeedReader + ?Sized>(reader: &mut R) -> Result<Self, Error> {
        edge_rules::build_graph(reader)
    }

    /// Returns the node of `(table, id)`, adding it if it is not known yet
    pub fn intern(&mut self, key: NodeKey<'_>) -> NodeId {
        if let Some(id) = self.get(key) {
            return id;
        }
        let id = self.nodes.alloc(key.to_node());
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        self.index
            .entry(key.table)
            .or_default()
            .insert(key.id.to_owned(), id);
        id
    }

    pub fn get(&self, key: NodeKey<'_>) -> Option<NodeId> {
        self.index.get(&key.table)?.get(key.id).copied()
    }

    /// Adds the edge `from -> to` if both ends are known
    ///
    /// References to entities that were never interned are dropped, as are duplicated edges.
    /// Returns true if a new edge was added.
    pub fn add_edge(&mut self, from: NodeKey<'_>, to: NodeKey<'_>) -> bool {
        match (self.get(from), self.get(to)) {
            (Some(from), Some(to)) => self.link(from, to),
            _ => false,
        }
    }

    pub(crate) fn link(&mut self, from: NodeId, to: NodeId) -> bool {
        if !self.edges.insert((from, to)) {
            return false;
        }
        self.children[from.index()].push(to);
        self.parents[to.index()].push(from);
        true
    }

    pub(crate) fn apply(&mut self, contribution: &Contribution<'_>) {
        for node in &contribution.nodes {
            self.intern(*node);
        }
        for (from, to) in &contribution.edges {
            self.add_edge(*from, *to);
        }
    }

    pub(crate) fn index_stop_locations(&mut self, points: Vec<([f64; 2], NodeId)>) {
        let locations = points
            .into_iter()
            .map(|(point, node)| GeomWithData::new(point, node))
            .collect();
        self.stop_locations = RTree::bulk_load(locations);
    }

    /// Stops located inside the box, bounds included
    pub fn stops_within<'a>(&'a self, bbox: &BoundingBox) -> impl Iterator<Item = NodeId> + 'a {
        let bbox = *bbox;
        let envelope = AABB::from_corners(bbox.lower_corner(), bbox.upper_corner());
        self.stop_locations
            .locate_in_envelope(&envelope)
            .map(move |location| {
                debug_assert!(bbox.contains(*location.geom()));
                location.data
            })
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Entities referencing `id`
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id.index()]
    }

    /// Entities referenced by `id`
    pub fn parents(&self, id: NodeId) -> &[NodeId] {
        &self.parents[id.index()]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
