use crate::closure::{closure, Direction, Search};
use crate::edge_rules::build_graph;
use crate::error::Error;
use crate::feed_graph::{FeedGraph, NodeId};
use crate::node::{Node, NodeKey, Table};
use crate::selection::{EntityRef, Selection};
use gtfs_structures::FeedReader;
use log::{info, warn};
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;

/// Finds the entities of a feed that belong to the extract of a [Selection]
///
/// ```
/// use gtfs_extract::{Marker, Selection, Table};
///
/// let mut feed = gtfs_structures::GtfsReader::default().stream("fixtures/extract")?;
/// let mut marker = Marker::new(Selection::default().include(Table::Agency, "OK"));
/// marker.filter(&mut feed)?;
/// assert!(marker.is_marked("routes.txt", "OK1"));
/// assert!(!marker.is_marked("routes.txt", "DTA1"));
/// # Ok::<(), gtfs_extract::Error>(())
/// ```
pub struct Marker {
    selection: Selection,
    graph: Option<FeedGraph>,
    included: FxHashSet<NodeId>,
}

impl Marker {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            graph: None,
            included: FxHashSet::default(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Reads the whole feed and computes the entities to keep
    ///
    /// On error, nothing is marked.
    pub fn filter<R: FeedReader + ?Sized>(&mut self, reader: &mut R) -> Result<(), Error> {
        self.graph = None;
        self.included.clear();

        let graph = build_graph(reader)?;
        self.included = mark(&graph, &self.selection)?;
        self.graph = Some(graph);
        Ok(())
    }

    /// Should the entity be copied in the extract
    ///
    /// An empty id is an absent reference, which is always kept.
    pub fn is_marked(&self, table: &str, id: &str) -> bool {
        if id.is_empty() {
            return true;
        }
        self.lookup(table, id)
            .map_or(false, |node| self.included.contains(&node))
    }

    /// Is the entity known by the graph of the feed
    pub fn is_visited(&self, table: &str, id: &str) -> bool {
        self.lookup(table, id).is_some()
    }

    fn lookup(&self, table: &str, id: &str) -> Option<NodeId> {
        let table = table.parse::<Table>().ok()?;
        self.graph.as_ref()?.get(NodeKey::new(table, id))
    }

    pub fn graph(&self) -> Option<&FeedGraph> {
        self.graph.as_ref()
    }

    pub fn marked_count(&self) -> usize {
        self.included.len()
    }

    /// The marked entities, sorted by table then id
    pub fn marked_nodes(&self) -> Vec<&Node> {
        let Some(graph) = &self.graph else {
            return Vec::new();
        };
        let mut nodes: Vec<&Node> = self.included.iter().map(|id| graph.node(*id)).collect();
        nodes.sort();
        nodes
    }

    pub fn count_by_table(&self) -> BTreeMap<Table, usize> {
        let mut counts = BTreeMap::new();
        if let Some(graph) = &self.graph {
            for id in &self.included {
                *counts.entry(graph.node(*id).table).or_default() += 1;
            }
        }
        counts
    }
}

fn resolve(graph: &FeedGraph, entities: &[EntityRef]) -> Result<Vec<NodeId>, Error> {
    entities
        .iter()
        .map(|entity| {
            graph.get(entity.key()).ok_or_else(|| Error::UnknownEntity {
                table: entity.table,
                id: entity.id.clone(),
            })
        })
        .collect()
}

/// Computes the entities needed by the selection
///
/// Starting from the included entities and the stops inside the box, it collects
/// everything that depends on them, then everything these entities depend on.
/// The excluded entities, and everything depending on them, are never entered.
pub fn mark(graph: &FeedGraph, selection: &Selection) -> Result<FxHashSet<NodeId>, Error> {
    let mut seeds = resolve(graph, &selection.include)?;
    if let Some(bbox) = &selection.bbox {
        bbox.validate()?;
        let before = seeds.len();
        seeds.extend(graph.stops_within(bbox));
        if seeds.len() == before {
            warn!("No stop inside the bounding box {}", bbox);
        }
    }
    let excluded = resolve(graph, &selection.exclude)?;
    info!(
        "{} entities selected, {} excluded",
        seeds.len(),
        excluded.len()
    );

    let barrier = closure(graph, excluded, Direction::Down);

    let mut dependents = Vec::new();
    Search::new(graph, Direction::Down)
        .block(barrier.iter().copied())
        .run(seeds, |node| dependents.push(node));

    let mut included: FxHashSet<NodeId> = dependents.iter().copied().collect();
    Search::new(graph, Direction::Up)
        .block(barrier.iter().copied())
        .run(dependents, |node| {
            included.insert(node);
        });

    info!("{} entities marked", included.len());
    Ok(included)
}
