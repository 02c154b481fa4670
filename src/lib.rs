/*! Extracts a consistent subset of a GTFS feed.

The entities of the feed (agencies, routes, trips, stops, ...) and the references between them
are loaded in a [FeedGraph], built from a single pass over the tables of a
[gtfs_structures::FeedReader]. A [Marker] then computes, from a [Selection], every entity
that must be kept so that the extract has no dangling reference: what depends on the selected
entities, and what they depend on.
*/

pub mod closure;
pub mod edge_rules;
pub mod error;
pub mod feed_graph;
pub mod marker;
pub mod node;
pub mod selection;

#[cfg(test)]
mod tests;

pub use closure::{closure, search, Direction, Search};
pub use edge_rules::build_graph;
pub use error::Error;
pub use feed_graph::{FeedGraph, NodeId};
pub use marker::{mark, Marker};
pub use node::{Node, NodeKey, Table};
pub use selection::{BoundingBox, EntityRef, Selection};
