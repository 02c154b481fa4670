use crate::node::Table;
use std::path::PathBuf;
use thiserror::Error;

/// An error that can occur when extracting a subset of a GTFS feed
#[derive(Error, Debug)]
pub enum Error {
    /// A table of the feed could not be read
    #[error(transparent)]
    Stream(#[from] gtfs_structures::Error),
    /// An entity named by the selection does not exist in the feed
    #[error("entity not found: {table} '{id}'")]
    UnknownEntity { table: Table, id: String },
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),
    /// A selection token that is not of the form `table:id`
    #[error("invalid entity reference '{0}', expected table:id")]
    InvalidEntityRef(String),
    #[error("unknown table '{0}'")]
    UnknownTable(String),
    #[error("impossible to read the selection {path}")]
    SelectionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
