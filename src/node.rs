use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The tables an entity of the graph can come from
///
/// [Table::FareZone] is not a file of the feed: it groups the stops that share a `zone_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Table {
    Agency,
    Route,
    Trip,
    Stop,
    Calendar,
    Shape,
    FareAttribute,
    FareZone,
    Level,
    Pathway,
}

impl Table {
    pub const ALL: [Table; 10] = [
        Table::Agency,
        Table::Route,
        Table::Trip,
        Table::Stop,
        Table::Calendar,
        Table::Shape,
        Table::FareAttribute,
        Table::FareZone,
        Table::Level,
        Table::Pathway,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Table::Agency => "agency.txt",
            Table::Route => "routes.txt",
            Table::Trip => "trips.txt",
            Table::Stop => "stops.txt",
            Table::Calendar => "calendar.txt",
            Table::Shape => "shapes.txt",
            Table::FareAttribute => "fare_attributes.txt",
            Table::FareZone => "farezone",
            Table::Level => "levels.txt",
            Table::Pathway => "pathways.txt",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

impl FromStr for Table {
    type Err = Error;

    /// Accepts the file name with or without its `.txt` extension
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_suffix(".txt").unwrap_or(name);
        Table::ALL
            .iter()
            .copied()
            .find(|t| t.file_name().trim_end_matches(".txt") == name)
            .ok_or_else(|| Error::UnknownTable(s.to_owned()))
    }
}

impl TryFrom<String> for Table {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Table> for &'static str {
    fn from(t: Table) -> Self {
        t.file_name()
    }
}

/// Identity of one entity of the feed: the table it comes from and its id
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Node {
    pub table: Table,
    pub id: String,
}

impl Node {
    pub fn new(table: Table, id: impl Into<String>) -> Self {
        Self {
            table,
            id: id.into(),
        }
    }

    pub fn key(&self) -> NodeKey<'_> {
        NodeKey {
            table: self.table,
            id: &self.id,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.id)
    }
}

/// Borrowed form of a [Node], used to look nodes up without allocating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey<'a> {
    pub table: Table,
    pub id: &'a str,
}

impl<'a> NodeKey<'a> {
    pub fn new(table: Table, id: &'a str) -> Self {
        Self { table, id }
    }

    pub fn to_node(self) -> Node {
        Node::new(self.table, self.id)
    }
}
