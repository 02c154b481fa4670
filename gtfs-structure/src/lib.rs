/*! The [General Transit Feed Specification](https://gtfs.org/) (GTFS) is a commonly used model to represent public transit data.

This crates brings [serde](https://serde.rs) structures of this model and helpers to stream GTFS files.

To get started, see [GtfsReader].

## What is GTFS

A Gtfs feed is a collection of CSV files (often bundled as a zip file).
Each file represents a collection of one type (stops, lines, etc.) that have relationships through unique identifiers.

## Design decisions

### Streaming first

Some tables are huge: `stop_times.txt` easily counts millions of rows.
The [FeedReader] trait exposes every table as a lazy sequence of rows, and [FeedSource]
deserializes them one by one from a directory or a zip archive, without loading the table.

[RawGtfs] holds every table in memory. It implements [FeedReader] as well, which is convenient for small feeds and tests.

### Only the relationships

The structures keep the identifiers and the references between objects, plus a few descriptive fields.
Columns that are not declared are ignored.

### Use of Enum

Many values are integers that are actually enumerations of certain values. We always use Rust enums, like [LocationType] to represent them, and not the integer value.

### Renaming

We kept some names even if they can be confusing (a [Calendar] will be referenced by `service_id`), but we strip the object type (`stop_name` is [Stop::name]).

*/
#![warn(missing_docs)]

#[macro_use]
extern crate derivative;
#[macro_use]
extern crate serde_derive;

mod enums;
pub mod error;
mod feed_reader;
mod gtfs_reader;
pub(crate) mod objects;
mod raw_gtfs;
mod serde_helpers;


pub use error::Error;
pub use feed_reader::{FeedReader, Rows};
pub use gtfs_reader::{FeedSource, GtfsReader, RawGtfsReader, ReadSeek, GTFS_FILES};
pub use objects::*;
pub use raw_gtfs::RawGtfs;
