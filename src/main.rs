use anyhow::Context;
use clap::Parser;
use gtfs_extract::{BoundingBox, EntityRef, Marker, Selection};
use gtfs_structures::GtfsReader;
use log::info;
use std::path::PathBuf;

/// Lists the entities of a GTFS feed needed to extract a selection of it
#[derive(Parser, Debug)]
#[command(name = "gtfs-extract", version)]
struct Cli {
    /// GTFS feed, a directory or a zip archive
    feed: PathBuf,

    /// Entity to extract, with what depends on it and what it needs
    #[arg(long, value_name = "TABLE:ID")]
    include: Vec<EntityRef>,

    /// Entity to leave out, with everything depending on it
    #[arg(long, value_name = "TABLE:ID")]
    exclude: Vec<EntityRef>,

    /// Extract the stops inside this box
    #[arg(long, value_name = "MIN_LON,MIN_LAT,MAX_LON,MAX_LAT", allow_hyphen_values = true)]
    bbox: Option<BoundingBox>,

    /// JSON file with the selection, completed by the other options
    #[arg(long, value_name = "FILE")]
    selection: Option<PathBuf>,

    /// Print the marked entities as JSON instead of a count per table
    #[arg(long)]
    json: bool,

    /// Do not trim the fields of the CSV files
    #[arg(long)]
    no_trim: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut selection = match &cli.selection {
        Some(path) => Selection::from_json_file(path)
            .with_context(|| format!("Could not load the selection {}", path.display()))?,
        None => Selection::default(),
    };
    selection.include.extend(cli.include);
    selection.exclude.extend(cli.exclude);
    if let Some(bbox) = cli.bbox {
        selection.bbox = Some(bbox);
    }
    if selection.is_empty() {
        anyhow::bail!("Nothing to extract, use --include, --bbox or --selection");
    }

    let mut feed = GtfsReader::default()
        .trim_fields(!cli.no_trim)
        .stream(&cli.feed)
        .with_context(|| format!("Could not open the feed {}", cli.feed.display()))?;

    let mut marker = Marker::new(selection);
    marker
        .filter(&mut feed)
        .with_context(|| format!("Could not extract from {}", cli.feed.display()))?;
    info!("Extraction done");

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&marker.marked_nodes())?);
    } else {
        for (table, count) in marker.count_by_table() {
            println!("{table}\t{count}");
        }
        println!("total\t{}", marker.marked_count());
    }
    Ok(())
}
