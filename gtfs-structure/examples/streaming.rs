use gtfs_structures::{FeedReader, GtfsReader};

/// prints the number of rows of the big tables of the GTFS given as a cli argument, without loading them
fn main() {
    let file_path = std::env::args()
        .nth(1)
        .expect("you should put the path of the file to load");

    println!("reading file {}", &file_path);
    let mut feed = match GtfsReader::default().stream(&file_path) {
        Ok(feed) => feed,
        Err(e) => {
            eprintln!("error: {:?}", e);
            return;
        }
    };

    let stops = feed.stops().map(|rows| rows.count());
    let stop_times = feed.stop_times().map(|rows| rows.filter(Result::is_ok).count());
    match (stops, stop_times) {
        (Ok(stops), Ok(stop_times)) => println!("{stops} stops, {stop_times} stop times"),
        (Err(e), _) | (_, Err(e)) => eprintln!("error: {:?}", e),
    }
}
