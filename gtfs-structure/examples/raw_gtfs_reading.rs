use gtfs_structures::RawGtfs;

fn main() {
    let raw_gtfs = RawGtfs::from_path("fixtures/basic").expect("impossible to read gtfs");

    for stop in raw_gtfs.stops.expect("impossible to read stops.txt") {
        println!("stop: {}", stop);
    }
}
