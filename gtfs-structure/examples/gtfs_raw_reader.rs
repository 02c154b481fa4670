fn main() {
    // Every table is loaded in memory, except the stop times that are skipped
    let gtfs = gtfs_structures::GtfsReader::default()
        .read_stop_times(false)
        .raw()
        .read("fixtures/basic")
        .expect("impossible to read gtfs");
    println!("files: {:?}", gtfs.files);

    let routes = gtfs.routes.expect("impossible to read routes");
    let route_1 = routes.first().expect("no route");
    println!("{}: {:?}", route_1.short_name, route_1);
}
