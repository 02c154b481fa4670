use crate::closure::{closure, Direction};
use crate::node::{NodeKey, Table};
use crate::selection::{BoundingBox, Selection};
use crate::{Error, Marker};
use gtfs_structures::{
    Agency, FareAttribute, FareRule, GtfsReader, RawGtfs, Route, Stop, StopTime, Trip,
};
use rustc_hash::FxHashSet;

fn extract(selection: Selection) -> Result<Marker, Error> {
    let mut feed = GtfsReader::default().stream("fixtures/extract")?;
    let mut marker = Marker::new(selection);
    marker.filter(&mut feed)?;
    Ok(marker)
}

fn assert_marked(marker: &Marker, expected: &[&str]) {
    let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    expected.sort();
    let mut marked: Vec<String> = marker.marked_nodes().iter().map(|n| n.to_string()).collect();
    marked.sort();
    assert_eq!(expected, marked);
}

const OK_EXTRACT: [&str; 7] = [
    "agency.txt:OK",
    "routes.txt:OK1",
    "trips.txt:OK1",
    "calendar.txt:OK",
    "shapes.txt:OK1",
    "stops.txt:OK1",
    "stops.txt:OK2",
];

#[test]
fn extract_agency() {
    let marker = extract(Selection::default().include(Table::Agency, "OK")).unwrap();
    assert_marked(&marker, &OK_EXTRACT);
    assert!(marker.is_marked("agency.txt", "OK"));
    assert!(marker.is_marked("stops", "OK2"));
    assert!(!marker.is_marked("agency.txt", "DTA"));
    assert!(!marker.is_marked("trips.txt", "DTA1"));
}

#[test]
fn extract_route() {
    let marker = extract(Selection::default().include(Table::Route, "DTA1")).unwrap();
    assert_marked(
        &marker,
        &[
            "agency.txt:DTA",
            "routes.txt:DTA1",
            "trips.txt:DTA1",
            "calendar.txt:DTA",
            "shapes.txt:DTA1",
            "stops.txt:STATION",
            "stops.txt:DTA1",
            "stops.txt:DTA2",
            "stops.txt:DTA3",
            "stops.txt:DTA4",
        ],
    );
    assert!(!marker.is_marked("routes.txt", "DTA2"));
    assert!(!marker.is_marked("trips.txt", "DTA2"));
    assert_eq!(Some(&5), marker.count_by_table().get(&Table::Stop));
}

#[test]
fn extract_unused_stop() {
    let marker = extract(Selection::default().include(Table::Stop, "UNUSED2")).unwrap();
    assert_marked(&marker, &["stops.txt:UNUSED2"]);
}

#[test]
fn exclude_route() {
    let selection = Selection::default()
        .include(Table::Agency, "DTA")
        .exclude(Table::Route, "DTA1");
    let marker = extract(selection).unwrap();
    assert_marked(
        &marker,
        &[
            "agency.txt:DTA",
            "routes.txt:DTA2",
            "trips.txt:DTA2",
            "calendar.txt:DTA",
            "shapes.txt:DTA1",
            "stops.txt:DTA2",
            "stops.txt:DTA3",
            "stops.txt:DTA4",
        ],
    );
    assert!(!marker.is_marked("routes.txt", "DTA1"));
    assert!(!marker.is_marked("trips.txt", "DTA1"));
    // only the excluded trip stops there
    assert!(!marker.is_marked("stops.txt", "DTA1"));
}

#[test]
fn unknown_include() {
    let mut feed = GtfsReader::default().stream("fixtures/extract").unwrap();
    let mut marker = Marker::new(Selection::default().include(Table::Route, "NOPE"));
    let result = marker.filter(&mut feed);
    assert!(matches!(
        result,
        Err(Error::UnknownEntity { table: Table::Route, ref id }) if id == "NOPE"
    ));
    assert_eq!(0, marker.marked_count());
    assert!(!marker.is_visited("routes.txt", "DTA1"));
}

#[test]
fn unknown_exclude() {
    let selection = Selection::default()
        .include(Table::Agency, "DTA")
        .exclude(Table::Trip, "NOPE");
    assert!(matches!(
        extract(selection),
        Err(Error::UnknownEntity { table: Table::Trip, .. })
    ));
}

#[test]
fn extract_whole_agency() {
    let marker = extract(Selection::default().include(Table::Agency, "DTA")).unwrap();
    assert_eq!(12, marker.marked_count());
    assert!(marker.is_marked("stops.txt", "STATION"));
    assert!(!marker.is_marked("stops.txt", "OK1"));
}

#[test]
fn station_entrance_pulls_its_station() {
    let marker = extract(Selection::default().include(Table::Stop, "CENTRAL_E")).unwrap();
    assert_marked(
        &marker,
        &[
            "stops.txt:CENTRAL_E",
            "stops.txt:CENTRAL",
            "stops.txt:CENTRAL_P",
            "pathways.txt:P1",
            "levels.txt:L1",
        ],
    );
}

#[test]
fn platform_needs_its_station() {
    let marker = extract(Selection::default().include(Table::Stop, "CENTRAL_P")).unwrap();
    assert!(marker.is_marked("stops.txt", "CENTRAL"));
    assert!(marker.is_marked("pathways.txt", "P1"));
    assert!(marker.is_marked("stops.txt", "CENTRAL_E"));
    assert!(marker.is_marked("levels.txt", "L1"));

    let marker = extract(Selection::default().include(Table::Stop, "DTA1")).unwrap();
    // the other trips of the station are not needed
    assert!(marker.is_marked("stops.txt", "STATION"));
    assert!(marker.is_marked("trips.txt", "DTA1"));
    assert!(!marker.is_marked("trips.txt", "DTA2"));
}

#[test]
fn fare_zone_pulls_its_stops() {
    let marker = extract(Selection::default().include(Table::FareAttribute, "F1")).unwrap();
    assert_marked(
        &marker,
        &["fare_attributes.txt:F1", "farezone:Z1", "stops.txt:UNUSED1"],
    );
    assert!(marker.is_visited("farezone", "Z1"));
}

#[test]
fn extract_bounding_box() {
    let bbox: BoundingBox = "-122.41,37.77,-122.39,37.79".parse().unwrap();
    let marker = extract(Selection::default().bbox(bbox)).unwrap();
    assert_marked(&marker, &OK_EXTRACT);
}

#[test]
fn empty_bounding_box() {
    let bbox = BoundingBox::new(-140.0, 20.0, -139.0, 21.0).unwrap();
    let marker = extract(Selection::default().bbox(bbox)).unwrap();
    assert_eq!(0, marker.marked_count());
    assert!(marker.is_marked("stops.txt", ""));
    assert!(marker.is_visited("stops.txt", "OK1"));
}

#[test]
fn visited_entities() {
    let marker = extract(Selection::default().include(Table::Stop, "UNUSED2")).unwrap();
    assert!(marker.is_visited("stops.txt", "UNUSED1"));
    assert!(marker.is_visited("calendar.txt", "DTA"));
    assert!(!marker.is_visited("stops.txt", "NOPE"));
    assert!(!marker.is_visited("stop_times.txt", "DTA1"));
    assert!(!marker.is_marked("stop_times.txt", "DTA1"));
}

#[test]
fn marked_is_the_two_phase_closure() {
    let marker = extract(Selection::default().include(Table::Route, "OK1")).unwrap();
    let graph = marker.graph().unwrap();
    let seed = graph.get(NodeKey::new(Table::Route, "OK1")).unwrap();
    let down = closure(graph, [seed], Direction::Down);
    let up = closure(graph, down.iter().copied(), Direction::Up);
    let expected: FxHashSet<_> = down.union(&up).map(|id| graph.node(*id).to_string()).collect();

    let marked: FxHashSet<_> = marker.marked_nodes().iter().map(|n| n.to_string()).collect();
    assert_eq!(expected, marked);

    for (_, node) in graph.nodes() {
        assert_eq!(
            marked.contains(&node.to_string()),
            marker.is_marked(node.table.file_name(), &node.id)
        );
    }
}

#[test]
fn filtering_is_idempotent() {
    let mut feed = GtfsReader::default().stream("fixtures/extract").unwrap();
    let selection = Selection::default()
        .include(Table::Agency, "DTA")
        .exclude(Table::Trip, "DTA2");
    let mut marker = Marker::new(selection);
    marker.filter(&mut feed).unwrap();
    let first: Vec<String> = marker.marked_nodes().iter().map(|n| n.to_string()).collect();
    marker.filter(&mut feed).unwrap();
    let second: Vec<String> = marker.marked_nodes().iter().map(|n| n.to_string()).collect();
    assert_eq!(first, second);
}

#[test]
fn exclude_order_does_not_matter() {
    let names = |marker: &Marker| -> Vec<String> {
        marker.marked_nodes().iter().map(|n| n.to_string()).collect()
    };
    let first = extract(
        Selection::default()
            .include(Table::Agency, "DTA")
            .exclude(Table::Route, "DTA1")
            .exclude(Table::Stop, "DTA3"),
    )
    .unwrap();
    let second = extract(
        Selection::default()
            .include(Table::Agency, "DTA")
            .exclude(Table::Stop, "DTA3")
            .exclude(Table::Route, "DTA1"),
    )
    .unwrap();
    assert_eq!(names(&first), names(&second));
    assert!(!first.is_marked("routes.txt", "DTA1"));
    assert!(!first.is_marked("stops.txt", "DTA3"));
    // DTA2 stops at DTA3
    assert!(!first.is_marked("trips.txt", "DTA2"));
    assert!(first.is_marked("routes.txt", "DTA2"));
}

#[test]
fn concurrent_searches_share_the_graph() {
    let marker = extract(Selection::default()).unwrap();
    let graph = marker.graph().unwrap();
    let route = graph.get(NodeKey::new(Table::Route, "DTA1")).unwrap();
    let stop = graph.get(NodeKey::new(Table::Stop, "OK1")).unwrap();

    let (down, up) = std::thread::scope(|scope| {
        let down = scope.spawn(|| closure(graph, [route], Direction::Down));
        let up = scope.spawn(|| closure(graph, [stop], Direction::Up));
        (down.join().unwrap(), up.join().unwrap())
    });
    assert_eq!(closure(graph, [route], Direction::Down), down);
    assert_eq!(closure(graph, [stop], Direction::Up), up);
    assert!(down.contains(&route));
    assert!(up.contains(&stop));
}

#[test]
fn empty_optional_tables() {
    let mut feed = GtfsReader::default()
        .stream("gtfs-structure/fixtures/empty_tables")
        .unwrap();
    let mut marker = Marker::new(Selection::default().include(Table::Route, "1"));
    marker.filter(&mut feed).unwrap();
    assert!(marker.is_marked("trips.txt", "trip1"));
    assert!(marker.is_marked("agency.txt", "BIBUS"));
}

#[test]
fn adding_seeds_never_removes() {
    let small = extract(Selection::default().include(Table::Route, "DTA2")).unwrap();
    let large = extract(
        Selection::default()
            .include(Table::Route, "DTA2")
            .include(Table::Stop, "CENTRAL_E"),
    )
    .unwrap();
    for node in small.marked_nodes() {
        assert!(large.is_marked(node.table.file_name(), &node.id));
    }
    assert!(large.marked_count() > small.marked_count());
}

#[test]
fn extract_from_zip() {
    let mut feed = GtfsReader::default()
        .stream("gtfs-structure/fixtures/zips/basic.zip")
        .unwrap();
    let mut marker = Marker::new(Selection::default().include(Table::Route, "1"));
    marker.filter(&mut feed).unwrap();
    assert!(marker.is_marked("trips.txt", "trip1"));
    assert!(marker.is_marked("agency.txt", "BIBUS"));
    assert!(!marker.is_marked("trips.txt", "trip2"));
}

#[test]
fn route_without_agency() {
    let mut gtfs = RawGtfs {
        agencies: Ok(vec![
            Agency {
                id: Some("A1".to_owned()),
                ..Default::default()
            },
            Agency {
                id: Some("A2".to_owned()),
                ..Default::default()
            },
        ]),
        routes: Ok(vec![Route {
            id: "R1".to_owned(),
            agency_id: None,
            ..Default::default()
        }]),
        ..RawGtfs::default()
    };
    let mut marker = Marker::new(Selection::default().include(Table::Agency, "A2"));
    marker.filter(&mut gtfs).unwrap();
    assert!(marker.is_marked("routes.txt", "R1"));
    assert!(!marker.is_marked("agency.txt", "A1"));
}

#[test]
fn dangling_references_are_ignored() {
    let mut gtfs = RawGtfs {
        stops: Ok(vec![Stop {
            id: "S1".to_owned(),
            parent_station: Some("GHOST".to_owned()),
            ..Default::default()
        }]),
        trips: Ok(vec![Trip {
            id: "T1".to_owned(),
            route_id: "NOPE".to_owned(),
            service_id: "NOPE".to_owned(),
            ..Default::default()
        }]),
        stop_times: Ok(vec![StopTime {
            trip_id: "T1".to_owned(),
            stop_id: "S1".to_owned(),
            stop_sequence: 1,
        }]),
        ..RawGtfs::default()
    };
    let mut marker = Marker::new(Selection::default().include(Table::Trip, "T1"));
    marker.filter(&mut gtfs).unwrap();
    assert_eq!(2, marker.marked_count());
    assert!(marker.is_marked("stops.txt", "S1"));
    assert!(!marker.is_visited("stops.txt", "GHOST"));
    assert_eq!(1, marker.graph().unwrap().edge_count());
}

#[test]
fn stream_errors_abort() {
    let mut gtfs = RawGtfs {
        stop_times: Err(gtfs_structures::Error::MissingFile(
            "stop_times.txt".to_owned(),
        )),
        ..RawGtfs::default()
    };
    let mut marker = Marker::new(Selection::default());
    assert!(matches!(
        marker.filter(&mut gtfs),
        Err(Error::Stream(gtfs_structures::Error::MissingFile(_)))
    ));
    assert!(marker.graph().is_none());

    let mut feed = GtfsReader::default()
        .stream("gtfs-structure/fixtures/invalid_stop_times")
        .unwrap();
    let mut marker = Marker::new(Selection::default().include(Table::Route, "1"));
    assert!(matches!(
        marker.filter(&mut feed),
        Err(Error::Stream(gtfs_structures::Error::CSVError { .. }))
    ));
    assert!(!marker.is_marked("routes.txt", "1"));
}

#[test]
fn fare_needs_its_agency() {
    let mut gtfs = RawGtfs {
        agencies: Ok(vec![
            Agency {
                id: Some("A1".to_owned()),
                ..Default::default()
            },
            Agency {
                id: Some("A2".to_owned()),
                ..Default::default()
            },
        ]),
        stops: Ok(vec![Stop {
            id: "S1".to_owned(),
            zone_id: Some("Z1".to_owned()),
            ..Default::default()
        }]),
        fare_attributes: Some(Ok(vec![
            FareAttribute {
                id: "F1".to_owned(),
                agency_id: Some("A1".to_owned()),
                ..Default::default()
            },
            FareAttribute {
                id: "F2".to_owned(),
                ..Default::default()
            },
        ])),
        fare_rules: Some(Ok(vec![FareRule {
            fare_id: "F1".to_owned(),
            origin_id: Some("Z1".to_owned()),
            ..Default::default()
        }])),
        ..RawGtfs::default()
    };
    let mut marker = Marker::new(Selection::default().include(Table::FareAttribute, "F1"));
    marker.filter(&mut gtfs).unwrap();
    assert!(marker.is_marked("agency.txt", "A1"));
    assert!(marker.is_marked("stops.txt", "S1"));
    assert!(!marker.is_marked("agency.txt", "A2"));
    assert!(!marker.is_marked("fare_attributes.txt", "F2"));

    let mut gtfs = RawGtfs {
        agencies: Ok(vec![Agency {
            id: Some("A1".to_owned()),
            ..Default::default()
        }]),
        fare_attributes: Some(Ok(vec![FareAttribute {
            id: "F2".to_owned(),
            ..Default::default()
        }])),
        ..RawGtfs::default()
    };
    let mut marker = Marker::new(Selection::default().include(Table::FareAttribute, "F2"));
    marker.filter(&mut gtfs).unwrap();
    assert_eq!(1, marker.marked_count());
}
