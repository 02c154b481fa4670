//! How each kind of GTFS entity contributes nodes and edges to the [FeedGraph]
//!
//! Every streamed row goes through the [EdgeRule] of its type. The rule lists the nodes to intern
//! and the edges to add, as `(table, id)` keys, without touching the graph itself.
//! References that can only be resolved once a whole table has been read (parent stations,
//! fare zones) are kept in a [RuleContext] bounded by the number of stops, and linked
//! when the table is done.
use crate::error::Error;
use crate::feed_graph::{FeedGraph, NodeId};
use crate::node::{NodeKey, Table};
use gtfs_structures::{
    Agency, Calendar, CalendarDate, FareAttribute, FareRule, FeedReader, Id, Level, Pathway,
    Route, Rows, Shape, Stop, StopTime, Trip,
};
use log::{debug, info};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Agency,
    Route,
    Calendar,
    CalendarDate,
    Shape,
    Level,
    Stop,
    Trip,
    StopTime,
    FareAttribute,
    FareRule,
    Pathway,
}

/// What a rule is allowed to contribute
#[derive(Debug)]
pub struct RuleTables {
    pub kind: EntityKind,
    pub file_name: &'static str,
    /// Tables of the nodes the rule interns
    pub produces: &'static [Table],
    /// Tables the rule can point its edges to, besides the ones it produces
    pub references: &'static [Table],
}

/// Registry of the rules, in the order of [EntityKind]
pub const RULES: [RuleTables; 12] = [
    RuleTables {
        kind: EntityKind::Agency,
        file_name: "agency.txt",
        produces: &[Table::Agency],
        references: &[],
    },
    RuleTables {
        kind: EntityKind::Route,
        file_name: "routes.txt",
        produces: &[Table::Route],
        references: &[Table::Agency],
    },
    RuleTables {
        kind: EntityKind::Calendar,
        file_name: "calendar.txt",
        produces: &[Table::Calendar],
        references: &[],
    },
    RuleTables {
        kind: EntityKind::CalendarDate,
        file_name: "calendar_dates.txt",
        produces: &[Table::Calendar],
        references: &[],
    },
    RuleTables {
        kind: EntityKind::Shape,
        file_name: "shapes.txt",
        produces: &[Table::Shape],
        references: &[],
    },
    RuleTables {
        kind: EntityKind::Level,
        file_name: "levels.txt",
        produces: &[Table::Level],
        references: &[],
    },
    RuleTables {
        kind: EntityKind::Stop,
        file_name: "stops.txt",
        produces: &[Table::Stop],
        references: &[Table::Level],
    },
    RuleTables {
        kind: EntityKind::Trip,
        file_name: "trips.txt",
        produces: &[Table::Trip],
        references: &[Table::Route, Table::Calendar, Table::Shape],
    },
    RuleTables {
        kind: EntityKind::StopTime,
        file_name: "stop_times.txt",
        produces: &[],
        references: &[Table::Stop, Table::Trip],
    },
    RuleTables {
        kind: EntityKind::FareAttribute,
        file_name: "fare_attributes.txt",
        produces: &[Table::FareAttribute],
        references: &[Table::Agency],
    },
    RuleTables {
        kind: EntityKind::FareRule,
        file_name: "fare_rules.txt",
        produces: &[Table::FareZone],
        references: &[Table::FareAttribute, Table::Stop],
    },
    RuleTables {
        kind: EntityKind::Pathway,
        file_name: "pathways.txt",
        produces: &[Table::Pathway],
        references: &[Table::Stop],
    },
];

impl EntityKind {
    pub fn rule(self) -> &'static RuleTables {
        &RULES[self as usize]
    }
}

/// Nodes and edges contributed by one entity
#[derive(Debug, Default, PartialEq)]
pub struct Contribution<'a> {
    pub nodes: Vec<NodeKey<'a>>,
    pub edges: Vec<(NodeKey<'a>, NodeKey<'a>)>,
}

impl<'a> Contribution<'a> {
    fn node(mut self, table: Table, id: &'a str) -> Self {
        self.nodes.push(NodeKey::new(table, id));
        self
    }

    fn edge(mut self, from: NodeKey<'a>, to: NodeKey<'a>) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Are all the nodes and edges on tables the rule declared
    pub fn follows(&self, rule: &RuleTables) -> bool {
        let allowed = |t: Table| rule.produces.contains(&t) || rule.references.contains(&t);
        self.nodes.iter().all(|n| rule.produces.contains(&n.table))
            && self
                .edges
                .iter()
                .all(|(from, to)| allowed(from.table) && allowed(to.table))
    }
}

struct StationLink {
    stop_id: String,
    parent_station: String,
    is_station_feature: bool,
}

/// State kept while the feed is streamed
///
/// Its size depends on the number of stops, never on the number of stop times.
#[derive(Default)]
pub struct RuleContext {
    /// Id of the last agency streamed, used by routes without agency
    default_agency: Option<String>,
    station_links: Vec<StationLink>,
    // zone_id -> stops of the zone
    zone_stops: FxHashMap<String, Vec<String>>,
    stop_points: Vec<([f64; 2], String)>,
}

pub trait EdgeRule {
    const KIND: EntityKind;

    fn contribute<'a>(&'a self, ctx: &'a RuleContext) -> Contribution<'a>;

    /// Keeps what later rules need to know about this entity
    fn record(&self, _ctx: &mut RuleContext) {}
}

impl EdgeRule for Agency {
    const KIND: EntityKind = EntityKind::Agency;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        // a feed with a single agency can leave its id blank
        Contribution::default().node(Table::Agency, Id::id(self))
    }

    fn record(&self, ctx: &mut RuleContext) {
        ctx.default_agency = Some(Id::id(self).to_owned());
    }
}

impl EdgeRule for Route {
    const KIND: EntityKind = EntityKind::Route;

    fn contribute<'a>(&'a self, ctx: &'a RuleContext) -> Contribution<'a> {
        let route = NodeKey::new(Table::Route, &self.id);
        let contribution = Contribution::default().node(Table::Route, &self.id);
        match self.agency_id.as_deref().or(ctx.default_agency.as_deref()) {
            Some(agency) => contribution.edge(NodeKey::new(Table::Agency, agency), route),
            None => contribution,
        }
    }
}

impl EdgeRule for Calendar {
    const KIND: EntityKind = EntityKind::Calendar;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        Contribution::default().node(Table::Calendar, &self.id)
    }
}

// A service can be defined by its exceptions only
impl EdgeRule for CalendarDate {
    const KIND: EntityKind = EntityKind::CalendarDate;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        Contribution::default().node(Table::Calendar, &self.service_id)
    }
}

impl EdgeRule for Shape {
    const KIND: EntityKind = EntityKind::Shape;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        Contribution::default().node(Table::Shape, &self.id)
    }
}

impl EdgeRule for Level {
    const KIND: EntityKind = EntityKind::Level;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        Contribution::default().node(Table::Level, &self.id)
    }
}

impl EdgeRule for Stop {
    const KIND: EntityKind = EntityKind::Stop;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        let contribution = Contribution::default().node(Table::Stop, &self.id);
        match &self.level_id {
            Some(level) => contribution.edge(
                NodeKey::new(Table::Level, level),
                NodeKey::new(Table::Stop, &self.id),
            ),
            None => contribution,
        }
    }

    fn record(&self, ctx: &mut RuleContext) {
        if let Some(parent_station) = &self.parent_station {
            ctx.station_links.push(StationLink {
                stop_id: self.id.clone(),
                parent_station: parent_station.clone(),
                is_station_feature: self.location_type.is_station_feature(),
            });
        }
        if let Some(zone_id) = &self.zone_id {
            ctx.zone_stops
                .entry(zone_id.clone())
                .or_default()
                .push(self.id.clone());
        }
        if let Some(position) = self.position() {
            ctx.stop_points.push((position, self.id.clone()));
        }
    }
}

impl EdgeRule for Trip {
    const KIND: EntityKind = EntityKind::Trip;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        let trip = NodeKey::new(Table::Trip, &self.id);
        let contribution = Contribution::default()
            .node(Table::Trip, &self.id)
            .edge(NodeKey::new(Table::Route, &self.route_id), trip)
            .edge(NodeKey::new(Table::Calendar, &self.service_id), trip);
        match &self.shape_id {
            Some(shape) => contribution.edge(NodeKey::new(Table::Shape, shape), trip),
            None => contribution,
        }
    }
}

// Stop times are not entities of the graph, they only tie stops to trips
impl EdgeRule for StopTime {
    const KIND: EntityKind = EntityKind::StopTime;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        Contribution::default().edge(
            NodeKey::new(Table::Stop, &self.stop_id),
            NodeKey::new(Table::Trip, &self.trip_id),
        )
    }
}

impl EdgeRule for FareAttribute {
    const KIND: EntityKind = EntityKind::FareAttribute;

    // Unlike routes, a fare without agency is not bound to the default one
    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        let contribution = Contribution::default().node(Table::FareAttribute, &self.id);
        match &self.agency_id {
            Some(agency) => contribution.edge(
                NodeKey::new(Table::Agency, agency),
                NodeKey::new(Table::FareAttribute, &self.id),
            ),
            None => contribution,
        }
    }
}

impl EdgeRule for FareRule {
    const KIND: EntityKind = EntityKind::FareRule;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        let fare = NodeKey::new(Table::FareAttribute, &self.fare_id);
        self.zones().fold(Contribution::default(), |contribution, zone| {
            contribution
                .node(Table::FareZone, zone)
                .edge(fare, NodeKey::new(Table::FareZone, zone))
        })
    }
}

impl EdgeRule for Pathway {
    const KIND: EntityKind = EntityKind::Pathway;

    fn contribute<'a>(&'a self, _ctx: &'a RuleContext) -> Contribution<'a> {
        let pathway = NodeKey::new(Table::Pathway, &self.id);
        Contribution::default()
            .node(Table::Pathway, &self.id)
            .edge(NodeKey::new(Table::Stop, &self.from_stop_id), pathway)
            .edge(NodeKey::new(Table::Stop, &self.to_stop_id), pathway)
    }
}

fn stream<T: EdgeRule>(
    graph: &mut FeedGraph,
    ctx: &mut RuleContext,
    rows: Rows<'_, T>,
) -> Result<(), Error> {
    let rule = T::KIND.rule();
    let mut count = 0usize;
    for row in rows {
        let row = row?;
        let contribution = row.contribute(ctx);
        debug_assert!(
            contribution.follows(rule),
            "{:?} contributed outside of its tables: {:?}",
            rule.kind,
            contribution
        );
        graph.apply(&contribution);
        row.record(ctx);
        count += 1;
    }
    debug!("{} rows read from {}", count, rule.file_name);
    Ok(())
}

/// Links every stop to its parent station, and the entrances, generic nodes and boarding areas
/// back to their station
fn link_stations(graph: &mut FeedGraph, ctx: &mut RuleContext) {
    for link in ctx.station_links.drain(..) {
        let stop = NodeKey::new(Table::Stop, &link.stop_id);
        let station = NodeKey::new(Table::Stop, &link.parent_station);
        graph.add_edge(station, stop);
        if link.is_station_feature {
            graph.add_edge(stop, station);
        }
    }
}

/// Links the fare zones used by a fare rule to the stops of the zone
fn link_fare_zones(graph: &mut FeedGraph, ctx: &RuleContext) {
    for (zone_id, stops) in &ctx.zone_stops {
        let zone = NodeKey::new(Table::FareZone, zone_id);
        if graph.get(zone).is_none() {
            continue;
        }
        for stop in stops {
            graph.add_edge(zone, NodeKey::new(Table::Stop, stop));
        }
    }
}

fn locate_stops(graph: &mut FeedGraph, ctx: &mut RuleContext) {
    let points: Vec<([f64; 2], NodeId)> = ctx
        .stop_points
        .drain(..)
        .filter_map(|(point, id)| Some((point, graph.get(NodeKey::new(Table::Stop, &id))?)))
        .collect();
    graph.index_stop_locations(points);
}

/// Streams every table of the feed once and builds its dependency graph
///
/// Tables are read in an order such that the targets of a reference are known before it is read.
/// The first row that cannot be read aborts the construction.
pub fn build_graph<R: FeedReader + ?Sized>(reader: &mut R) -> Result<FeedGraph, Error> {
    let mut graph = FeedGraph::new();
    let mut ctx = RuleContext::default();

    stream(&mut graph, &mut ctx, reader.agencies()?)?;
    stream(&mut graph, &mut ctx, reader.routes()?)?;
    stream(&mut graph, &mut ctx, reader.calendars()?)?;
    stream(&mut graph, &mut ctx, reader.calendar_dates()?)?;
    stream(&mut graph, &mut ctx, reader.shapes()?)?;
    stream(&mut graph, &mut ctx, reader.levels()?)?;
    stream(&mut graph, &mut ctx, reader.stops()?)?;
    link_stations(&mut graph, &mut ctx);
    locate_stops(&mut graph, &mut ctx);
    stream(&mut graph, &mut ctx, reader.trips()?)?;
    stream(&mut graph, &mut ctx, reader.stop_times()?)?;
    stream(&mut graph, &mut ctx, reader.fare_attributes()?)?;
    stream(&mut graph, &mut ctx, reader.fare_rules()?)?;
    link_fare_zones(&mut graph, &ctx);
    stream(&mut graph, &mut ctx, reader.pathways()?)?;

    info!(
        "Graph built with {} nodes and {} edges",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}
