use crate::feed_reader::{FeedReader, Rows};
use crate::gtfs_reader::FeedSource;
use crate::objects::*;
use crate::Error;
use crate::GtfsReader;
use std::path::Path;

/// Data structure that map the GTFS csv with little intelligence, every table loaded in memory
///
/// It is a [FeedReader] too: each table is handed out once, after which it is empty.
/// This makes it handy to build small feeds by hand, for instance in tests.
/// To stream large feeds without loading them, see [crate::FeedSource]
#[derive(Debug)]
pub struct RawGtfs {
    /// All Agencies
    pub agencies: Result<Vec<Agency>, Error>,
    /// All Routes
    pub routes: Result<Vec<Route>, Error>,
    /// All Calendar, None if the file was absent as it is not mandatory
    pub calendar: Option<Result<Vec<Calendar>, Error>>,
    /// All Calendar dates, None if the file was absent as it is not mandatory
    pub calendar_dates: Option<Result<Vec<CalendarDate>, Error>>,
    /// All shapes points, None if the file was absent as it is not mandatory
    pub shapes: Option<Result<Vec<Shape>, Error>>,
    /// All Levels, None if the file was absent as it is not mandatory
    pub levels: Option<Result<Vec<Level>, Error>>,
    /// All Stops
    pub stops: Result<Vec<Stop>, Error>,
    /// All Trips
    pub trips: Result<Vec<Trip>, Error>,
    /// All StopTimes
    pub stop_times: Result<Vec<StopTime>, Error>,
    /// All FareAttributes, None if the file was absent as it is not mandatory
    pub fare_attributes: Option<Result<Vec<FareAttribute>, Error>>,
    /// All FareRules, None if the file was absent as it is not mandatory
    pub fare_rules: Option<Result<Vec<FareRule>, Error>>,
    /// All Pathways, None if the file was absent as it is not mandatory
    pub pathways: Option<Result<Vec<Pathway>, Error>>,
    /// All files that are present in the feed
    pub files: Vec<String>,
}

impl Default for RawGtfs {
    /// An empty feed, with every mandatory table present but empty
    fn default() -> Self {
        Self {
            agencies: Ok(Vec::new()),
            routes: Ok(Vec::new()),
            calendar: None,
            calendar_dates: None,
            shapes: None,
            levels: None,
            stops: Ok(Vec::new()),
            trips: Ok(Vec::new()),
            stop_times: Ok(Vec::new()),
            fare_attributes: None,
            fare_rules: None,
            pathways: None,
            files: Vec::new(),
        }
    }
}

impl RawGtfs {
    /// Reads the raw GTFS from a local zip archive or local directory
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        GtfsReader::default().raw().read(path)
    }

    /// Loads every table of a [FeedSource]
    pub fn from_source(mut source: FeedSource) -> Self {
        let files = source.files().into_iter().map(String::from).collect();
        RawGtfs {
            agencies: collect(source.agencies()),
            routes: collect(source.routes()),
            calendar: optional(&mut source, "calendar.txt", FeedSource::calendars),
            calendar_dates: optional(&mut source, "calendar_dates.txt", FeedSource::calendar_dates),
            shapes: optional(&mut source, "shapes.txt", FeedSource::shapes),
            levels: optional(&mut source, "levels.txt", FeedSource::levels),
            stops: collect(source.stops()),
            trips: collect(source.trips()),
            stop_times: collect(source.stop_times()),
            fare_attributes: optional(
                &mut source,
                "fare_attributes.txt",
                FeedSource::fare_attributes,
            ),
            fare_rules: optional(&mut source, "fare_rules.txt", FeedSource::fare_rules),
            pathways: optional(&mut source, "pathways.txt", FeedSource::pathways),
            files,
        }
    }
}

fn collect<T>(rows: Result<Rows<'_, T>, Error>) -> Result<Vec<T>, Error> {
    rows?.collect()
}

fn optional<T>(
    source: &mut FeedSource,
    file_name: &str,
    open: fn(&mut FeedSource) -> Result<Rows<'_, T>, Error>,
) -> Option<Result<Vec<T>, Error>> {
    if source.contains(file_name) {
        Some(collect(open(source)))
    } else {
        None
    }
}

fn take<T: 'static>(table: &mut Result<Vec<T>, Error>, file_name: &str) -> Result<Rows<'static, T>, Error> {
    let rows = std::mem::replace(table, Err(Error::Consumed(file_name.to_owned())))?;
    Ok(Box::new(rows.into_iter().map(Ok)))
}

fn take_optional<T: 'static>(
    table: &mut Option<Result<Vec<T>, Error>>,
    file_name: &str,
) -> Result<Rows<'static, T>, Error> {
    match table {
        Some(table) => take(table, file_name),
        None => Ok(Box::new(std::iter::empty())),
    }
}

impl FeedReader for RawGtfs {
    fn agencies(&mut self) -> Result<Rows<'_, Agency>, Error> {
        take(&mut self.agencies, "agency.txt")
    }

    fn routes(&mut self) -> Result<Rows<'_, Route>, Error> {
        take(&mut self.routes, "routes.txt")
    }

    fn calendars(&mut self) -> Result<Rows<'_, Calendar>, Error> {
        take_optional(&mut self.calendar, "calendar.txt")
    }

    fn calendar_dates(&mut self) -> Result<Rows<'_, CalendarDate>, Error> {
        take_optional(&mut self.calendar_dates, "calendar_dates.txt")
    }

    fn shapes(&mut self) -> Result<Rows<'_, Shape>, Error> {
        take_optional(&mut self.shapes, "shapes.txt")
    }

    fn levels(&mut self) -> Result<Rows<'_, Level>, Error> {
        take_optional(&mut self.levels, "levels.txt")
    }

    fn stops(&mut self) -> Result<Rows<'_, Stop>, Error> {
        take(&mut self.stops, "stops.txt")
    }

    fn trips(&mut self) -> Result<Rows<'_, Trip>, Error> {
        take(&mut self.trips, "trips.txt")
    }

    fn stop_times(&mut self) -> Result<Rows<'_, StopTime>, Error> {
        take(&mut self.stop_times, "stop_times.txt")
    }

    fn fare_attributes(&mut self) -> Result<Rows<'_, FareAttribute>, Error> {
        take_optional(&mut self.fare_attributes, "fare_attributes.txt")
    }

    fn fare_rules(&mut self) -> Result<Rows<'_, FareRule>, Error> {
        take_optional(&mut self.fare_rules, "fare_rules.txt")
    }

    fn pathways(&mut self) -> Result<Rows<'_, Pathway>, Error> {
        take_optional(&mut self.pathways, "pathways.txt")
    }
}
