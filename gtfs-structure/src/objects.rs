pub use crate::enums::*;
use crate::serde_helpers::*;
use chrono::NaiveDate;

use std::fmt;

/// Objects that have an identifier implement this trait
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id {
    /// Identifier of the object
    fn id(&self) -> &str;
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the Agency. Optional when the feed has a single agency
    #[serde(rename = "agency_id", default, deserialize_with = "de_with_empty_none")]
    pub id: Option<String>,
    ///Full name of the transit agency
    #[serde(rename = "agency_name")]
    pub name: String,
    /// URL of the transit agency
    #[serde(rename = "agency_url", default)]
    pub url: String,
    /// Timezone where the transit agency is located
    #[serde(rename = "agency_timezone", default)]
    pub timezone: String,
}

impl Id for Agency {
    fn id(&self) -> &str {
        match &self.id {
            None => "",
            Some(id) => id,
        }
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Route {
    /// Unique technical (not for the traveller) identifier for the route
    #[serde(rename = "route_id")]
    pub id: String,
    /// Agency for the specified route. Blank means the single agency of the feed
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub agency_id: Option<String>,
    /// Short name of a route, like "32", "100X", or "Green"
    #[serde(rename = "route_short_name", default)]
    pub short_name: String,
    /// Full name of a route
    #[serde(rename = "route_long_name", default)]
    pub long_name: String,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.long_name.is_empty() {
            write!(f, "{}", self.long_name)
        } else {
            write!(f, "{}", self.short_name)
        }
    }
}

/// A calender describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    #[serde(rename = "service_id")]
    pub id: String,
    /// Start service day for the service interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub start_date: NaiveDate,
    /// End service day for the service interval. This service day is included in the interval
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    pub end_date: NaiveDate,
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}—{}", self.start_date, self.end_date)
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    #[serde(
        deserialize_with = "deserialize_date",
        serialize_with = "serialize_date"
    )]
    /// Date where the service will be added or deleted
    pub date: NaiveDate,
    /// Is the service added or deleted
    pub exception_type: Exception,
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Shape {
    /// Unique technical (not for the traveller) identifier for the Shape
    #[serde(rename = "shape_id")]
    pub id: String,
    #[serde(rename = "shape_pt_lat", default)]
    /// Latitude of a shape point
    pub latitude: f64,
    /// Longitude of a shape point
    #[serde(rename = "shape_pt_lon", default)]
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape
    #[serde(rename = "shape_pt_sequence")]
    pub sequence: usize,
}

impl Id for Shape {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A level within a station. See <https://gtfs.org/reference/static/#levelstxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Level {
    /// Unique technical identifier of the level
    #[serde(rename = "level_id")]
    pub id: String,
    /// Numeric index of the level that indicates relative position of this level in relation to other levels
    #[serde(rename = "level_index", default, deserialize_with = "de_with_empty_default")]
    pub index: f64,
    /// Name of the level as seen by the rider inside the building or station
    #[serde(rename = "level_name")]
    pub name: Option<String>,
}

impl Id for Level {
    fn id(&self) -> &str {
        &self.id
    }
}

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    #[serde(rename = "stop_id")]
    pub id: String,
    ///Name of the location. Use a name that people will understand in the local and tourist vernacular
    #[serde(rename = "stop_name", default)]
    pub name: String,
    /// Type of the location
    #[serde(default)]
    pub location_type: LocationType,
    /// Defines hierarchy between the different locations
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub parent_station: Option<String>,
    /// Identifies the fare zone for a stop
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub zone_id: Option<String>,
    /// Longitude of the stop
    #[serde(deserialize_with = "de_with_optional_float")]
    #[serde(serialize_with = "serialize_float_as_str")]
    #[serde(rename = "stop_lon", default)]
    pub longitude: Option<f64>,
    /// Latitude of the stop
    #[serde(deserialize_with = "de_with_optional_float")]
    #[serde(serialize_with = "serialize_float_as_str")]
    #[serde(rename = "stop_lat", default)]
    pub latitude: Option<f64>,
    /// Level of the location. The same level can be used by multiple unlinked stations
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub level_id: Option<String>,
}

impl Stop {
    /// `[longitude, latitude]` when both coordinates are known
    pub fn position(&self) -> Option<[f64; 2]> {
        Some([self.longitude?, self.latitude?])
    }
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A trip is a sequence of two or more stops that occur during a specific time period. See <https://gtfs.org/reference/static/#tripstxt>
///
/// The stop times are not attached: they are streamed on their own as [StopTime]
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Trip {
    /// Unique technical identifier (not for the traveller) for the Trip
    #[serde(rename = "trip_id")]
    pub id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// Shape of the trip
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub shape_id: Option<String>,
    /// Text that appears on signage identifying the trip's destination to riders
    pub trip_headsign: Option<String>,
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Trip {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "route id: {}, service id: {}",
            self.route_id, self.service_id
        )
    }
}

/// The moment where a vehicle, running on [Trip] stops at a [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
///
/// Only the columns linking a trip to its stops are read: the stop times can count millions of rows
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct StopTime {
    /// [Trip] to which this stop time belongs to
    pub trip_id: String,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub stop_sequence: u32,
}

/// Defines one possible fare. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct FareAttribute {
    /// Unique technical (not for the traveller) identifier for the FareAttribute
    #[serde(rename = "fare_id")]
    pub id: String,
    /// Fare price, in the unit specified by [FareAttribute::currency]
    #[serde(default)]
    pub price: String,
    /// Currency used to pay the fare.
    #[serde(rename = "currency_type", default)]
    pub currency: String,
    /// Identifies the relevant agency for a fare
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub agency_id: Option<String>,
}

impl Id for FareAttribute {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Specifies how a [FareAttribute] applies to an itinerary. See <https://gtfs.org/reference/static/#fare_rulestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct FareRule {
    /// The [FareAttribute] this rule applies to
    pub fare_id: String,
    /// The [Route] associated with the fare
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub route_id: Option<String>,
    /// Origin fare zone, matching [Stop::zone_id]
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub origin_id: Option<String>,
    /// Destination fare zone, matching [Stop::zone_id]
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub destination_id: Option<String>,
    /// Fare zone that an itinerary passes through, matching [Stop::zone_id]
    #[serde(default, deserialize_with = "de_with_empty_none")]
    pub contains_id: Option<String>,
}

impl FareRule {
    /// All the fare zones referenced by the rule
    pub fn zones(&self) -> impl Iterator<Item = &str> {
        [&self.origin_id, &self.destination_id, &self.contains_id]
            .into_iter()
            .filter_map(|zone| zone.as_deref())
    }
}

/// A link between two locations of a station. See <https://gtfs.org/reference/static/#pathwaystxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Pathway {
    /// Uniquely identifies the pathway
    #[serde(rename = "pathway_id")]
    pub id: String,
    /// Location at which the pathway begins
    pub from_stop_id: String,
    /// Location at which the pathway ends
    pub to_stop_id: String,
    /// Type of pathway between the specified (from_stop_id, to_stop_id) pair
    #[serde(rename = "pathway_mode", default)]
    pub mode: PathwayMode,
    /// Indicates in which direction the pathway can be used
    #[serde(
        deserialize_with = "deserialize_bool",
        serialize_with = "serialize_bool",
        default
    )]
    pub is_bidirectional: bool,
}

impl Id for Pathway {
    fn id(&self) -> &str {
        &self.id
    }
}
