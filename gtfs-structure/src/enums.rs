use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Describes the kind of [crate::Stop]. See <https://gtfs.org/reference/static/#stopstxt> `location_type`
#[derive(Derivative, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[derivative(Default(bound = ""))]
pub enum LocationType {
    /// Stop (or Platform). A location where passengers board or disembark from a transit vehicle. Is called a platform when defined within a parent_station
    #[derivative(Default)]
    StopPoint,
    /// Station. A physical structure or area that contains one or more platform
    StopArea,
    /// A location where passengers can enter or exit a station from the street
    StationEntrance,
    /// A location within a station, not matching any other [crate::Stop::location_type], which can be used to link together pathways
    GenericNode,
    /// A specific location on a platform, where passengers can board and/or alight vehicles
    BoardingArea,
    /// An unknown value
    Unknown(i32),
}

impl LocationType {
    /// Entrances, generic nodes and boarding areas only make sense together with the
    /// station (or platform) they belong to
    pub fn is_station_feature(&self) -> bool {
        matches!(
            self,
            LocationType::StationEntrance | LocationType::GenericNode | LocationType::BoardingArea
        )
    }
}

fn serialize_i32_as_str<S: Serializer>(s: S, value: i32) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

impl<'de> Deserialize<'de> for LocationType {
    fn deserialize<D>(deserializer: D) -> Result<LocationType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "" | "0" => LocationType::StopPoint,
            "1" => LocationType::StopArea,
            "2" => LocationType::StationEntrance,
            "3" => LocationType::GenericNode,
            "4" => LocationType::BoardingArea,
            s => LocationType::Unknown(s.parse().map_err(|_| {
                serde::de::Error::custom(format!(
                    "invalid value for LocationType, must be an integer: {}",
                    s
                ))
            })?),
        })
    }
}

impl Serialize for LocationType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_i32_as_str(
            serializer,
            match self {
                LocationType::StopPoint => 0,
                LocationType::StopArea => 1,
                LocationType::StationEntrance => 2,
                LocationType::GenericNode => 3,
                LocationType::BoardingArea => 4,
                LocationType::Unknown(i) => *i,
            },
        )
    }
}

/// Defines if a [crate::CalendarDate] is added or deleted from a [crate::Calendar]
#[derive(Debug, Deserialize, Serialize, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// There will be a service on that day
    #[serde(rename = "1")]
    Added,
    /// There won’t be a service on that day
    #[serde(rename = "2")]
    Deleted,
}

/// Type of pathway between [crate::Pathway::from_stop_id] and [crate::Pathway::to_stop_id]
#[derive(Debug, Serialize, Deserialize, Derivative, Copy, Clone, PartialEq, Eq)]
#[derivative(Default)]
pub enum PathwayMode {
    /// A walkway
    #[serde(rename = "1")]
    #[derivative(Default)]
    Walkway,
    /// Stairs
    #[serde(rename = "2")]
    Stairs,
    /// A moving sidewalk / travelator
    #[serde(rename = "3")]
    MovingSidewalk,
    /// An escalator
    #[serde(rename = "4")]
    Escalator,
    /// An elevator
    #[serde(rename = "5")]
    Elevator,
    /// A pathway that crosses into an area of the station where a proof of payment is required
    #[serde(rename = "6")]
    FareGate,
    /// A pathway exiting an area where proof-of-payment is required into an area where proof-of-payment is no longer required
    #[serde(rename = "7")]
    ExitGate,
}
