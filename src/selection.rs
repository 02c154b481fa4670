use crate::error::Error;
use crate::node::{NodeKey, Table};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// An entity named by the caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub table: Table,
    pub id: String,
}

impl EntityRef {
    pub fn new(table: Table, id: impl Into<String>) -> Self {
        Self {
            table,
            id: id.into(),
        }
    }

    pub fn key(&self) -> NodeKey<'_> {
        NodeKey::new(self.table, &self.id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.id)
    }
}

/// Parses `table:id`, like `routes.txt:R1` or `routes:R1`
impl FromStr for EntityRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (table, id) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidEntityRef(s.to_owned()))?;
        if id.is_empty() {
            return Err(Error::InvalidEntityRef(s.to_owned()));
        }
        Ok(Self::new(table.parse()?, id))
    }
}

/// A WGS84 box, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, Error> {
        let bbox = Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    pub fn validate(&self) -> Result<(), Error> {
        let values = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(Error::InvalidBoundingBox(format!("{self} is not finite")));
        }
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return Err(Error::InvalidBoundingBox(format!(
                "{self} has its minimum above its maximum"
            )));
        }
        Ok(())
    }

    /// Is the `[lon, lat]` point inside the box, bounds included
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [lon, lat] = point;
        self.min_lon <= lon && lon <= self.max_lon && self.min_lat <= lat && lat <= self.max_lat
    }

    pub fn lower_corner(&self) -> [f64; 2] {
        [self.min_lon, self.min_lat]
    }

    pub fn upper_corner(&self) -> [f64; 2] {
        [self.max_lon, self.max_lat]
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Parses `min_lon,min_lat,max_lon,max_lat`
impl FromStr for BoundingBox {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::InvalidBoundingBox(format!("'{s}': {e}")))?;
        match values[..] {
            [min_lon, min_lat, max_lon, max_lat] => Self::new(min_lon, min_lat, max_lon, max_lat),
            _ => Err(Error::InvalidBoundingBox(format!(
                "'{s}' must have 4 values, min_lon,min_lat,max_lon,max_lat"
            ))),
        }
    }
}

/// What to extract from a feed
///
/// Everything reachable from the included entities and from the stops inside the box is kept,
/// except what depends on an excluded entity.
///
/// It can be read from JSON:
/// ```
/// let selection: gtfs_extract::Selection = serde_json::from_str(r#"{
///     "include": [{"table": "routes.txt", "id": "R1"}],
///     "bbox": {"min_lon": 2.3, "min_lat": 48.8, "max_lon": 2.4, "max_lat": 48.9}
/// }"#)?;
/// assert!(selection.exclude.is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selection {
    pub include: Vec<EntityRef>,
    pub exclude: Vec<EntityRef>,
    pub bbox: Option<BoundingBox>,
}

impl Selection {
    pub fn include(mut self, table: Table, id: impl Into<String>) -> Self {
        self.include.push(EntityRef::new(table, id));
        self
    }

    pub fn exclude(mut self, table: Table, id: impl Into<String>) -> Self {
        self.exclude.push(EntityRef::new(table, id));
        self
    }

    pub fn bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| Error::SelectionFile {
            path: path.to_path_buf(),
            source,
        })?;
        let selection: Self = serde_json::from_str(&content)?;
        if let Some(bbox) = &selection.bbox {
            bbox.validate()?;
        }
        Ok(selection)
    }

    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.bbox.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_entity_ref() {
        let entity: EntityRef = "routes.txt:R1".parse().unwrap();
        assert_eq!(EntityRef::new(Table::Route, "R1"), entity);
        // ids can contain colons
        let entity: EntityRef = "stops:IDFM:monomodal:42".parse().unwrap();
        assert_eq!("IDFM:monomodal:42", entity.id);
        assert!(matches!(
            "R1".parse::<EntityRef>(),
            Err(Error::InvalidEntityRef(_))
        ));
        assert!(matches!(
            "routes:".parse::<EntityRef>(),
            Err(Error::InvalidEntityRef(_))
        ));
        assert!(matches!(
            "stop_times:1".parse::<EntityRef>(),
            Err(Error::UnknownTable(_))
        ));
    }

    #[test]
    fn parse_bounding_box() {
        let bbox: BoundingBox = "-122.5, 37.7,-122.3,37.9".parse().unwrap();
        assert_eq!(-122.5, bbox.min_lon);
        assert_eq!(37.9, bbox.max_lat);
        assert!(bbox.contains([-122.5, 37.9]));
        assert!(!bbox.contains([-122.2, 37.8]));

        for invalid in ["1,2,3", "a,b,c,d", "3,0,1,1", "0,0,NaN,1", "0,0,1,inf"] {
            assert!(
                matches!(
                    invalid.parse::<BoundingBox>(),
                    Err(Error::InvalidBoundingBox(_))
                ),
                "{invalid} should be rejected"
            );
        }
    }

    #[test]
    fn builder() {
        let selection = Selection::default()
            .include(Table::Agency, "A1")
            .exclude(Table::Route, "R1");
        assert_eq!(vec![EntityRef::new(Table::Agency, "A1")], selection.include);
        assert_eq!(vec![EntityRef::new(Table::Route, "R1")], selection.exclude);
        assert!(!selection.is_empty());
        assert!(Selection::default().is_empty());
    }

    #[test]
    fn read_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"include": [{{"table": "agency", "id": "DTA"}}], "exclude": [{{"table": "routes.txt", "id": "DTA1"}}]}}"#
        )
        .unwrap();
        let selection = Selection::from_json_file(file.path()).unwrap();
        assert_eq!(
            Selection::default()
                .include(Table::Agency, "DTA")
                .exclude(Table::Route, "DTA1"),
            selection
        );

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bbox": {{"min_lon": 2, "min_lat": 1, "max_lon": 1, "max_lat": 2}}}}"#).unwrap();
        assert!(matches!(
            Selection::from_json_file(file.path()),
            Err(Error::InvalidBoundingBox(_))
        ));

        assert!(matches!(
            Selection::from_json_file("fixtures/nope.json"),
            Err(Error::SelectionFile { .. })
        ));
    }
}
