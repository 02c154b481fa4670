use serde::de::DeserializeOwned;

use crate::feed_reader::{strip_bom, CsvRows, FeedReader, Rows};
use crate::objects::*;
use crate::{Error, RawGtfs};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

/// All the files this library knows how to stream
pub const GTFS_FILES: [&str; 12] = [
    "agency.txt",
    "routes.txt",
    "calendar.txt",
    "calendar_dates.txt",
    "shapes.txt",
    "levels.txt",
    "stops.txt",
    "trips.txt",
    "stop_times.txt",
    "fare_attributes.txt",
    "fare_rules.txt",
    "pathways.txt",
];

/// Allows to parameterize how the parsing library behaves
///
/// ```
///let mut feed = gtfs_structures::GtfsReader::default()
///    .read_stop_times(false) // Won’t read the stop times to save time
///    .stream("fixtures/basic")?;
///let stops = gtfs_structures::FeedReader::stops(&mut feed)?.count();
///assert_eq!(5, stops);
/// # Ok::<(), gtfs_structures::error::Error>(())
///```
///
/// You can also get a [RawGtfs], with every table loaded in memory, by doing
/// ```
///let gtfs = gtfs_structures::GtfsReader::default()
///    .raw()
///    .read("fixtures/basic")?;
///assert_eq!(2, gtfs.trips?.len());
/// # Ok::<(), gtfs_structures::error::Error>(())
///```
#[derive(Derivative, Clone, Copy, Debug)]
#[derivative(Default)]
pub struct GtfsReader {
    /// Stop times can count millions of rows and are not always needed. This allows to skip them
    #[derivative(Default(value = "true"))]
    pub read_stop_times: bool,
    /// If a an enumeration has un unknown value, should we use the default value
    #[derivative(Default(value = "false"))]
    pub unkown_enum_as_default: bool,
    /// Avoid trimming the fields
    ///
    /// It is quite time consumming
    /// If performance is an issue, and if your data is high quality, you can switch it off
    #[derivative(Default(value = "true"))]
    pub trim_fields: bool,
}

impl GtfsReader {
    /// Configures the reader to read or not the stop times (default: true)
    ///
    /// When false, `stop_times.txt` is an empty table
    /// Returns Self and can be chained
    pub fn read_stop_times(mut self, read_stop_times: bool) -> Self {
        self.read_stop_times = read_stop_times;
        self
    }

    /// If a an enumeration has un unknown value, should we use the default value (default: false)
    ///
    /// For instance, if [crate::objects::Stop] has a [crate::objects::LocationType] with a value 42 in the GTFS
    /// when true, we will parse it as StopPoint
    /// when false, we will parse it as Unknown(42)
    /// Returns Self and can be chained
    pub fn unkown_enum_as_default(mut self, unkown_enum_as_default: bool) -> Self {
        self.unkown_enum_as_default = unkown_enum_as_default;
        self
    }

    /// Should the fields be trimmed (default: true)
    pub fn trim_fields(mut self, trim_fields: bool) -> Self {
        self.trim_fields = trim_fields;
        self
    }

    /// Opens a local zip archive or directory without reading any table yet
    pub fn stream<P: AsRef<Path>>(self, path: P) -> Result<FeedSource, Error> {
        let p = path.as_ref();
        if p.is_file() {
            let file = File::open(p)?;
            self.stream_from_reader(BufReader::new(file))
        } else if p.is_dir() {
            Ok(FeedSource {
                options: self,
                kind: SourceKind::Directory(p.to_path_buf()),
            })
        } else {
            Err(Error::NotFileNorDirectory(format!("{}", p.display())))
        }
    }

    /// Opens a zip archive from any object implementing [std::io::Read] and [std::io::Seek]
    pub fn stream_from_reader<T>(self, reader: T) -> Result<FeedSource, Error>
    where
        T: Read + Seek + 'static,
    {
        let mut archive = zip::ZipArchive::new(Box::new(reader) as Box<dyn ReadSeek>)?;
        let mut file_mapping = HashMap::new();

        for i in 0..archive.len() {
            let archive_file = archive.by_index(i)?;
            let path = Path::new(archive_file.name());
            // Files can be nested in a directory of the archive
            let file_name = path.file_name().and_then(|f| f.to_str());
            if let Some(gtfs_file) = GTFS_FILES.iter().find(|f| Some(**f) == file_name) {
                file_mapping.insert(*gtfs_file, i);
            }
        }

        Ok(FeedSource {
            options: self,
            kind: SourceKind::Archive {
                archive,
                file_mapping,
            },
        })
    }

    /// Read the Gtfs as a [RawGtfs], with every table in memory
    pub fn raw(self) -> RawGtfsReader {
        RawGtfsReader { reader: self }
    }
}

/// Anything a zip archive can be read from
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

enum SourceKind {
    Directory(PathBuf),
    Archive {
        archive: zip::ZipArchive<Box<dyn ReadSeek>>,
        file_mapping: HashMap<&'static str, usize>,
    },
}

/// A GTFS feed on disk, either as a directory or a zip archive, streamed table by table
///
/// Each call to a [FeedReader] method opens the table again and deserializes its rows lazily.
/// Nothing is kept in memory between calls.
pub struct FeedSource {
    options: GtfsReader,
    kind: SourceKind,
}

impl FeedSource {
    /// Is the file present in the feed
    pub fn contains(&self, file_name: &str) -> bool {
        match &self.kind {
            SourceKind::Directory(dir) => dir.join(file_name).is_file(),
            SourceKind::Archive { file_mapping, .. } => file_mapping.contains_key(file_name),
        }
    }

    /// The known GTFS files present in the feed
    pub fn files(&self) -> Vec<&'static str> {
        GTFS_FILES
            .iter()
            .copied()
            .filter(|f| self.contains(f))
            .collect()
    }

    fn rows<O>(&mut self, file_name: &'static str, mandatory: bool) -> Result<Rows<'_, O>, Error>
    where
        O: DeserializeOwned + 'static,
    {
        let trim_fields = self.options.trim_fields;
        match &mut self.kind {
            SourceKind::Directory(dir) => {
                let path = dir.join(file_name);
                if !path.is_file() {
                    return absent(file_name, mandatory);
                }
                let file = File::open(path).map_err(|e| Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: Box::new(e),
                })?;
                let reader = strip_bom(BufReader::new(file), file_name)?;
                Ok(Box::new(CsvRows::<_, O>::new(reader, file_name, trim_fields)?))
            }
            SourceKind::Archive {
                archive,
                file_mapping,
            } => {
                let Some(i) = file_mapping.get(file_name).copied() else {
                    return absent(file_name, mandatory);
                };
                let entry = archive.by_index(i).map_err(|e| Error::NamedFileIO {
                    file_name: file_name.to_owned(),
                    source: Box::new(e),
                })?;
                let reader = strip_bom(entry, file_name)?;
                Ok(Box::new(CsvRows::<_, O>::new(reader, file_name, trim_fields)?))
            }
        }
    }
}

fn absent<'a, O: 'a>(file_name: &str, mandatory: bool) -> Result<Rows<'a, O>, Error> {
    if mandatory {
        Err(Error::MissingFile(file_name.to_owned()))
    } else {
        Ok(Box::new(std::iter::empty()))
    }
}

impl FeedReader for FeedSource {
    fn agencies(&mut self) -> Result<Rows<'_, Agency>, Error> {
        self.rows("agency.txt", true)
    }

    fn routes(&mut self) -> Result<Rows<'_, Route>, Error> {
        self.rows("routes.txt", true)
    }

    fn calendars(&mut self) -> Result<Rows<'_, Calendar>, Error> {
        self.rows("calendar.txt", false)
    }

    fn calendar_dates(&mut self) -> Result<Rows<'_, CalendarDate>, Error> {
        self.rows("calendar_dates.txt", false)
    }

    fn shapes(&mut self) -> Result<Rows<'_, Shape>, Error> {
        self.rows("shapes.txt", false)
    }

    fn levels(&mut self) -> Result<Rows<'_, Level>, Error> {
        self.rows("levels.txt", false)
    }

    fn stops(&mut self) -> Result<Rows<'_, Stop>, Error> {
        let unknown_as_default = self.options.unkown_enum_as_default;
        let rows = self.rows::<Stop>("stops.txt", true)?;
        if !unknown_as_default {
            return Ok(rows);
        }
        Ok(Box::new(rows.map(|stop| {
            stop.map(|mut stop| {
                if let LocationType::Unknown(_) = stop.location_type {
                    stop.location_type = LocationType::default();
                }
                stop
            })
        })))
    }

    fn trips(&mut self) -> Result<Rows<'_, Trip>, Error> {
        self.rows("trips.txt", true)
    }

    fn stop_times(&mut self) -> Result<Rows<'_, StopTime>, Error> {
        if !self.options.read_stop_times {
            return Ok(Box::new(std::iter::empty()));
        }
        self.rows("stop_times.txt", true)
    }

    fn fare_attributes(&mut self) -> Result<Rows<'_, FareAttribute>, Error> {
        self.rows("fare_attributes.txt", false)
    }

    fn fare_rules(&mut self) -> Result<Rows<'_, FareRule>, Error> {
        self.rows("fare_rules.txt", false)
    }

    fn pathways(&mut self) -> Result<Rows<'_, Pathway>, Error> {
        self.rows("pathways.txt", false)
    }
}

/// This reader generates [RawGtfs]. It must be built using [GtfsReader::raw]
pub struct RawGtfsReader {
    reader: GtfsReader,
}

impl RawGtfsReader {
    /// Reads the raw GTFS from a local zip archive or local directory
    pub fn read<P: AsRef<Path>>(self, path: P) -> Result<RawGtfs, Error> {
        self.reader.stream(path).map(RawGtfs::from_source)
    }

    /// Reads the raw GTFS from a zip archive held by any object implementing [std::io::Read] and [std::io::Seek]
    pub fn read_from_reader<T>(self, reader: T) -> Result<RawGtfs, Error>
    where
        T: Read + Seek + 'static,
    {
        self.reader
            .stream_from_reader(reader)
            .map(RawGtfs::from_source)
    }
}
