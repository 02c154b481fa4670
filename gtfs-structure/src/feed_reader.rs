use crate::objects::*;
use crate::Error;
use serde::de::DeserializeOwned;
use std::io::{Cursor, Read};
use std::marker::PhantomData;

/// Lazy sequence of the rows of one table
pub type Rows<'a, T> = Box<dyn Iterator<Item = Result<T, Error>> + 'a>;

/// A GTFS feed seen as one lazy, finite sequence per table
///
/// Each sequence is meant to be consumed once, from start to end, by a single consumer.
/// Opening a mandatory table that is absent is an [Error::MissingFile];
/// an optional table that is absent is an empty sequence.
pub trait FeedReader {
    /// Rows of `agency.txt`
    fn agencies(&mut self) -> Result<Rows<'_, Agency>, Error>;
    /// Rows of `routes.txt`
    fn routes(&mut self) -> Result<Rows<'_, Route>, Error>;
    /// Rows of `calendar.txt`
    fn calendars(&mut self) -> Result<Rows<'_, Calendar>, Error>;
    /// Rows of `calendar_dates.txt`
    fn calendar_dates(&mut self) -> Result<Rows<'_, CalendarDate>, Error>;
    /// Rows of `shapes.txt`
    fn shapes(&mut self) -> Result<Rows<'_, Shape>, Error>;
    /// Rows of `levels.txt`
    fn levels(&mut self) -> Result<Rows<'_, Level>, Error>;
    /// Rows of `stops.txt`
    fn stops(&mut self) -> Result<Rows<'_, Stop>, Error>;
    /// Rows of `trips.txt`
    fn trips(&mut self) -> Result<Rows<'_, Trip>, Error>;
    /// Rows of `stop_times.txt`
    fn stop_times(&mut self) -> Result<Rows<'_, StopTime>, Error>;
    /// Rows of `fare_attributes.txt`
    fn fare_attributes(&mut self) -> Result<Rows<'_, FareAttribute>, Error>;
    /// Rows of `fare_rules.txt`
    fn fare_rules(&mut self) -> Result<Rows<'_, FareRule>, Error>;
    /// Rows of `pathways.txt`
    fn pathways(&mut self) -> Result<Rows<'_, Pathway>, Error>;
}

/// Deserializes the records of one CSV file, one at a time
pub(crate) struct CsvRows<R, T> {
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
    record: csv::StringRecord,
    file_name: String,
    done: bool,
    _row: PhantomData<fn() -> T>,
}

/// Skips the UTF-8 byte order mark some producers put at the start of their files
pub(crate) fn strip_bom<R: Read>(mut reader: R, file_name: &str) -> Result<impl Read, Error> {
    // An empty or tiny file is shorter than the mark
    let mut prefix = Vec::with_capacity(3);
    reader
        .by_ref()
        .take(3)
        .read_to_end(&mut prefix)
        .map_err(|e| Error::NamedFileIO {
            file_name: file_name.to_owned(),
            source: Box::new(e),
        })?;

    if prefix == [0xefu8, 0xbbu8, 0xbfu8] {
        prefix.clear();
    }
    Ok(Cursor::new(prefix).chain(reader))
}

impl<R: Read, T> CsvRows<R, T> {
    pub(crate) fn new(reader: R, file_name: &str, trim_fields: bool) -> Result<Self, Error> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(if trim_fields {
                csv::Trim::Fields
            } else {
                csv::Trim::None
            })
            .from_reader(reader);
        // We keep the headers to be able to return them in case of errors
        let headers = reader
            .headers()
            .map_err(|e| Error::CSVError {
                file_name: file_name.to_owned(),
                source: e,
                line_in_error: None,
            })?
            .clone();

        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
            file_name: file_name.to_owned(),
            done: false,
            _row: PhantomData,
        })
    }
}

impl<R: Read, T: DeserializeOwned> Iterator for CsvRows<R, T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        // The record is reused from one line to the next
        let read = self.reader.read_record(&mut self.record);
        let row = match read {
            Ok(false) => {
                self.done = true;
                return None;
            }
            Err(e) => Err(Error::CSVError {
                file_name: self.file_name.clone(),
                source: e,
                line_in_error: None,
            }),
            Ok(true) => self
                .record
                .deserialize(Some(&self.headers))
                .map_err(|e| Error::CSVError {
                    file_name: self.file_name.clone(),
                    source: e,
                    line_in_error: Some(crate::error::LineError {
                        headers: self.headers.iter().map(String::from).collect(),
                        values: self.record.iter().map(String::from).collect(),
                    }),
                }),
        };
        self.done = row.is_err();
        Some(row)
    }
}
