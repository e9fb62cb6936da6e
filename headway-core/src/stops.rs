//! The stops catalog: the process-wide table of known stop names and
//! their coordinates, loaded once at startup and read-only afterwards.

use std::path::Path;

use geo::Point;
use hashbrown::HashMap;
use log::info;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;

use crate::Error;

/// Maps stop names to coordinates and keeps the names ordered
/// case-insensitively for display.
///
/// Names are trimmed of surrounding whitespace on load and must be
/// unique after trimming.
#[derive(Debug, Clone, Default)]
pub struct StopsCatalog {
    name_to_point: HashMap<String, Point<f64>>,
    names: Vec<String>,
}

impl StopsCatalog {
    /// Builds a catalog from `(name, lat, lng)` records.
    ///
    /// # Errors
    /// [`Error::InvalidData`] on an empty or duplicate name.
    pub fn from_records<I>(records: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, f64, f64)>,
    {
        let mut name_to_point = HashMap::new();
        for (name, lat, lng) in records {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(Error::InvalidData("empty stop name".to_string()));
            }
            if name_to_point
                .insert(name.clone(), Point::new(lng, lat))
                .is_some()
            {
                return Err(Error::InvalidData(format!("duplicate stop name: {name}")));
            }
        }
        let mut names: Vec<String> = name_to_point.keys().cloned().collect();
        names.sort_by_key(|name| name.to_lowercase());
        Ok(StopsCatalog {
            name_to_point,
            names,
        })
    }

    /// Reads a catalog from a CSV file of `name, lat, lng` rows. The
    /// first row may be a header; it is skipped when its coordinate
    /// cells do not parse as numbers.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let df = CsvReadOptions::default()
            .with_has_header(false)
            // Read everything as strings so an optional header row does
            // not confuse schema inference.
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        let columns = df.get_columns();
        if columns.len() < 3 {
            return Err(Error::MissingColumn(format!(
                "expected name, lat, lng columns in {}",
                path.display()
            )));
        }
        let names = columns[0].str()?;
        let lats = columns[1].str()?;
        let lngs = columns[2].str()?;

        let mut records = Vec::with_capacity(df.height());
        for (row, (name, (lat, lng))) in names
            .iter()
            .zip(lats.iter().zip(lngs.iter()))
            .enumerate()
        {
            let (Some(name), Some(lat), Some(lng)) = (name, lat, lng) else {
                return Err(Error::InvalidData(format!(
                    "row {row}: missing value in {}",
                    path.display()
                )));
            };
            match (lat.trim().parse::<f64>(), lng.trim().parse::<f64>()) {
                (Ok(lat), Ok(lng)) => records.push((name.to_string(), lat, lng)),
                // Header row.
                _ if row == 0 => {}
                _ => {
                    return Err(Error::InvalidData(format!(
                        "row {row}: unparseable coordinates in {}",
                        path.display()
                    )));
                }
            }
        }
        let catalog = Self::from_records(records)?;
        info!("loaded {} stops from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Coordinates of a named stop, if the catalog knows it.
    #[must_use]
    pub fn point(&self, name: &str) -> Option<Point<f64>> {
        self.name_to_point.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.name_to_point.contains_key(name)
    }

    /// Stop names, sorted case-insensitively.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.name_to_point.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name_to_point.is_empty()
    }
}
