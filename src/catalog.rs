//! FXT source catalog
//!
//! The catalog is a CSV file with one row per detected source.
//! The right ascension and declination columns are either named explicitly with
//! a [ColumnMapping] or found from the header: the first column with "ra" in
//! its name is the right ascension and the first column with "dec" is the declination
//! (case insensitive).

use regex::Regex;
use std::{
    fs::File,
    io::Read,
    ops::Deref,
    path::{Path, PathBuf},
    time::Instant,
};

use crate::geometry::SkyPosition;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Failed to open the catalog file {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
    #[error("Failed to read the CSV catalog")]
    Csv(#[from] csv::Error),
    #[error("Invalid column pattern")]
    Regex(#[from] regex::Error),
    #[error("{0} column not found in CSV header: {1:?}")]
    ColumnNotFound(Coordinate, Vec<String>),
    #[error("{0} column {1:?} missing from CSV header: {2:?}")]
    MissingColumn(Coordinate, String, Vec<String>),
    #[error("invalid {coordinate} value {value:?} in column {column:?} at row #{row}")]
    InvalidCoordinate {
        coordinate: Coordinate,
        column: String,
        row: usize,
        value: String,
    },
}
type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Coordinate {
    #[strum(serialize = "RA")]
    RightAscension,
    #[strum(serialize = "Dec")]
    Declination,
}
impl Coordinate {
    /// Case insensitive header pattern
    fn pattern(&self) -> &'static str {
        match self {
            Coordinate::RightAscension => r"(?i)ra",
            Coordinate::Declination => r"(?i)dec",
        }
    }
}

/// Catalog columns of the right ascension and declination
///
/// A column left to `None` is found from the CSV header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnMapping {
    pub ra: Option<String>,
    pub dec: Option<String>,
}
impl ColumnMapping {
    pub fn ra<S: Into<String>>(self, column: S) -> Self {
        Self {
            ra: Some(column.into()),
            ..self
        }
    }
    pub fn dec<S: Into<String>>(self, column: S) -> Self {
        Self {
            dec: Some(column.into()),
            ..self
        }
    }
    fn column(&self, coordinate: Coordinate) -> Option<&str> {
        match coordinate {
            Coordinate::RightAscension => self.ra.as_deref(),
            Coordinate::Declination => self.dec.as_deref(),
        }
    }
    /// Returns the index of the `coordinate` column in `headers`
    fn locate(&self, coordinate: Coordinate, headers: &[String]) -> Result<usize> {
        match self.column(coordinate) {
            Some(name) => headers.iter().position(|h| h == name).ok_or_else(|| {
                CatalogError::MissingColumn(coordinate, name.to_string(), headers.to_vec())
            }),
            None => {
                let re = Regex::new(coordinate.pattern())?;
                headers
                    .iter()
                    .position(|h| re.is_match(h))
                    .ok_or_else(|| CatalogError::ColumnNotFound(coordinate, headers.to_vec()))
            }
        }
    }
}

/// Sources sky coordinates in catalog order
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    ra_column: String,
    dec_column: String,
    sources: Vec<SkyPosition>,
}
impl Deref for Catalog {
    type Target = [SkyPosition];

    fn deref(&self) -> &Self::Target {
        &self.sources
    }
}
impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a SkyPosition;
    type IntoIter = std::slice::Iter<'a, SkyPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}
impl Catalog {
    /// Reads a CSV catalog from `reader`
    pub fn from_reader<R: Read>(reader: R, columns: &ColumnMapping) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let ra_idx = columns.locate(Coordinate::RightAscension, &headers)?;
        let dec_idx = columns.locate(Coordinate::Declination, &headers)?;
        let (ra_column, dec_column) = (headers[ra_idx].clone(), headers[dec_idx].clone());
        log::debug!("catalog columns: RA={ra_column:?}, Dec={dec_column:?}");

        let parse = |record: &csv::StringRecord, row: usize, idx: usize, coordinate| {
            let value = record.get(idx).unwrap_or_default();
            value
                .parse::<f64>()
                .ok()
                .filter(|x| x.is_finite())
                .ok_or_else(|| CatalogError::InvalidCoordinate {
                    coordinate,
                    column: headers[idx].clone(),
                    row,
                    value: value.to_string(),
                })
        };
        let mut sources = vec![];
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let ra = parse(&record, i + 1, ra_idx, Coordinate::RightAscension)?;
            let dec = parse(&record, i + 1, dec_idx, Coordinate::Declination)?;
            sources.push(SkyPosition::new(ra, dec));
        }
        Ok(Self {
            ra_column,
            dec_column,
            sources,
        })
    }
    /// Reads the CSV catalog at `path`
    pub fn from_path<P: AsRef<Path>>(path: P, columns: &ColumnMapping) -> Result<Self> {
        let path = path.as_ref();
        let csv_file = File::open(path).map_err(|e| CatalogError::Io(e, path.to_path_buf()))?;
        log::info!("Loading {:?}...", path);
        let now = Instant::now();
        let catalog = Self::from_reader(csv_file, columns)?;
        log::info!(
            "... loaded {} sources in {}ms",
            catalog.len(),
            now.elapsed().as_millis()
        );
        Ok(catalog)
    }
    /// Returns the names of the right ascension and declination columns
    pub fn columns(&self) -> (&str, &str) {
        (&self.ra_column, &self.dec_column)
    }
    pub fn sources(&self) -> &[SkyPosition] {
        &self.sources
    }
}

/// Catalog loader
///
/// Loads the catalog `src_{instrument}.csv` in the `{observation}/fxt/products` folder
pub struct CatalogLoader {
    path: PathBuf,
    columns: ColumnMapping,
}
impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            path: PathBuf::from("src.csv"),
            columns: ColumnMapping::default(),
        }
    }
}
impl CatalogLoader {
    /// Sets the catalog of the `instrument` in the `products` folder
    pub fn products<P: AsRef<Path>>(self, products: P, instrument: &str) -> Self {
        Self {
            path: products.as_ref().join(format!("src_{instrument}.csv")),
            ..self
        }
    }
    pub fn columns(self, columns: ColumnMapping) -> Self {
        Self { columns, ..self }
    }
    pub fn load(self) -> Result<Catalog> {
        Catalog::from_path(&self.path, &self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(csv: &str, columns: &ColumnMapping) -> Result<Catalog> {
        Catalog::from_reader(csv.as_bytes(), columns)
    }

    #[test]
    fn detect_j2000_columns() {
        let catalog = read(
            "RAJ2000,DEJ2000,flux\n183.1,-23.5,1e-12\n",
            &ColumnMapping::default(),
        )
        .unwrap();
        assert_eq!(catalog.columns(), ("RAJ2000", "DEJ2000"));
        assert_eq!(catalog.sources(), &[SkyPosition::new(183.1, -23.5)]);
    }

    #[test]
    fn first_matching_column_wins() {
        let catalog = read(
            "id,ra,dec,ra_err,dec_err\n1,10.5,20.25,0.01,0.01\n2,11,21,0.01,0.01\n",
            &ColumnMapping::default(),
        )
        .unwrap();
        assert_eq!(catalog.columns(), ("ra", "dec"));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[1], SkyPosition::new(11., 21.));
    }

    #[test]
    fn case_insensitive_detection() {
        let catalog = read("Ra_deg,DECL\n1,2\n", &ColumnMapping::default()).unwrap();
        assert_eq!(catalog.columns(), ("Ra_deg", "DECL"));
    }

    #[test]
    fn explicit_mapping() {
        let columns = ColumnMapping::default().ra("ra_corr").dec("dec_corr");
        let catalog = read("ra,dec,ra_corr,dec_corr\n1,2,3,4\n", &columns).unwrap();
        assert_eq!(catalog.columns(), ("ra_corr", "dec_corr"));
        assert_eq!(catalog[0], SkyPosition::new(3., 4.));
    }

    #[test]
    fn missing_explicit_column() {
        let columns = ColumnMapping::default().ra("alpha");
        let err = read("ra,dec\n1,2\n", &columns).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingColumn(Coordinate::RightAscension, ref name, _) if name == "alpha"
        ));
    }

    #[test]
    fn no_declination_column() {
        let err = read("ra,flux\n1,2\n", &ColumnMapping::default()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ColumnNotFound(Coordinate::Declination, _)
        ));
    }

    #[test]
    fn no_right_ascension_column() {
        let err = read("x,dec\n1,2\n", &ColumnMapping::default()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ColumnNotFound(Coordinate::RightAscension, _)
        ));
    }

    #[test]
    fn non_numeric_coordinate() {
        let err = read("ra,dec\n1,2\n3,abc\n", &ColumnMapping::default()).unwrap_err();
        match err {
            CatalogError::InvalidCoordinate {
                coordinate,
                column,
                row,
                value,
            } => {
                assert_eq!(coordinate, Coordinate::Declination);
                assert_eq!(column, "dec");
                assert_eq!(row, 2);
                assert_eq!(value, "abc");
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn empty_coordinate() {
        let err = read("ra,dec\n,2\n", &ColumnMapping::default()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::InvalidCoordinate {
                coordinate: Coordinate::RightAscension,
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn header_only() {
        let catalog = read("ra,dec\n", &ColumnMapping::default()).unwrap();
        assert!(catalog.is_empty());
    }
}
