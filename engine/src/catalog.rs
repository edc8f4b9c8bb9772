use anyhow::{bail, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Joins hotel details and destination in the composite text field.
pub const TEXT_SEPARATOR: char = '|';
/// Placeholder for missing hotel details.
pub const NOT_AVAILABLE: &str = "Not Available";
/// Default row cap. The similarity matrix is dense, so memory grows with the square of this.
pub const DEFAULT_SAMPLE_SIZE: usize = 5000;
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackageType {
    Deluxe,
    Standard,
    Premium,
    Luxury,
    Budget,
}

impl PackageType {
    pub const ALL: [PackageType; 5] = [Self::Deluxe, Self::Standard, Self::Premium, Self::Luxury, Self::Budget];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deluxe => "Deluxe",
            Self::Standard => "Standard",
            Self::Premium => "Premium",
            Self::Luxury => "Luxury",
            Self::Budget => "Budget",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown package type: {0}")]
pub struct UnknownPackageType(pub String);

impl FromStr for PackageType {
    type Err = UnknownPackageType;

    // Case-sensitive, like the rest of the filter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPackageType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub id: String,
    pub package_type: PackageType,
    pub start_city: String,
    pub destination: String,
    pub hotel_details: String,
    pub price: f64,
    /// Hotel details and destination joined by `TEXT_SEPARATOR`.
    pub text: String,
}

impl CatalogEntry {
    pub fn new(
        id: impl Into<String>,
        package_type: PackageType,
        start_city: impl Into<String>,
        destination: impl Into<String>,
        hotel_details: impl Into<String>,
        price: f64,
    ) -> Self {
        let destination = destination.into();
        let hotel_details = hotel_details.into();
        let text = format!("{hotel_details}{TEXT_SEPARATOR}{destination}");
        Self { id: id.into(), package_type, start_city: start_city.into(), destination, hotel_details, price, text }
    }
}

/// One uncleaned JSON record; CSV rows are converted into it from `CsvRecord`.
#[derive(Debug, Deserialize)]
struct RawRecord {
    id: String,
    package_type: String,
    start_city: String,
    destination: String,
    #[serde(default)]
    hotel_details: Option<String>,
    #[serde(default)]
    price: Option<serde_json::Value>,
}

fn parse_price(v: Option<&serde_json::Value>) -> Option<f64> {
    let price = match v? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().ok()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}

/// Applies the catalog cleanup rules while collecting entries in input order.
#[derive(Default)]
struct Cleaner {
    entries: Vec<CatalogEntry>,
    seen: HashSet<String>,
    skipped: usize,
}

impl Cleaner {
    fn push(&mut self, raw: RawRecord) {
        let Ok(package_type) = raw.package_type.parse::<PackageType>() else {
            self.skipped += 1;
            return;
        };
        let Some(price) = parse_price(raw.price.as_ref()) else {
            tracing::warn!(id = %raw.id, "skipping row with invalid price");
            self.skipped += 1;
            return;
        };
        if !self.seen.insert(raw.id.clone()) {
            tracing::warn!(id = %raw.id, "skipping duplicate id");
            self.skipped += 1;
            return;
        }
        let details = raw
            .hotel_details
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.entries.push(CatalogEntry::new(raw.id, package_type, raw.start_city, raw.destination, details, price));
    }

    fn push_json(&mut self, value: serde_json::Result<RawRecord>, line: usize) {
        match value {
            Ok(raw) => self.push(raw),
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping malformed record");
                self.skipped += 1;
            }
        }
    }

    fn finish(self, source: &Path) -> Vec<CatalogEntry> {
        tracing::info!(path = %source.display(), kept = self.entries.len(), skipped = self.skipped, "catalog loaded");
        self.entries
    }
}

/// Load and clean a catalog. `.csv` uses the original column headers; `.json`/`.jsonl` use snake_case fields.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("csv") => load_csv(path),
        Some("jsonl") => load_jsonl(path),
        Some("json") => load_json(path),
        _ => bail!("unsupported catalog format: {}", path.display()),
    }
}

fn load_csv(path: &Path) -> Result<Vec<CatalogEntry>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers = reader.headers()?.clone();
    let mut cleaner = Cleaner::default();
    for row in reader.records() {
        // Malformed lines are dropped rather than failing the load.
        let Ok(row) = row else {
            cleaner.skipped += 1;
            continue;
        };
        match row.deserialize::<CsvRecord>(Some(&headers)) {
            Ok(rec) => cleaner.push(rec.into()),
            Err(_) => cleaner.skipped += 1,
        }
    }
    Ok(cleaner.finish(path))
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "Uniq Id")]
    id: String,
    #[serde(rename = "Package Type")]
    package_type: String,
    #[serde(rename = "Start City")]
    start_city: String,
    #[serde(rename = "Destination")]
    destination: String,
    #[serde(rename = "Hotel Details", default)]
    hotel_details: Option<String>,
    #[serde(rename = "Price Per Two Persons", default)]
    price: Option<String>,
}

impl From<CsvRecord> for RawRecord {
    fn from(r: CsvRecord) -> Self {
        Self {
            id: r.id,
            package_type: r.package_type,
            start_city: r.start_city,
            destination: r.destination,
            hotel_details: r.hotel_details,
            price: r.price.map(serde_json::Value::String),
        }
    }
}

fn load_jsonl(path: &Path) -> Result<Vec<CatalogEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut cleaner = Cleaner::default();
    for (n, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        cleaner.push_json(serde_json::from_str(&line), n + 1);
    }
    Ok(cleaner.finish(path))
}

fn load_json(path: &Path) -> Result<Vec<CatalogEntry>> {
    let reader = BufReader::new(File::open(path)?);
    // Only the array itself must parse; bad elements are skipped one by one.
    let records: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let mut cleaner = Cleaner::default();
    for (n, rec) in records.into_iter().enumerate() {
        cleaner.push_json(serde_json::from_value(rec), n + 1);
    }
    Ok(cleaner.finish(path))
}

/// Keep at most `size` entries chosen by a seeded shuffle, preserving input order. `size == 0` keeps all.
pub fn sample_entries(entries: Vec<CatalogEntry>, size: usize, seed: u64) -> Vec<CatalogEntry> {
    if size == 0 || entries.len() <= size {
        return entries;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked: Vec<usize> = (0..entries.len()).collect();
    picked.shuffle(&mut rng);
    picked.truncate(size);
    picked.sort_unstable();

    let total = entries.len();
    let mut keep = picked.into_iter().peekable();
    let sampled: Vec<CatalogEntry> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(i, e)| keep.next_if_eq(&i).map(|_| e))
        .collect();
    tracing::info!(total, kept = sampled.len(), seed, "catalog sampled");
    sampled
}

/// Distinct filter values in first-seen order, plus the highest price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Facets {
    pub package_types: Vec<PackageType>,
    pub start_cities: Vec<String>,
    pub destinations: Vec<String>,
    pub max_price: f64,
}

impl Facets {
    pub fn from_entries(entries: &[CatalogEntry]) -> Self {
        let mut facets = Facets::default();
        for e in entries {
            if !facets.package_types.contains(&e.package_type) {
                facets.package_types.push(e.package_type);
            }
            if !facets.start_cities.contains(&e.start_city) {
                facets.start_cities.push(e.start_city.clone());
            }
            if !facets.destinations.contains(&e.destination) {
                facets.destinations.push(e.destination.clone());
            }
            facets.max_price = facets.max_price.max(e.price);
        }
        facets
    }
}
