use crate::catalog::{CatalogEntry, PackageType};
use crate::IndexHandle;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub package_type: String,
    pub start_city: String,
    pub destination: String,
    pub max_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedHotel {
    pub id: String,
    pub hotel_details: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    pub hotels: Vec<RankedHotel>,
    /// Entries that passed the filter, before any limit.
    pub matched: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    Ranked(RankedResult),
    NoMatch,
}

impl Recommendation {
    pub fn is_no_match(&self) -> bool { matches!(self, Recommendation::NoMatch) }

    pub fn hotels(&self) -> &[RankedHotel] {
        match self {
            Recommendation::Ranked(r) => &r.hotels,
            Recommendation::NoMatch => &[],
        }
    }
}

impl FilterCriteria {
    fn matches(&self, package_type: PackageType, entry: &CatalogEntry) -> bool {
        entry.package_type == package_type
            && entry.start_city == self.start_city
            && entry.destination == self.destination
            && entry.price <= self.max_price
    }
}

/// Filter the catalog, then rank the survivors by mean similarity to the filtered set (self included).
///
/// A `limit` of zero is treated as one, so a non-empty match never comes back as an empty ranking.
pub fn recommend(index: &IndexHandle, criteria: &FilterCriteria, limit: Option<usize>) -> Recommendation {
    let Ok(package_type) = criteria.package_type.parse::<PackageType>() else {
        tracing::info!(package_type = %criteria.package_type, "unrecognized package type; no matching hotels");
        return Recommendation::NoMatch;
    };
    let selected: Vec<usize> = index
        .entries()
        .iter()
        .enumerate()
        .filter(|(_, e)| criteria.matches(package_type, e))
        .map(|(i, _)| i)
        .collect();
    if selected.is_empty() {
        tracing::info!("no matching hotels found for the given criteria");
        return Recommendation::NoMatch;
    }

    let sim = index.similarity();
    let count = selected.len() as f64;
    let mut scored: Vec<(usize, f64)> = selected
        .iter()
        .map(|&i| {
            let row = sim.row(i);
            let total: f64 = selected.iter().map(|&j| row[j]).sum();
            (i, total / count)
        })
        .collect();
    // sort_by is stable, so ties keep corpus order
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    if let Some(k) = limit {
        scored.truncate(k.max(1));
    }

    let entries = index.entries();
    let hotels: Vec<RankedHotel> = scored
        .into_iter()
        .map(|(i, score)| RankedHotel { id: entries[i].id.clone(), hotel_details: entries[i].hotel_details.clone(), score })
        .collect();
    tracing::info!(matched = selected.len(), returned = hotels.len(), "generated hotel recommendations");
    Recommendation::Ranked(RankedResult { hotels, matched: selected.len() })
}
