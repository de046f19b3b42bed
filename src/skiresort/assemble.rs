use super::{DetailPage, Location, RiderCategory, ResortRecord, TicketPrices, UNKNOWN_NAME};
use indexmap::IndexMap;
use itertools::Itertools;
use lazy_regex::regex;
use std::ops::AddAssign;

/// Outputs of the individual extractors for one resort.
#[derive(Debug, Clone, PartialEq)]
pub struct ResortParts {
    pub id: String,
    pub url: String,
    pub name: String,
    pub location: Location,
    pub altitude_m: f64,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub trail_map_url: Option<String>,
    pub slope_distances_km: IndexMap<String, f64>,
    pub lift_counts: IndexMap<String, u32>,
    pub ticket_prices: TicketPrices,
    pub quality_scores: IndexMap<String, f64>,
}

impl From<DetailPage> for ResortParts {
    fn from(page: DetailPage) -> Self {
        ResortParts {
            id: page.id,
            url: page.url,
            name: page.name,
            location: Location::default(),
            altitude_m: page.altitude_m,
            description: page.description,
            logo_url: page.logo_url,
            website_url: page.website_url,
            trail_map_url: None,
            slope_distances_km: page.slope_distances_km,
            lift_counts: page.lift_counts,
            ticket_prices: page.ticket_prices,
            quality_scores: IndexMap::new(),
        }
    }
}

/// `"  Very   difficult: "` -> `"Very difficult"`.
fn normalize_label(label: &str) -> String {
    let label = regex!(r"\s+").replace_all(label.trim(), " ");
    label.trim_end_matches(':').trim_end().to_string()
}

/// Re-keys a label map on normalized labels. Entries whose labels collapse
/// to the same key are added up, empty labels are dropped.
fn merge_labels<V>(map: IndexMap<String, V>) -> IndexMap<String, V>
where
    V: AddAssign + Copy,
{
    let mut merged: IndexMap<String, V> = IndexMap::new();
    for (label, value) in map {
        let label = normalize_label(&label);
        if label.is_empty() {
            continue;
        }
        merged
            .entry(label)
            .and_modify(|v| *v += value)
            .or_insert(value);
    }
    merged
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn assemble(parts: ResortParts) -> ResortRecord {
    let name = parts.name.trim();
    let name = if name.is_empty() { UNKNOWN_NAME } else { name };

    let altitude_m = if parts.altitude_m.is_finite() && parts.altitude_m > 0.0 {
        parts.altitude_m
    } else {
        0.0
    };

    let quality_scores = parts
        .quality_scores
        .into_iter()
        .filter(|(_, score)| (0.0..=10.0).contains(score))
        .map(|(label, score)| (normalize_label(&label), score))
        .filter(|(label, _)| !label.is_empty())
        .collect();

    ResortRecord {
        id: parts.id,
        url: parts.url,
        name: name.to_string(),
        location: Location {
            continent: clean_optional(parts.location.continent),
            country: clean_optional(parts.location.country),
            region: clean_optional(parts.location.region),
        },
        altitude_m,
        description: clean_optional(parts.description),
        logo_url: parts.logo_url,
        website_url: parts.website_url,
        trail_map_url: parts.trail_map_url,
        slope_distances_km: merge_labels(parts.slope_distances_km),
        lift_counts: merge_labels(parts.lift_counts),
        ticket_prices: parts.ticket_prices,
        quality_scores,
    }
}

pub const FIXED_COLUMNS: [&str; 15] = [
    "ID",
    "Resort Name",
    "URL",
    "Continent",
    "Country",
    "Region",
    "Altitude",
    "Description",
    "Logo URL",
    "Website",
    "Trail Map",
    "Adult",
    "Youth",
    "Child",
    "Currency",
];

/// Records flattened under one column schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn fixed_cells(record: &ResortRecord) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let mut cells = vec![
        record.id.clone(),
        record.name.clone(),
        record.url.clone(),
        opt(&record.location.continent),
        opt(&record.location.country),
        opt(&record.location.region),
        record.altitude_m.to_string(),
        opt(&record.description),
        opt(&record.logo_url),
        opt(&record.website_url),
        opt(&record.trail_map_url),
    ];
    for category in RiderCategory::ALL {
        cells.push(record.ticket_prices.get(category).to_string());
    }
    cells.push(opt(&record.ticket_prices.currency));
    cells
}

/// Union of the keys of one label map across the batch, in first-seen order.
fn union_keys<'a, V: 'a, F>(records: &'a [ResortRecord], map: F) -> Vec<String>
where
    F: Fn(&'a ResortRecord) -> &'a IndexMap<String, V>,
{
    records
        .iter()
        .flat_map(|r| map(r).keys())
        .unique()
        .cloned()
        .collect()
}

fn sparse_cells<V: ToString>(keys: &[String], map: &IndexMap<String, V>) -> Vec<String> {
    keys.iter()
        .map(|k| map.get(k).map(ToString::to_string).unwrap_or_default())
        .collect()
}

/// Reconciles per-resort label maps into one sparse table. Every slope,
/// lift and score label seen in any record gets a column; records without
/// that label get an empty cell.
pub fn tabulate(records: &[ResortRecord]) -> Table {
    let slope_keys = union_keys(records, |r| &r.slope_distances_km);
    let lift_keys = union_keys(records, |r| &r.lift_counts);
    let score_keys = union_keys(records, |r| &r.quality_scores);

    let headers = FIXED_COLUMNS
        .iter()
        .map(ToString::to_string)
        .chain(slope_keys.iter().map(|k| format!("slope:{}", k)))
        .chain(lift_keys.iter().map(|k| format!("lift:{}", k)))
        .chain(score_keys.iter().map(|k| format!("score:{}", k)))
        .collect_vec();

    let rows = records
        .iter()
        .map(|r| {
            let mut row = fixed_cells(r);
            row.extend(sparse_cells(&slope_keys, &r.slope_distances_km));
            row.extend(sparse_cells(&lift_keys, &r.lift_counts));
            row.extend(sparse_cells(&score_keys, &r.quality_scores));
            row
        })
        .collect();

    Table { headers, rows }
}
