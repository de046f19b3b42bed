mod assemble;
mod currency;
mod data;
mod extract;
mod listing;

pub use assemble::{assemble, tabulate, ResortParts, Table, FIXED_COLUMNS};
pub use currency::{currency_name, normalize_price, NormalizedPrice, PriceError, UNKNOWN_CURRENCY};
pub use data::{sink_for, CsvSink, DatasetSink, JsonSink, XlsxSink, XLSX_SHEET_NAME};
pub use extract::{test_result_page_url, trail_map_page_url, DetailPage};
pub use listing::{last_page_number, listing_entries, page_url, ListingEntry};

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderCategory {
    Adult,
    Youth,
    Child,
}

impl RiderCategory {
    /// Evaluation order. The record's currency comes from the last category
    /// in this order that parsed.
    pub const ALL: [RiderCategory; 3] = [
        RiderCategory::Adult,
        RiderCategory::Youth,
        RiderCategory::Child,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiderCategory::Adult => "Adult",
            RiderCategory::Youth => "Youth",
            RiderCategory::Child => "Child",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum TicketPrice {
    /// No price cell for the category on the page.
    Missing,
    /// The cell was there but its text was not `"<symbol> <amount>"`.
    Unparsed(String),
    Listed(String),
}

impl fmt::Display for TicketPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketPrice::Missing => Ok(()),
            TicketPrice::Unparsed(_) => write!(f, "unparsed"),
            TicketPrice::Listed(amount) => write!(f, "{}", amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketPrices {
    pub adult: TicketPrice,
    pub youth: TicketPrice,
    pub child: TicketPrice,
    pub currency: Option<String>,
}

impl Default for TicketPrices {
    fn default() -> Self {
        TicketPrices {
            adult: TicketPrice::Missing,
            youth: TicketPrice::Missing,
            child: TicketPrice::Missing,
            currency: None,
        }
    }
}

impl TicketPrices {
    pub fn get(&self, category: RiderCategory) -> &TicketPrice {
        match category {
            RiderCategory::Adult => &self.adult,
            RiderCategory::Youth => &self.youth,
            RiderCategory::Child => &self.child,
        }
    }

    pub(crate) fn get_mut(&mut self, category: RiderCategory) -> &mut TicketPrice {
        match category {
            RiderCategory::Adult => &mut self.adult,
            RiderCategory::Youth => &mut self.youth,
            RiderCategory::Child => &mut self.child,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResortRecord {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(flatten)]
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

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

impl fmt::Display for ResortRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Resort Name     : {}", self.name)?;
        writeln!(f, "ID              : {}", self.id)?;
        writeln!(
            f,
            "Location        : {} / {} / {}",
            or_none(&self.location.continent),
            or_none(&self.location.country),
            or_none(&self.location.region)
        )?;
        writeln!(f, "Altitude        : {} m", self.altitude_m)?;
        writeln!(f, "Logo URL        : {}", or_none(&self.logo_url))?;
        writeln!(f, "Website         : {}", or_none(&self.website_url))?;
        writeln!(f, "Trail Map       : {}", or_none(&self.trail_map_url))?;
        writeln!(f, "Description     : {}", or_none(&self.description))?;

        writeln!(f, "Slopes          : ")?;
        for (label, km) in &self.slope_distances_km {
            writeln!(f, "> {}: {} km", label, km)?;
        }
        writeln!(f, "Lifts           : ")?;
        for (label, count) in &self.lift_counts {
            writeln!(f, "> {}: {}", label, count)?;
        }

        let currency = or_none(&self.ticket_prices.currency);
        writeln!(f, "Ticket Prices   : ")?;
        for category in RiderCategory::ALL {
            match self.ticket_prices.get(category) {
                TicketPrice::Missing => writeln!(f, "> {}: None", category.label())?,
                price => writeln!(f, "> {}: {} {}", category.label(), price, currency)?,
            }
        }

        writeln!(f, "Scores          : ")?;
        for (label, score) in &self.quality_scores {
            writeln!(f, "> {}: {}", label, score)?;
        }

        Ok(())
    }
}
