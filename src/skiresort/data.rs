use super::{tabulate, ResortRecord};
use crate::CrawlerError;
use rust_xlsxwriter::Workbook;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const XLSX_SHEET_NAME: &str = "sheet1";

pub trait DatasetSink {
    fn write(&self, records: &[ResortRecord], path: &Path) -> Result<(), CrawlerError>;
}

/// One row per resort under the reconciled column schema.
#[derive(Debug, Default)]
pub struct CsvSink;

impl DatasetSink for CsvSink {
    fn write(&self, records: &[ResortRecord], path: &Path) -> Result<(), CrawlerError> {
        let table = tabulate(records);
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&table.headers)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct JsonSink;

impl DatasetSink for JsonSink {
    fn write(&self, records: &[ResortRecord], path: &Path) -> Result<(), CrawlerError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.flush()?;
        Ok(())
    }
}

/// Excel workbook with the same table as `CsvSink` on a single sheet.
#[derive(Debug, Default)]
pub struct XlsxSink;

impl DatasetSink for XlsxSink {
    fn write(&self, records: &[ResortRecord], path: &Path) -> Result<(), CrawlerError> {
        let table = tabulate(records);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(XLSX_SHEET_NAME)?;

        for (row, cells) in std::iter::once(&table.headers)
            .chain(table.rows.iter())
            .enumerate()
        {
            for (col, cell) in cells.iter().enumerate() {
                sheet.write_string(row as u32, col as u16, cell)?;
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

/// JSON for a `.json` path, an Excel workbook for `.xlsx`, CSV otherwise.
pub fn sink_for(path: &Path) -> Box<dyn DatasetSink + Send + Sync> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Box::new(JsonSink),
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Box::new(XlsxSink),
        _ => Box::new(CsvSink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skiresort::{Location, TicketPrice, TicketPrices};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    fn record(id: &str, lifts: &[(&str, u32)]) -> ResortRecord {
        ResortRecord {
            id: id.to_string(),
            url: format!("https://www.skiresort.info/ski-resort/{}/", id),
            name: id.to_uppercase(),
            location: Location::default(),
            altitude_m: 1800.0,
            description: Some("Nice, \"quiet\" resort".to_string()),
            logo_url: None,
            website_url: None,
            trail_map_url: None,
            slope_distances_km: IndexMap::new(),
            lift_counts: lifts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ticket_prices: TicketPrices {
                adult: TicketPrice::Listed("45".to_string()),
                ..TicketPrices::default()
            },
            quality_scores: IndexMap::new(),
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        if path.is_file() {
            fs::remove_file(&path).unwrap();
        }
        path
    }

    #[test]
    fn csv_rows_align_under_union_schema() {
        let path = temp_path("skiresort-sink-test.csv");
        let records = vec![
            record("a", &[("Chairlift", 2)]),
            record("b", &[("Gondola lift", 1)]),
        ];
        sink_for(&path).write(&records, &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 17);
        assert_eq!(&headers[15], "lift:Chairlift");
        assert_eq!(&headers[16], "lift:Gondola lift");

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][7], "Nice, \"quiet\" resort");
        assert_eq!(&rows[0][15], "2");
        assert_eq!(&rows[0][16], "");
        assert_eq!(&rows[1][15], "");
        assert_eq!(&rows[1][16], "1");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn empty_run_still_writes_header() {
        let path = temp_path("skiresort-sink-empty.csv");
        CsvSink.write(&[], &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("ID,Resort Name,URL"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn json_keeps_typed_fields() {
        let path = temp_path("skiresort-sink-test.json");
        sink_for(&path)
            .write(&[record("a", &[("Chairlift", 2)])], &path)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["id"], "a");
        assert_eq!(value[0]["altitudeM"], 1800.0);
        assert_eq!(value[0]["liftCounts"]["Chairlift"], 2);
        assert_eq!(
            value[0]["ticketPrices"]["adult"],
            serde_json::json!({"status": "listed", "value": "45"})
        );
        assert_eq!(
            value[0]["ticketPrices"]["child"],
            serde_json::json!({"status": "missing"})
        );
        assert_eq!(value[0]["continent"], serde_json::Value::Null);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn xlsx_path_writes_workbook() {
        let path = temp_path("skiresort-sink-test.xlsx");
        sink_for(&path)
            .write(
                &[record("a", &[("Chairlift", 2)]), record("b", &[])],
                &path,
            )
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..4], b"PK\x03\x04");
        assert!(contains(&bytes, b"xl/worksheets/sheet1.xml"));

        fs::remove_file(&path).unwrap();
    }

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }
}
