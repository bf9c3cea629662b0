//! Product records and the append-only CSV sink

use crate::error::Result;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Fixed column header of the output table.
pub const CSV_COLUMNS: [&str; 10] = [
    "Image",
    "Title",
    "Avg Review",
    "Review Count",
    "Has Prime",
    "Price",
    "Delivery",
    "Availability",
    "Specifications",
    "URL",
];

/// One scraped product page. Every field except the source URL is optional;
/// a missing field becomes an empty CSV cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub url: String,
    pub image: Option<String>,
    pub title: Option<String>,
    pub avg_review: Option<String>,
    pub review_count: Option<String>,
    pub has_prime: Option<String>,
    pub price: Option<String>,
    pub delivery: Option<String>,
    pub availability: Option<String>,
    pub specifications: Option<String>,
}

impl ProductRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    fn row(&self) -> [&str; 10] {
        [
            self.image.as_deref().unwrap_or(""),
            self.title.as_deref().unwrap_or(""),
            self.avg_review.as_deref().unwrap_or(""),
            self.review_count.as_deref().unwrap_or(""),
            self.has_prime.as_deref().unwrap_or(""),
            self.price.as_deref().unwrap_or(""),
            self.delivery.as_deref().unwrap_or(""),
            self.availability.as_deref().unwrap_or(""),
            self.specifications.as_deref().unwrap_or(""),
            &self.url,
        ]
    }
}

/// Append-only CSV output. The header is written once, when the file is
/// created or still empty; rows from prior runs are never rewritten.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let needs_header = match fs::metadata(&path) {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        };
        if needs_header {
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(CSV_COLUMNS)?;
            writer.flush()?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row.
    pub fn append(&mut self, record: &ProductRecord) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(record.row())?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_written_exactly_once_across_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&ProductRecord::new("https://shop.test/dp/A1")).unwrap();
        drop(sink);

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&ProductRecord::new("https://shop.test/dp/A2")).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let header_lines = text.lines().filter(|l| l.starts_with("Image,")).count();
        assert_eq!(header_lines, 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn missing_fields_become_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let mut record = ProductRecord::new("https://shop.test/dp/B7");
        record.title = Some("Travel Mug".to_string());
        record.price = Some("€ 12,99".to_string());

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&record).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, ",Travel Mug,,,,\"€ 12,99\",,,,https://shop.test/dp/B7");
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");

        let mut record = ProductRecord::new("https://shop.test/dp/C3");
        record.specifications = Some("Color: blue, Size: L".to_string());

        let mut sink = CsvSink::open(&path).unwrap();
        sink.append(&record).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Color: blue, Size: L\""));
    }
}
