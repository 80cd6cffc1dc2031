//! Output stage: console display and CSV files.
//!
//! The CSV header row is always written, even for an empty result set.
//! Multi-valued fields are joined with `"; "`.

use crate::error::Result;
use crate::extract::{PaperRecord, RecordLayout};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Separator for multi-valued CSV fields
pub const LIST_SEPARATOR: &str = "; ";

/// Column order for the basic layout
pub const BASIC_COLUMNS: &[&str] = &["PubmedID", "Title", "Publication Date"];

/// Column order for the full layout
pub const FULL_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academic Author(s)",
    "Company Affiliation(s)",
    "Corresponding Author Email",
];

/// Header row for `layout`
pub fn columns(layout: RecordLayout) -> &'static [&'static str] {
    match layout {
        RecordLayout::Basic => BASIC_COLUMNS,
        RecordLayout::Full => FULL_COLUMNS,
    }
}

#[derive(Debug, Serialize)]
struct BasicRow<'a> {
    #[serde(rename = "PubmedID")]
    pubmed_id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Publication Date")]
    publication_year: &'a str,
}

#[derive(Debug, Serialize)]
struct FullRow<'a> {
    #[serde(rename = "PubmedID")]
    pubmed_id: &'a str,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Publication Date")]
    publication_year: &'a str,
    #[serde(rename = "Non-academic Author(s)")]
    non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)")]
    company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    corresponding_email: &'a str,
}

/// Row as read back from either layout
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "PubmedID")]
    pubmed_id: String,
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Publication Date")]
    publication_year: String,
    #[serde(rename = "Non-academic Author(s)", default)]
    non_academic_authors: String,
    #[serde(rename = "Company Affiliation(s)", default)]
    company_affiliations: String,
    #[serde(rename = "Corresponding Author Email", default)]
    corresponding_email: String,
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Save records to a CSV file
pub fn write_csv(path: &Path, records: &[PaperRecord], layout: RecordLayout) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_path(path)?;

    wtr.write_record(columns(layout))?;

    for record in records {
        match layout {
            RecordLayout::Basic => wtr.serialize(BasicRow {
                pubmed_id: &record.pubmed_id,
                title: &record.title,
                publication_year: &record.publication_year,
            })?,
            RecordLayout::Full => wtr.serialize(FullRow {
                pubmed_id: &record.pubmed_id,
                title: &record.title,
                publication_year: &record.publication_year,
                non_academic_authors: record.non_academic_authors.join(LIST_SEPARATOR),
                company_affiliations: record.company_affiliations.join(LIST_SEPARATOR),
                corresponding_email: &record.corresponding_email,
            })?,
        }
    }

    wtr.flush()?;
    info!(path = ?path, count = records.len(), "Saved CSV");
    Ok(())
}

/// Load records from a CSV file written by [`write_csv`] in either layout
pub fn read_csv(path: &Path) -> Result<Vec<PaperRecord>> {
    let mut rdr = csv::Reader::from_path(path)?;

    let mut records = Vec::new();
    for row in rdr.deserialize::<CsvRow>() {
        let row = row?;
        records.push(PaperRecord {
            pubmed_id: row.pubmed_id,
            title: row.title,
            publication_year: row.publication_year,
            non_academic_authors: split_list(&row.non_academic_authors),
            company_affiliations: split_list(&row.company_affiliations),
            corresponding_email: row.corresponding_email,
        });
    }

    Ok(records)
}

/// Print records as labelled blocks separated by a dashed line
pub fn display_records<W: Write>(out: &mut W, records: &[PaperRecord], layout: RecordLayout) -> Result<()> {
    for record in records {
        writeln!(out, "PubmedID: {}", record.pubmed_id)?;
        writeln!(out, "Title: {}", record.title)?;
        writeln!(out, "Publication Date: {}", record.publication_year)?;
        if layout == RecordLayout::Full {
            writeln!(out, "Non-academic Author(s): {}", record.non_academic_authors.join(LIST_SEPARATOR))?;
            writeln!(out, "Company Affiliation(s): {}", record.company_affiliations.join(LIST_SEPARATOR))?;
            writeln!(out, "Corresponding Author Email: {}", record.corresponding_email)?;
        }
        writeln!(out, "-----------------------------")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample() -> Vec<PaperRecord> {
        vec![
            PaperRecord {
                pubmed_id: "38000001".to_string(),
                title: "Checkpoint inhibitors, \"quoted\" & more".to_string(),
                publication_year: "2023".to_string(),
                non_academic_authors: vec!["Smith".to_string(), "Lee".to_string()],
                company_affiliations: vec!["XYZ Pharma Inc.".to_string(), "Acme Biotech GmbH, Berlin".to_string()],
                corresponding_email: "jane@xyzpharma.com".to_string(),
            },
            PaperRecord {
                pubmed_id: "38000002".to_string(),
                title: "N/A".to_string(),
                publication_year: "Unknown".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_full_round_trip() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let records = sample();

        write_csv(temp.path(), &records, RecordLayout::Full)?;
        assert_eq!(read_csv(temp.path())?, records);
        Ok(())
    }

    #[test]
    fn test_basic_round_trip() -> Result<()> {
        let temp = NamedTempFile::new()?;
        let records = sample();

        write_csv(temp.path(), &records, RecordLayout::Basic)?;
        let loaded = read_csv(temp.path())?;
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].pubmed_id, "38000001");
        assert_eq!(loaded[0].title, records[0].title);
        assert!(loaded[0].non_academic_authors.is_empty());
        assert_eq!(loaded[1].publication_year, "Unknown");

        let content = std::fs::read_to_string(temp.path())?;
        assert_eq!(content.lines().next(), Some("PubmedID,Title,Publication Date"));
        Ok(())
    }

    #[test]
    fn test_header_written_for_empty_results() -> Result<()> {
        let temp = NamedTempFile::new()?;
        write_csv(temp.path(), &[], RecordLayout::Full)?;

        let content = std::fs::read_to_string(temp.path())?;
        assert_eq!(
            content.trim_end(),
            "PubmedID,Title,Publication Date,Non-academic Author(s),Company Affiliation(s),Corresponding Author Email"
        );
        assert!(read_csv(temp.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_display_records() -> Result<()> {
        let mut out = Vec::new();
        display_records(&mut out, &sample()[..1], RecordLayout::Full)?;
        let text = String::from_utf8_lossy(&out);

        assert!(text.contains("PubmedID: 38000001\n"));
        assert!(text.contains("Non-academic Author(s): Smith; Lee\n"));
        assert!(text.contains("Corresponding Author Email: jane@xyzpharma.com\n"));

        let mut basic = Vec::new();
        display_records(&mut basic, &sample()[..1], RecordLayout::Basic)?;
        assert!(!String::from_utf8_lossy(&basic).contains("Non-academic"));
        Ok(())
    }
}
