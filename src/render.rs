//! Text rendering of catalog listings and records

use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::data::DatasetRecord;

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Dataset Name")]
    dataset_name: String,
    #[tabled(rename = "Date Created")]
    date_created: String,
    #[tabled(rename = "Datatypes")]
    datatypes: String,
}

impl From<&DatasetRecord> for RecordRow {
    fn from(record: &DatasetRecord) -> Self {
        Self {
            name: record.name.clone(),
            dataset_name: record.dataset.name.clone(),
            date_created: record
                .date_created
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            datatypes: record.datatypes().join(", "),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

/// Capitalizes a source name for use as a title ("psets" -> "Psets")
pub fn title(source: &str) -> String {
    let mut chars = source.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Source header followed by one bulleted name per line
pub fn names_pretty(source: &str, names: &[String]) -> String {
    let mut out = format!("{source}:\n");
    for name in names {
        out.push_str(&format!("  - {name}\n"));
    }
    out
}

/// One bare name per line, or `source,name` when a source is given
pub fn names_plain(source: Option<&str>, names: &[String]) -> String {
    names
        .iter()
        .map(|name| match source {
            Some(source) => format!("{source},{name}\n"),
            None => format!("{name}\n"),
        })
        .collect()
}

/// Titled table with one row per record
pub fn records_table(source: &str, records: &[DatasetRecord]) -> String {
    let rows: Vec<RecordRow> = records.iter().map(RecordRow::from).collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    format!("{}\n{table}", title(source))
}

/// Field/value summary of a single record
pub fn record_summary(record: &DatasetRecord) -> String {
    let or_na = |value: Option<&str>| value.unwrap_or("N/A").to_string();
    let datatypes = record.datatypes();
    let rows = vec![
        FieldRow {
            field: "Name",
            value: record.name.clone(),
        },
        FieldRow {
            field: "DOI",
            value: or_na(record.doi.as_deref()),
        },
        FieldRow {
            field: "Date Created",
            value: record
                .date_created
                .map(|date| date.format("%Y-%m-%dT%H:%M:%S").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        },
        FieldRow {
            field: "Download Link",
            value: or_na(record.download_link()),
        },
        FieldRow {
            field: "Dataset Name",
            value: record.dataset.name.clone(),
        },
        FieldRow {
            field: "Dataset Version",
            value: record.dataset.version_info.version.clone(),
        },
        FieldRow {
            field: "Publication",
            value: or_na(
                record
                    .dataset
                    .version_info
                    .publications
                    .first()
                    .map(|p| p.link.as_str()),
            ),
        },
        FieldRow {
            field: "Available Datatypes",
            value: if datatypes.is_empty() {
                "N/A".to_string()
            } else {
                datatypes.join(", ")
            },
        },
    ];

    Table::new(&rows).with(Style::rounded()).to_string()
}
