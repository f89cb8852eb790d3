//! Per-source record parsers
//!
//! Each ORCESTRA endpoint returns the same JSON layout, but the guarantees
//! differ: pharmacogenomic sets always carry a sensitivity block and a genome
//! type on every datatype, while the toxicogenomic and xenograft sets often
//! omit genome types and leave the dataset type null.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{
    AvailableDatatype, Dataset, DatasetRecord, DatasetType, GenomeType, MicroarrayType, Publication,
    Sensitivity, VersionInfo,
};

/// Converts one raw catalog element into a record
pub type RecordParser = fn(&Value) -> Result<DatasetRecord, RecordError>;

/// Errors that can occur when parsing a catalog element
#[derive(Debug, Error)]
pub enum RecordError {
    /// The element does not match the expected JSON layout
    #[error("unexpected record layout: {0}")]
    Json(#[from] serde_json::Error),

    /// A field this source guarantees is absent
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A field holds a value outside its known set
    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },

    /// `dateCreated` could not be parsed
    #[error("invalid creation date '{0}'")]
    InvalidDate(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    name: String,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    download_link: Option<String>,
    #[serde(default)]
    date_created: Option<String>,
    dataset: RawDataset,
    #[serde(default)]
    available_datatypes: Vec<RawDatatype>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDataset {
    name: String,
    version_info: RawVersionInfo,
    #[serde(default)]
    sensitivity: Option<Sensitivity>,
}

#[derive(Debug, Deserialize)]
struct RawVersionInfo {
    version: String,
    #[serde(default, rename = "type")]
    dataset_type: Option<String>,
    #[serde(default)]
    publication: Vec<Publication>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatatype {
    name: String,
    #[serde(default)]
    genome_type: Option<GenomeType>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    details: Option<RawDatatypeDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDatatypeDetails {
    #[serde(default)]
    microarray_type: Option<MicroarrayType>,
}

/// How strictly a source's elements are validated
#[derive(Debug, Clone, Copy)]
struct Rules {
    require_genome_type: bool,
    require_sensitivity: bool,
    dataset_type: TypeRule,
}

#[derive(Debug, Clone, Copy)]
enum TypeRule {
    /// Unknown values are an error
    Strict,
    /// Unknown values are dropped
    Lenient,
    /// The field is always null upstream
    Ignored,
}

/// Parses a PharmacoSet element (`psets` endpoint)
pub fn parse_pharmaco_set(raw: &Value) -> Result<DatasetRecord, RecordError> {
    parse_with(
        raw,
        Rules {
            require_genome_type: true,
            require_sensitivity: true,
            dataset_type: TypeRule::Strict,
        },
    )
}

/// Parses a ToxicoSet element (`toxicosets` endpoint)
pub fn parse_toxico_set(raw: &Value) -> Result<DatasetRecord, RecordError> {
    parse_with(
        raw,
        Rules {
            require_genome_type: false,
            require_sensitivity: false,
            dataset_type: TypeRule::Ignored,
        },
    )
}

/// Parses a XevaSet element (`xevasets` endpoint)
pub fn parse_xeva_set(raw: &Value) -> Result<DatasetRecord, RecordError> {
    parse_toxico_set(raw)
}

/// Parses a RadioSet element (`radiosets` endpoint)
pub fn parse_radio_set(raw: &Value) -> Result<DatasetRecord, RecordError> {
    parse_with(
        raw,
        Rules {
            require_genome_type: false,
            require_sensitivity: false,
            dataset_type: TypeRule::Lenient,
        },
    )
}

/// Parses a clinical ICB set element (`clinical_icb` endpoint)
pub fn parse_clinical_icb_set(raw: &Value) -> Result<DatasetRecord, RecordError> {
    parse_with(
        raw,
        Rules {
            require_genome_type: true,
            require_sensitivity: false,
            dataset_type: TypeRule::Lenient,
        },
    )
}

fn parse_with(raw: &Value, rules: Rules) -> Result<DatasetRecord, RecordError> {
    let record = RawRecord::deserialize(raw)?;
    debug!(name = %record.name, "Parsing record");

    let dataset_type = match (rules.dataset_type, record.dataset.version_info.dataset_type) {
        (TypeRule::Ignored, _) | (_, None) => None,
        (TypeRule::Lenient, Some(value)) => value.parse().ok(),
        (TypeRule::Strict, Some(value)) => Some(value.parse::<DatasetType>().map_err(|_| {
            RecordError::InvalidValue {
                field: "dataset.versionInfo.type",
                value,
            }
        })?),
    };

    if rules.require_sensitivity && record.dataset.sensitivity.is_none() {
        return Err(RecordError::MissingField("dataset.sensitivity"));
    }

    let available_datatypes = record
        .available_datatypes
        .into_iter()
        .map(|adt| {
            if rules.require_genome_type && adt.genome_type.is_none() {
                return Err(RecordError::MissingField("availableDatatypes[].genomeType"));
            }
            Ok(AvailableDatatype {
                name: adt.name,
                genome_type: adt.genome_type,
                source: adt.source,
                microarray_type: adt.details.and_then(|d| d.microarray_type),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let date_created = record
        .date_created
        .as_deref()
        .filter(|value| !value.is_empty())
        .map(parse_date_created)
        .transpose()?;

    Ok(DatasetRecord {
        name: record.name,
        doi: record.doi,
        download_link: record.download_link,
        date_created,
        dataset: Dataset {
            name: record.dataset.name,
            version_info: VersionInfo {
                version: record.dataset.version_info.version,
                dataset_type,
                publications: record.dataset.version_info.publication,
            },
            sensitivity: record.dataset.sensitivity,
        },
        available_datatypes,
    })
}

/// Parses `dateCreated`, accepting naive ISO-8601, a trailing `Z`, an
/// explicit offset, or a bare date
fn parse_date_created(value: &str) -> Result<NaiveDateTime, RecordError> {
    let trimmed = value.trim_end_matches('Z');
    if let Ok(dt) = trimmed.parse::<NaiveDateTime>() {
        return Ok(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| RecordError::InvalidDate(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn pset_json() -> Value {
        json!({
            "name": "GDSC_2020(v2-8.2)",
            "doi": "10.5281/zenodo.5787145",
            "downloadLink": "https://zenodo.org/record/5787145/files/GDSC2.rds?download=1",
            "dateCreated": "2021-12-16T20:13:40.374Z",
            "dataset": {
                "name": "GDSC",
                "versionInfo": {
                    "version": "2-8.2",
                    "type": "sensitivity",
                    "publication": [
                        {"citation": "Yang et al. 2013", "link": "https://doi.org/10.1093/nar/gks1111"}
                    ]
                },
                "sensitivity": {"version": "8.2", "source": "GDSC"}
            },
            "availableDatatypes": [
                {"name": "rnaseq", "genomeType": "RNA"},
                {"name": "mutation", "genomeType": "DNA", "source": "Sanger"},
                {
                    "name": "microarray",
                    "genomeType": "RNA",
                    "details": {"microarrayType": {"label": "HG-U133A", "name": "hgu133a"}}
                }
            ]
        })
    }

    fn toxico_json() -> Value {
        json!({
            "name": "TGGATEs_humanLDH",
            "doi": "10.5281/zenodo.4584614",
            "downloadLink": "https://zenodo.org/record/4584614/files/TGGATES.rds",
            "dateCreated": "2021-03-05T18:22:11Z",
            "dataset": {
                "name": "TGGATEs",
                "versionInfo": {"version": "1.0", "type": null, "publication": []}
            },
            "availableDatatypes": [{"name": "microarray"}]
        })
    }

    #[test]
    fn test_parse_pharmaco_set_full_record() {
        let record = parse_pharmaco_set(&pset_json()).expect("Should parse pset");

        assert_eq!(record.name, "GDSC_2020(v2-8.2)");
        assert_eq!(record.dataset.name, "GDSC");
        assert_eq!(
            record.dataset.version_info.dataset_type,
            Some(DatasetType::Sensitivity)
        );
        assert_eq!(record.dataset.version_info.publications.len(), 1);
        assert_eq!(record.dataset.sensitivity.as_ref().unwrap().source, "GDSC");
        assert_eq!(record.datatypes(), vec!["rnaseq", "mutation", "microarray"]);
        assert_eq!(record.available_datatypes[1].source.as_deref(), Some("Sanger"));
        assert!(record.available_datatypes[0].microarray_type.is_none());
        assert_eq!(
            record.available_datatypes[2].microarray_type,
            Some(MicroarrayType {
                label: "HG-U133A".to_string(),
                name: "hgu133a".to_string(),
            })
        );

        let created = record.date_created.expect("Should parse date");
        assert_eq!((created.year(), created.month(), created.day()), (2021, 12, 16));
        assert_eq!(created.hour(), 20);
    }

    #[test]
    fn test_parse_pharmaco_set_requires_sensitivity() {
        let mut raw = pset_json();
        raw["dataset"].as_object_mut().unwrap().remove("sensitivity");

        let err = parse_pharmaco_set(&raw).unwrap_err();
        assert!(matches!(err, RecordError::MissingField("dataset.sensitivity")));
    }

    #[test]
    fn test_parse_pharmaco_set_requires_genome_type() {
        let mut raw = pset_json();
        raw["availableDatatypes"] = json!([{"name": "rnaseq"}]);

        assert!(matches!(
            parse_pharmaco_set(&raw),
            Err(RecordError::MissingField(_))
        ));
    }

    #[test]
    fn test_parse_pharmaco_set_rejects_unknown_type() {
        let mut raw = pset_json();
        raw["dataset"]["versionInfo"]["type"] = json!("mystery");

        let err = parse_pharmaco_set(&raw).unwrap_err();
        assert!(err.to_string().contains("mystery"));
    }

    #[test]
    fn test_parse_toxico_set_is_lenient() {
        let record = parse_toxico_set(&toxico_json()).expect("Should parse toxicoset");

        assert_eq!(record.name, "TGGATEs_humanLDH");
        assert!(record.dataset.version_info.dataset_type.is_none());
        assert!(record.dataset.sensitivity.is_none());
        assert_eq!(record.available_datatypes[0].genome_type, None);
        assert!(record.date_created.is_some());
    }

    #[test]
    fn test_parse_xeva_set_without_datatypes() {
        let mut raw = toxico_json();
        raw.as_object_mut().unwrap().remove("availableDatatypes");
        raw.as_object_mut().unwrap().remove("dateCreated");

        let record = parse_xeva_set(&raw).expect("Should parse xevaset");
        assert!(record.available_datatypes.is_empty());
        assert!(record.date_created.is_none());
    }

    #[test]
    fn test_parse_clinical_icb_keeps_known_type_and_requires_genome() {
        let mut raw = toxico_json();
        raw["dataset"]["versionInfo"]["type"] = json!("both");
        raw["availableDatatypes"] = json!([{"name": "rnaseq", "genomeType": "RNA"}]);

        let record = parse_clinical_icb_set(&raw).expect("Should parse icb set");
        assert_eq!(record.dataset.version_info.dataset_type, Some(DatasetType::Both));

        raw["availableDatatypes"] = json!([{"name": "rnaseq"}]);
        assert!(parse_clinical_icb_set(&raw).is_err());
    }

    #[test]
    fn test_parse_radio_set_drops_unknown_type() {
        let mut raw = toxico_json();
        raw["dataset"]["versionInfo"]["type"] = json!("radiation");

        let record = parse_radio_set(&raw).expect("Should parse radioset");
        assert!(record.dataset.version_info.dataset_type.is_none());
    }

    #[test]
    fn test_missing_name_is_layout_error() {
        let mut raw = toxico_json();
        raw.as_object_mut().unwrap().remove("name");

        assert!(matches!(parse_toxico_set(&raw), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_unknown_genome_type_is_layout_error() {
        let mut raw = toxico_json();
        raw["availableDatatypes"] = json!([{"name": "x", "genomeType": "XNA"}]);

        assert!(matches!(parse_toxico_set(&raw), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_parse_date_created_variants() {
        assert!(parse_date_created("2021-12-16T20:13:40.374").is_ok());
        assert!(parse_date_created("2021-12-16T20:13:40Z").is_ok());
        assert!(parse_date_created("2021-12-16T20:13:40+02:00").is_ok());
        assert!(parse_date_created("2021-12-16").is_ok());
        assert!(matches!(
            parse_date_created("last tuesday"),
            Err(RecordError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_null_download_link_is_kept_as_none() {
        let mut raw = toxico_json();
        raw["downloadLink"] = Value::Null;

        let record = parse_toxico_set(&raw).unwrap();
        assert!(record.download_link().is_none());
    }
}
