//! Core data models for ORCESTRA datasets
//!
//! Every catalog source returns records of the same general shape: a named
//! dataset with a DOI, a download link, a creation date, and the list of
//! molecular datatypes it ships. Each source has its own parser (see
//! [`parse`]) because the endpoints differ in which fields are guaranteed.

pub mod parse;

pub use parse::{
    parse_clinical_icb_set, parse_pharmaco_set, parse_radio_set, parse_toxico_set,
    parse_xeva_set, RecordError, RecordParser,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Genome a molecular datatype was profiled on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenomeType {
    #[serde(rename = "DNA")]
    Dna,
    #[serde(rename = "RNA")]
    Rna,
}

impl fmt::Display for GenomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenomeType::Dna => f.write_str("DNA"),
            GenomeType::Rna => f.write_str("RNA"),
        }
    }
}

/// Kind of pharmacological data a dataset version contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Both,
    Perturbation,
    Sensitivity,
}

impl FromStr for DatasetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(DatasetType::Both),
            "perturbation" => Ok(DatasetType::Perturbation),
            "sensitivity" => Ok(DatasetType::Sensitivity),
            _ => Err(()),
        }
    }
}

/// A publication backing a dataset version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub citation: String,
    pub link: String,
}

/// Version metadata of the underlying dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub dataset_type: Option<DatasetType>,
    pub publications: Vec<Publication>,
}

/// Drug sensitivity provenance (pharmacogenomic sets only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sensitivity {
    pub version: String,
    pub source: String,
}

/// The dataset a record was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub name: String,
    pub version_info: VersionInfo,
    pub sensitivity: Option<Sensitivity>,
}

/// Microarray platform of a datatype (e.g. Affymetrix HG-U133A)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroarrayType {
    pub label: String,
    pub name: String,
}

/// A molecular datatype available in a record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailableDatatype {
    pub name: String,
    pub genome_type: Option<GenomeType>,
    pub source: Option<String>,
    pub microarray_type: Option<MicroarrayType>,
}

/// A single catalog entry
///
/// Records are produced by a source's parser and replaced wholesale on every
/// fetch; nothing mutates them afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetRecord {
    /// Unique name within its source (e.g. "GDSC_2020(v2-8.2)")
    pub name: String,
    /// Digital object identifier
    pub doi: Option<String>,
    /// Where the packaged object can be downloaded from
    pub download_link: Option<String>,
    /// When the record was created upstream
    pub date_created: Option<NaiveDateTime>,
    /// Dataset this record was built from
    pub dataset: Dataset,
    /// Molecular datatypes shipped with the record
    pub available_datatypes: Vec<AvailableDatatype>,
}

impl DatasetRecord {
    /// Names of the available datatypes, in catalog order
    pub fn datatypes(&self) -> Vec<&str> {
        self.available_datatypes
            .iter()
            .map(|adt| adt.name.as_str())
            .collect()
    }

    /// The download link, if one is present and non-empty
    pub fn download_link(&self) -> Option<&str> {
        self.download_link
            .as_deref()
            .map(str::trim)
            .filter(|link| !link.is_empty())
    }
}
