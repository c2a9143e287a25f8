use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_decimal::Decimal;
use tax_core::{FilingStatus, TaxBracket, TaxDataError, TaxDataProvider};
use tracing::{debug, info};

use crate::document::{TaxYearDocument, TaxYearTables};
use crate::TaxDataLoadError;

/// Reference documents compiled into the binary.
const BUILTIN_DOCUMENTS: &[(i32, &str)] = &[
    (2023, include_str!("../data/2023.json")),
    (2024, include_str!("../data/2024.json")),
    (2025, include_str!("../data/2025.json")),
];

/// In-memory tax tables keyed by year.
///
/// Built once from validated documents and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTaxData {
    years: BTreeMap<i32, TaxYearTables>,
}

impl StaticTaxData {
    /// Loads the datasets shipped with this crate.
    pub fn builtin() -> Result<Self, TaxDataLoadError> {
        let documents = BUILTIN_DOCUMENTS
            .iter()
            .map(|(year, json)| {
                TaxYearDocument::from_json(json)
                    .map(|doc| (*year, doc))
                    .map_err(|source| TaxDataLoadError::Json {
                        year: *year,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_documents(documents)
    }

    /// Builds the store from `(year, document)` pairs.
    ///
    /// # Errors
    ///
    /// Fails if no documents are given, a year appears twice, or any
    /// document fails validation.
    pub fn from_documents<I>(documents: I) -> Result<Self, TaxDataLoadError>
    where
        I: IntoIterator<Item = (i32, TaxYearDocument)>,
    {
        let mut years = BTreeMap::new();

        for (year, document) in documents {
            if years.contains_key(&year) {
                return Err(TaxDataLoadError::DuplicateYear(year));
            }
            let tables = document.into_tables(year)?;
            debug!(year, statuses = ?tables.filing_statuses(), "loaded tax year");
            years.insert(year, tables);
        }

        if years.is_empty() {
            return Err(TaxDataLoadError::NoYears);
        }

        info!(years = ?years.keys().collect::<Vec<_>>(), "tax data ready");
        Ok(Self { years })
    }

    /// Loads every `<year>.json` file in `dir`. Files without a `.json`
    /// extension are ignored.
    pub fn from_dir(dir: &Path) -> Result<Self, TaxDataLoadError> {
        let entries = fs::read_dir(dir).map_err(|source| TaxDataLoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut documents = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| TaxDataLoadError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?
                .path();

            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let year = year_from_path(&path)?;
            let document = load_document(&path, year)?;
            documents.push((year, document));
        }

        // read_dir order is platform dependent
        documents.sort_by_key(|(year, _)| *year);
        Self::from_documents(documents)
    }

    /// Validated tables for `year`, if loaded.
    pub fn year(
        &self,
        year: i32,
    ) -> Option<&TaxYearTables> {
        self.years.get(&year)
    }

    fn tables(
        &self,
        year: i32,
    ) -> Result<&TaxYearTables, TaxDataError> {
        self.years.get(&year).ok_or(TaxDataError::UnknownTaxYear(year))
    }
}

impl TaxDataProvider for StaticTaxData {
    fn available_years(&self) -> Vec<i32> {
        self.years.keys().copied().collect()
    }

    fn default_year(&self) -> i32 {
        // construction rejects an empty store
        self.years.keys().next_back().copied().unwrap_or_default()
    }

    fn tax_brackets(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<&[TaxBracket], TaxDataError> {
        self.tables(year)?
            .brackets(filing_status)
            .ok_or(TaxDataError::UnknownFilingStatus {
                year,
                status: filing_status,
            })
    }

    fn standard_deduction(
        &self,
        year: i32,
        filing_status: FilingStatus,
    ) -> Result<Decimal, TaxDataError> {
        self.tables(year)?
            .standard_deduction(filing_status)
            .ok_or(TaxDataError::UnknownFilingStatus {
                year,
                status: filing_status,
            })
    }

    fn is_supported_year(
        &self,
        year: i32,
    ) -> bool {
        self.years.contains_key(&year)
    }
}

/// Parses a single document file; `year` is only used for error context.
pub fn load_document(
    path: &Path,
    year: i32,
) -> Result<TaxYearDocument, TaxDataLoadError> {
    let json = fs::read_to_string(path).map_err(|source| TaxDataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    TaxYearDocument::from_json(&json).map_err(|source| TaxDataLoadError::Json { year, source })
}

/// Extracts the tax year from a file stem such as `2025.json`.
pub fn year_from_path(path: &Path) -> Result<i32, TaxDataLoadError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse().ok())
        .ok_or_else(|| TaxDataLoadError::InvalidFileName(path.to_path_buf()))
}
