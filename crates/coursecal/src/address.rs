//! Building code to name/address lookup, loaded once from the reference table.

use crate::error::{ConvertError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// A single building from the reference address table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressEntry {
    /// Uppercase building code, e.g. "HENN"
    pub code: String,
    /// Full building name, e.g. "Hennings Building"
    pub name: String,
    /// Street address without city or country
    pub address: String,
}

/// Read-only table of buildings keyed by normalized code.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    entries: HashMap<String, AddressEntry>,
}

impl AddressBook {
    /// Loads the address table from a CSV file with columns
    /// `(building name, code, address)` and a header row.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| ConvertError::AddressTable {
            message: format!("{}: {e}", path.display()),
        })?;
        let book = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            buildings = book.len(),
            "Loaded address table"
        );
        Ok(book)
    }

    /// Reads the address table from any CSV source.
    ///
    /// Every record must have exactly three columns; anything else aborts the
    /// load since every event depends on address resolution.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() != 3 {
                return Err(ConvertError::AddressTable {
                    message: format!(
                        "row {} has {} columns, expected 3 (building name, code, address)",
                        idx + 2,
                        record.len()
                    ),
                });
            }
            entries.push(AddressEntry {
                name: record[0].trim().to_string(),
                code: record[1].to_string(),
                address: record[2].trim().to_string(),
            });
        }

        Ok(Self::from_entries(entries))
    }

    /// Builds a table from entries, normalizing their codes.
    ///
    /// Later entries replace earlier ones with the same code.
    pub fn from_entries(entries: impl IntoIterator<Item = AddressEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|mut entry| {
                entry.code = normalize_code(&entry.code);
                (entry.code.clone(), entry)
            })
            .collect();
        Self { entries }
    }

    /// Looks up a building by code, ignoring case and surrounding whitespace.
    pub fn resolve(&self, code: &str) -> Option<&AddressEntry> {
        self.entries.get(&normalize_code(code))
    }

    /// Returns the number of buildings in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no buildings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}
