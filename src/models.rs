use std::fmt;

use serde::Deserialize;

pub const COL_NAME: &str = "Name";
pub const COL_RELATIONSHIP: &str = "Relationship";
pub const COL_GENDER: &str = "Gender";
pub const COL_LIFESPAN: &str = "Lifespan";
pub const COL_ID: &str = "ID";
pub const COL_MEMORY_COUNT: &str = "Memory Count";
pub const COL_MEMORY_LINKS: &str = "Memory Links";
pub const COL_URL: &str = "FamilySearch URL";
pub const COL_LOCATION_TYPE: &str = "Location Type";
pub const COL_LOCATION: &str = "Location";
pub const COL_COUNTRY: &str = "Country";
pub const COL_DATE: &str = "Date";

const PERSON_URL_BASE: &str = "https://www.familysearch.org/tree/person/details/";
pub const ARTIFACT_URL_BASE: &str = "https://www.familysearch.org/photos/artifacts/";

// ── API shapes ──

/// Ancestry tree response: a flat list of ascendancy-numbered persons.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AncestryTree {
    #[serde(default)]
    pub persons: Vec<Person>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub display: PersonDisplay,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDisplay {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub lifespan: String,
    #[serde(default)]
    pub ascendancy_number: String,
}

/// Person details response. Facts are read from the first person record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonDetail {
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonRecord {
    #[serde(default)]
    pub facts: Vec<Fact>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Fact {
    #[serde(rename = "type", default)]
    pub fact_type: String,
    pub place: Option<Original>,
    pub date: Option<Original>,
}

/// The `{ "original": "..." }` wrapper used for both places and dates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Original {
    pub original: Option<String>,
}

// ── Derived records ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub location_type: String,
    pub place: String,
    pub country: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTally {
    Known(usize),
    /// The memories lookup failed.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryCount {
    pub count: MemoryTally,
    pub links: Vec<String>,
}

impl MemoryCount {
    pub fn unavailable() -> Self {
        MemoryCount {
            count: MemoryTally::Unavailable,
            links: Vec::new(),
        }
    }
}

pub fn person_url(person_id: &str) -> String {
    format!("{}{}", PERSON_URL_BASE, person_id)
}

// ── Tabular output ──

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }
}

impl From<MemoryTally> for Cell {
    fn from(tally: MemoryTally) -> Self {
        match tally {
            MemoryTally::Known(n) => Cell::Number(n as f64),
            MemoryTally::Unavailable => Cell::text("N/A"),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Number(n) => write!(f, "{}", n),
        }
    }
}

/// One spreadsheet row: column name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularRecord {
    cells: Vec<(&'static str, Cell)>,
}

impl TabularRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column, replacing any earlier value without moving it.
    pub fn set(&mut self, column: &'static str, value: Cell) {
        match self.cells.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn with(mut self, column: &'static str, value: Cell) -> Self {
        self.set(column, value);
        self
    }

    #[cfg(test)]
    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cells.iter().map(|(c, _)| *c)
    }

    pub fn cells(&self) -> &[(&'static str, Cell)] {
        &self.cells
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}
