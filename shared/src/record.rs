/*!
Decoded record data structures.

A [`Record`] holds the three header fields every frame carries plus the
sensor values found in its parameter groups, keyed by field name.
*/

use crate::error::DecodeError;
use crate::protocol::{ID_OFFSET, PARAMS_OFFSET, SIZE_OFFSET, TIMESTAMP_OFFSET};
use crate::tag::known_fields;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Fixed header fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordHeader {
    /// Declared payload size (frame length minus markers and size field)
    pub size: u16,
    /// 24-bit record id
    pub id: u32,
    pub timestamp: u32,
}

impl RecordHeader {
    /// Read the header from a de-scrambled frame.
    /// Returns `None` if the frame is too short to hold one.
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < PARAMS_OFFSET {
            return None;
        }

        let size = u16::from_le_bytes([frame[SIZE_OFFSET], frame[SIZE_OFFSET + 1]]);
        let id = u32::from_le_bytes([
            frame[ID_OFFSET],
            frame[ID_OFFSET + 1],
            frame[ID_OFFSET + 2],
            0,
        ]);
        let timestamp = u32::from_le_bytes([
            frame[TIMESTAMP_OFFSET],
            frame[TIMESTAMP_OFFSET + 1],
            frame[TIMESTAMP_OFFSET + 2],
            frame[TIMESTAMP_OFFSET + 3],
        ]);

        Some(Self { size, id, timestamp })
    }
}

/// How sensor fields absent from a record are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFields {
    /// Leave absent fields out of the object
    #[default]
    Omit,
    /// Write every known field, absent ones as `null`
    Null,
}

impl FromStr for MissingFields {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "omit" => Ok(Self::Omit),
            "null" => Ok(Self::Null),
            other => Err(DecodeError::config(format!(
                "unknown missing-fields mode '{}', expected 'omit' or 'null'",
                other
            ))),
        }
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Omit => write!(f, "omit"),
            Self::Null => write!(f, "null"),
        }
    }
}

/// One decoded record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    #[serde(flatten)]
    header: RecordHeader,
    #[serde(flatten)]
    parameters: BTreeMap<&'static str, f64>,
}

/// Serialization view with every known field present
#[derive(Serialize)]
struct RecordWithNulls<'a> {
    #[serde(flatten)]
    header: &'a RecordHeader,
    #[serde(flatten)]
    parameters: BTreeMap<&'static str, Option<f64>>,
}

impl Record {
    pub fn new(header: RecordHeader, parameters: BTreeMap<&'static str, f64>) -> Self {
        Self { header, parameters }
    }

    pub fn header(&self) -> &RecordHeader {
        &self.header
    }

    pub fn size(&self) -> u16 {
        self.header.size
    }

    pub fn id(&self) -> u32 {
        self.header.id
    }

    pub fn timestamp(&self) -> u32 {
        self.header.timestamp
    }

    /// Sensor values keyed by field name
    pub fn parameters(&self) -> &BTreeMap<&'static str, f64> {
        &self.parameters
    }

    /// Value of one sensor field
    pub fn get(&self, field: &str) -> Option<f64> {
        self.parameters.get(field).copied()
    }

    /// Render the record as a single-line JSON object
    pub fn to_json_line(&self, missing: MissingFields) -> serde_json::Result<String> {
        match missing {
            MissingFields::Omit => serde_json::to_string(self),
            MissingFields::Null => {
                let parameters = known_fields()
                    .map(|(_, name)| (name, self.get(name)))
                    .collect();
                serde_json::to_string(&RecordWithNulls {
                    header: &self.header,
                    parameters,
                })
            }
        }
    }
}
