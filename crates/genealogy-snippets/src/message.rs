//! Messages exchanged with the browser extension.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::IngestOutcome;
use crate::error::{Error, Result};
use crate::record::PageRecord;

/// Discriminant value of the data-addition message.
pub const ADD_DATA: &str = "addData";

/// A message sent by the extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message")]
pub enum ExtensionMessage {
    /// Records captured from one or more pages.
    #[serde(rename = "addData")]
    AddData {
        /// Records to ingest.
        data: Vec<PageRecord>,
    },
}

/// Reply to an [`ExtensionMessage::AddData`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgment {
    /// `added` or `not_added`.
    pub response: IngestOutcome,
}

impl From<IngestOutcome> for Acknowledgment {
    fn from(response: IngestOutcome) -> Self {
        Self { response }
    }
}

/// Records supplied outside the extension, e.g. from a file.
///
/// Accepts an `addData` message, a list of records, or a single record.
/// Records stay raw JSON so they are stored exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    records: Vec<Value>,
}

impl RecordBatch {
    /// Decode a batch from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or matches none of the
    /// accepted shapes.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut fields) => {
                if fields.get("message").and_then(Value::as_str) == Some(ADD_DATA) {
                    match fields.remove("data") {
                        Some(Value::Array(records)) => records,
                        _ => {
                            return Err(Error::unrecognized_input(
                                "addData message without a data list",
                            ))
                        }
                    }
                } else if fields.contains_key("page") {
                    vec![Value::Object(fields)]
                } else {
                    return Err(Error::unrecognized_input(
                        "expected an addData message, a record list or a record",
                    ));
                }
            }
            other => {
                return Err(Error::unrecognized_input(format!(
                    "expected a JSON list or object, found {other}"
                )))
            }
        };
        Ok(Self { records })
    }

    /// Number of records in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the batch holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records of the batch, in order.
    #[must_use]
    pub fn into_records(self) -> Vec<Value> {
        self.records
    }
}
