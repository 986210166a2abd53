use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::ranked_list::{ITERATION_MARKER, RUN_TAG};
use crate::errors::RerankDataError;
use crate::types::{FieldName, FormattedText, PassageIdx, QueryId};

/// Scalar cell value decoded from a tabular record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// Missing or null cell.
    Null,
    /// Boolean cell.
    Bool(bool),
    /// Any integer width, widened to `i64`.
    Int(i64),
    /// Any float width, widened to `f64`.
    Float(f64),
    /// UTF-8 text cell.
    Text(String),
}

impl FieldValue {
    /// Integer view of the value; only integer cells qualify.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Numeric view of the value; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(value) => Some(*value as f64),
            FieldValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Text rendering used for content fields and ids; `None` for nulls.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Bool(value) => Some(value.to_string()),
            FieldValue::Int(value) => Some(value.to_string()),
            FieldValue::Float(value) => Some(format_score(*value)),
            FieldValue::Text(value) => Some(value.clone()),
        }
    }
}

/// A named cell in a row-like record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RowField {
    /// Stable column/field name.
    pub name: FieldName,
    /// Decoded cell value.
    pub value: FieldValue,
}

/// Backend-agnostic record with field-name access.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RowView {
    /// Fields in column order.
    pub fields: Vec<RowField>,
}

impl RowView {
    /// Build a record from `(name, value)` pairs.
    pub fn from_pairs<N: Into<FieldName>>(pairs: impl IntoIterator<Item = (N, FieldValue)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| RowField {
                    name: name.into(),
                    value,
                })
                .collect(),
        }
    }

    /// Raw value of field `name`, if present.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Value of field `name`, failing when the record lacks it.
    pub fn require(&self, name: &str) -> Result<&FieldValue, RerankDataError> {
        self.get(name)
            .ok_or_else(|| RerankDataError::missing_field(name, "record"))
    }

    /// Text of field `name`; scalars render as text, nulls are rejected.
    pub fn text(&self, name: &str) -> Result<String, RerankDataError> {
        self.require(name)?
            .render()
            .ok_or_else(|| RerankDataError::InvalidField {
                field: name.to_string(),
                details: "null value where text was expected".to_string(),
            })
    }

    /// Integer value of field `name`.
    pub fn int(&self, name: &str) -> Result<i64, RerankDataError> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| RerankDataError::InvalidField {
            field: name.to_string(),
            details: format!("expected an integer, found {value:?}"),
        })
    }

    /// Numeric value of field `name`.
    pub fn float(&self, name: &str) -> Result<f64, RerankDataError> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| RerankDataError::InvalidField {
            field: name.to_string(),
            details: format!("expected a number, found {value:?}"),
        })
    }
}

/// One retrieved (passage, score) pair for a query.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Row of the passage in the passage store.
    pub passage_idx: PassageIdx,
    /// Retriever score; higher is more relevant.
    pub score: f32,
}

/// Fixed-size group of formatted query/passage texts and their scores for one query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingGroup {
    /// Query row the group was built for.
    pub query_idx: usize,
    /// Formatted model inputs, in selection order.
    pub texts: Vec<FormattedText>,
    /// Candidate scores aligned with `texts`.
    pub scores: Vec<f32>,
    /// Number of leading entries drawn from the above-mean pool.
    pub positives: usize,
}

impl TrainingGroup {
    /// Number of entries in the group.
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// True when the group holds no entries.
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// `(text, score)` pairs in selection order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, f32)> {
        self.texts
            .iter()
            .map(String::as_str)
            .zip(self.scores.iter().copied())
    }

    /// Split into the `(texts, scores)` pair consumed by trainers.
    pub fn into_parts(self) -> (Vec<FormattedText>, Vec<f32>) {
        (self.texts, self.scores)
    }
}

/// One scored (query, passage) row from an inference result shard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Query the passage was scored for.
    pub query_id: QueryId,
    /// Passage id rendered as text; integer ids print in decimal.
    pub passage_id: String,
    /// Model score; ranking sorts it descending.
    pub score: f64,
}

/// A ranked-list line: `{query_id} Q0 {passage_id} {rank} {score} dense`.
#[derive(Clone, Copy, Debug)]
pub struct RankedLine<'a> {
    /// Result row being ranked.
    pub record: &'a ResultRecord,
    /// 1-based rank within the query's block.
    pub rank: usize,
}

impl fmt::Display for RankedLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {}",
            self.record.query_id,
            ITERATION_MARKER,
            self.record.passage_id,
            self.rank,
            format_score(self.record.score),
            RUN_TAG
        )
    }
}

/// Shortest round-trip decimal form of a score, keeping `.0` on integral values.
///
/// Very small and very large magnitudes switch to exponent form without padding
/// (`1e-5`, `1e16`).
pub fn format_score(score: f64) -> String {
    format!("{score:?}")
}
