use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PivotError, Result};

/// Maximum number of dimension levels a single pivot may request.
pub const MAX_LEVELS: usize = 5;

/// Logical fact rows a pivot aggregates over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BaseDataset {
    #[default]
    #[serde(alias = "documents")]
    LedgerDocuments,
    #[serde(alias = "payments")]
    LedgerPayments,
}

impl BaseDataset {
    /// Date column used when the request does not name one.
    pub fn default_date_column(&self) -> DateColumn {
        match self {
            BaseDataset::LedgerDocuments => DateColumn::DueDate,
            BaseDataset::LedgerPayments => DateColumn::PaymentDate,
        }
    }

    /// Fixed `kind` discriminator values selected by a record kind.
    ///
    /// Documents accept payable/receivable/both, payments accept paid/received/both.
    pub fn kind_values(&self, record_kind: RecordKind) -> Result<&'static [&'static str]> {
        match (self, record_kind) {
            (BaseDataset::LedgerDocuments, RecordKind::Payable) => Ok(&["accounts_payable"]),
            (BaseDataset::LedgerDocuments, RecordKind::Receivable) => Ok(&["accounts_receivable"]),
            (BaseDataset::LedgerDocuments, RecordKind::Both) => {
                Ok(&["accounts_payable", "accounts_receivable"])
            }
            (BaseDataset::LedgerPayments, RecordKind::Paid) => Ok(&["payment_made"]),
            (BaseDataset::LedgerPayments, RecordKind::Received) => Ok(&["payment_received"]),
            (BaseDataset::LedgerPayments, RecordKind::Both) => {
                Ok(&["payment_made", "payment_received"])
            }
            (dataset, kind) => Err(PivotError::InvalidRequest(format!(
                "record kind {} is not valid for dataset {}",
                kind.as_str(),
                dataset.as_str()
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaseDataset::LedgerDocuments => "LEDGER_DOCUMENTS",
            BaseDataset::LedgerPayments => "LEDGER_PAYMENTS",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Payable,
    Receivable,
    Paid,
    Received,
    #[default]
    Both,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Payable => "payable",
            RecordKind::Receivable => "receivable",
            RecordKind::Paid => "paid",
            RecordKind::Received => "received",
            RecordKind::Both => "both",
        }
    }
}

/// Semantic date columns on the fact view. Each is also a date-typed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateColumn {
    PostingDate,
    DueDate,
    PaymentDate,
}

impl DateColumn {
    /// Name of the matching dimension in the catalog.
    pub fn dimension_name(&self) -> &'static str {
        match self {
            DateColumn::PostingDate => "posting_date",
            DateColumn::DueDate => "due_date",
            DateColumn::PaymentDate => "payment_date",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeGrain {
    #[default]
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DimensionLevel {
    pub dimension: String,
    /// Only meaningful for date-typed dimensions.
    #[serde(default)]
    pub grain: Option<TimeGrain>,
}

impl DimensionLevel {
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            grain: None,
        }
    }

    pub fn with_grain(dimension: impl Into<String>, grain: TimeGrain) -> Self {
        Self {
            dimension: dimension.into(),
            grain: Some(grain),
        }
    }
}

/// A declarative pivot: dataset, up to [`MAX_LEVELS`] drill-down levels, one measure
/// and a filter map keyed by whitelisted field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PivotRequest {
    #[serde(default)]
    pub base_dataset: BaseDataset,
    #[serde(default)]
    pub record_kind: RecordKind,
    #[serde(default)]
    pub date_column: Option<DateColumn>,
    /// Fallback grain for date-typed levels that carry none.
    #[serde(default)]
    pub date_grain: Option<TimeGrain>,
    #[serde(default)]
    pub levels: Vec<DimensionLevel>,
    #[serde(default = "default_measure")]
    pub measure: String,
    #[serde(default)]
    pub filters: BTreeMap<String, Value>,
}

fn default_measure() -> String {
    "net_amount".to_string()
}

impl Default for PivotRequest {
    fn default() -> Self {
        Self {
            base_dataset: BaseDataset::default(),
            record_kind: RecordKind::default(),
            date_column: None,
            date_grain: None,
            levels: Vec::new(),
            measure: default_measure(),
            filters: BTreeMap::new(),
        }
    }
}

impl PivotRequest {
    pub fn new(base_dataset: BaseDataset, record_kind: RecordKind) -> Self {
        Self {
            base_dataset,
            record_kind,
            ..Self::default()
        }
    }

    pub fn level(mut self, dimension: impl Into<String>) -> Self {
        self.levels.push(DimensionLevel::new(dimension));
        self
    }

    pub fn level_with_grain(mut self, dimension: impl Into<String>, grain: TimeGrain) -> Self {
        self.levels.push(DimensionLevel::with_grain(dimension, grain));
        self
    }

    pub fn measure(mut self, measure: impl Into<String>) -> Self {
        self.measure = measure.into();
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Parse a request from JSON text.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Parse a request from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Date column the range filters apply to.
    pub fn effective_date_column(&self) -> DateColumn {
        self.date_column
            .unwrap_or_else(|| self.base_dataset.default_date_column())
    }
}

/// One dimension position of a result row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum DimensionSlot {
    /// Populated with a business value.
    Value(String),
    /// Populated, but the business value is null.
    Blank,
    /// Collapsed: this row is a subtotal above this level.
    Rollup,
}

impl DimensionSlot {
    pub const BLANK_LABEL: &'static str = "—";

    pub fn is_populated(&self) -> bool {
        !matches!(self, DimensionSlot::Rollup)
    }

    /// Display label; `None` for collapsed slots.
    pub fn display(&self) -> Option<&str> {
        match self {
            DimensionSlot::Value(label) => Some(label.as_str()),
            DimensionSlot::Blank => Some(Self::BLANK_LABEL),
            DimensionSlot::Rollup => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResultRow {
    /// Number of populated levels: 0 is the grand total.
    pub level: usize,
    /// Parallel to the request's levels.
    pub dimension_values: Vec<DimensionSlot>,
    pub value: f64,
}

impl PivotResultRow {
    /// Labels of the populated prefix, business nulls included as the blank label.
    pub fn path(&self) -> Vec<&str> {
        self.dimension_values
            .iter()
            .filter_map(DimensionSlot::display)
            .collect()
    }
}
