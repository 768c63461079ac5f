//! Filter items and the filter model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::value::format_number;

/// Every operator a filter row can select.
///
/// Names match the persisted `operatorValue` strings. `is` and `not` are
/// shared by date and single-select columns; their meaning depends on the
/// column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "startsWith")]
    StartsWith,
    #[serde(rename = "endsWith")]
    EndsWith,
    #[serde(rename = "isEmpty")]
    IsEmpty,
    #[serde(rename = "isNotEmpty")]
    IsNotEmpty,
    #[serde(rename = "isAnyOf")]
    IsAnyOf,
    #[serde(rename = "=")]
    NumEq,
    #[serde(rename = "!=")]
    NumNe,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "is")]
    Is,
    #[serde(rename = "not")]
    Not,
    #[serde(rename = "after")]
    After,
    #[serde(rename = "onOrAfter")]
    OnOrAfter,
    #[serde(rename = "before")]
    Before,
    #[serde(rename = "onOrBefore")]
    OnOrBefore,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 19] = [
        Self::Contains,
        Self::Equals,
        Self::StartsWith,
        Self::EndsWith,
        Self::IsEmpty,
        Self::IsNotEmpty,
        Self::IsAnyOf,
        Self::NumEq,
        Self::NumNe,
        Self::Gt,
        Self::Ge,
        Self::Lt,
        Self::Le,
        Self::Is,
        Self::Not,
        Self::After,
        Self::OnOrAfter,
        Self::Before,
        Self::OnOrBefore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::Equals => "equals",
            Self::StartsWith => "startsWith",
            Self::EndsWith => "endsWith",
            Self::IsEmpty => "isEmpty",
            Self::IsNotEmpty => "isNotEmpty",
            Self::IsAnyOf => "isAnyOf",
            Self::NumEq => "=",
            Self::NumNe => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Is => "is",
            Self::Not => "not",
            Self::After => "after",
            Self::OnOrAfter => "onOrAfter",
            Self::Before => "before",
            Self::OnOrBefore => "onOrBefore",
        }
    }

    /// `isEmpty` and `isNotEmpty` take no value input.
    pub fn requires_value(self) -> bool {
        !matches!(self, Self::IsEmpty | Self::IsNotEmpty)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|operator| operator.as_str() == s)
            .ok_or_else(|| ModelError::UnknownOperator(s.to_string()))
    }
}

/// The value typed into a filter row's input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Number(f64),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Single value as text; `None` for multi-value input.
    pub fn as_single(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(format_number(*number)),
            Self::Many(_) => None,
        }
    }

    /// All values as text; a single value becomes a one-element list.
    pub fn as_many(&self) -> Vec<String> {
        match self {
            Self::Many(values) => values.clone(),
            other => other.as_single().into_iter().collect(),
        }
    }

    /// Empty text or an empty list counts as "no value entered".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Number(_) => false,
            Self::Many(values) => values.is_empty(),
        }
    }
}

/// One condition row of the filter panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterItem {
    pub id: u64,
    pub column_field: String,
    pub operator_value: FilterOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

impl FilterItem {
    pub fn new(id: u64, column_field: impl Into<String>, operator_value: FilterOperator) -> Self {
        Self {
            id,
            column_field: column_field.into(),
            operator_value,
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: FilterValue) -> Self {
        self.value = Some(value);
        self
    }

    /// Whether this item currently constrains rows.
    ///
    /// Value-less operators are always active; others need a non-blank value.
    pub fn is_active(&self) -> bool {
        if !self.operator_value.requires_value() {
            return true;
        }
        self.value.as_ref().is_some_and(|value| !value.is_blank())
    }
}

/// AND/OR connective. Applies uniformly to every item past the first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOperator {
    #[default]
    And,
    Or,
}

impl LinkOperator {
    pub fn is_and(&self) -> bool {
        *self == Self::And
    }
}

/// Ordered filter items joined by a single link operator, plus quick-filter tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterModel {
    #[serde(default)]
    pub items: Vec<FilterItem>,
    #[serde(default)]
    pub link_operator: LinkOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_filter_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "LinkOperator::is_and")]
    pub quick_filter_logic_operator: LinkOperator,
}

impl FilterModel {
    pub fn item(&self, id: u64) -> Option<&FilterItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: u64) -> Option<&mut FilterItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Id for a newly appended item: one past the highest, or the lowest
    /// free id once the highest is `u64::MAX`.
    pub fn next_item_id(&self) -> u64 {
        let highest = self.items.iter().map(|item| item.id).max().unwrap_or(0);
        highest
            .checked_add(1)
            .unwrap_or_else(|| (1..).find(|id| self.item(*id).is_none()).unwrap_or(0))
    }

    pub fn active_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_active()).count()
    }

    /// Quick-filter tokens that are not blank.
    pub fn quick_tokens(&self) -> Vec<&str> {
        self.quick_filter_values
            .iter()
            .flatten()
            .map(|token| token.trim())
            .filter(|token| !token.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_names_round_trip_through_from_str() {
        for operator in FilterOperator::ALL {
            assert_eq!(operator.as_str().parse::<FilterOperator>(), Ok(operator));
        }
        assert!("between".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn value_less_operator_is_active_without_value() {
        let item = FilterItem::new(1, "name", FilterOperator::IsEmpty);
        assert!(item.is_active());
        let item = FilterItem::new(2, "name", FilterOperator::Contains);
        assert!(!item.is_active());
        let item = item.with_value(FilterValue::text("  "));
        assert!(!item.is_active());
    }

    #[test]
    fn item_serializes_with_persisted_names() {
        let item = FilterItem::new(3, "salary", FilterOperator::Ge)
            .with_value(FilterValue::Number(1000.0));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 3, "columnField": "salary", "operatorValue": ">=", "value": 1000.0})
        );
    }

    #[test]
    fn next_item_id_follows_highest() {
        let model = FilterModel {
            items: vec![
                FilterItem::new(4, "a", FilterOperator::Contains),
                FilterItem::new(2, "b", FilterOperator::Contains),
            ],
            ..FilterModel::default()
        };
        assert_eq!(model.next_item_id(), 5);
        assert_eq!(FilterModel::default().next_item_id(), 1);
    }

    #[test]
    fn next_item_id_reuses_a_free_id_after_the_maximum() {
        let model = FilterModel {
            items: vec![
                FilterItem::new(u64::MAX, "name", FilterOperator::IsEmpty),
                FilterItem::new(1, "title", FilterOperator::IsEmpty),
            ],
            ..FilterModel::default()
        };
        assert_eq!(model.next_item_id(), 2);
    }
}
