//! Toolbar composition.
//!
//! Left side: date range, custom filters, quick filter. Right side: custom
//! button, filter button, columns button, export control, add button.

use chrono::NaiveDate;
use pgrid_export::ExcelOptions;
use pgrid_model::FilterModel;
use serde::{Deserialize, Serialize};

use crate::toolbar_filters::{CustomFilter, DateRangeFilter};

/// What the current user may do, resolved by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_add: bool,
    pub can_export: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            can_add: true,
            can_export: true,
        }
    }
}

/// Caller toolbar settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolbarOptions {
    pub disable_quick_filter: bool,
    pub quick_filter_placeholder: String,
    pub quick_filter_width: f32,
    /// Label of the caller's extra action button.
    pub custom_button: Option<String>,
    pub enable_exports: bool,
    /// `Some(all_columns)` switches the export menu to a single-click button.
    pub direct_export: Option<bool>,
    pub excel_options: ExcelOptions,
    /// Label of the "add new record" button; absent when the caller has no add action.
    pub add_button_text: Option<String>,
}

impl Default for ToolbarOptions {
    fn default() -> Self {
        Self {
            disable_quick_filter: false,
            quick_filter_placeholder: "Search…".to_string(),
            quick_filter_width: 240.0,
            custom_button: None,
            enable_exports: true,
            direct_export: None,
            excel_options: ExcelOptions::default(),
            add_button_text: None,
        }
    }
}

/// Filter button indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterButtonState {
    pub active_count: usize,
    pub highlighted: bool,
    /// Inline "clear all filters" glyph.
    pub show_clear: bool,
}

impl FilterButtonState {
    pub fn for_model(model: &FilterModel) -> Self {
        let active_count = model.active_count();
        Self {
            active_count,
            highlighted: active_count > 0,
            show_clear: active_count > 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarItem {
    DateRange {
        field: String,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    CustomFilter {
        key: String,
        label: String,
        options: Vec<String>,
        selected: Option<String>,
    },
    QuickFilter {
        text: String,
        placeholder: String,
        width: f32,
    },
    CustomButton {
        label: String,
    },
    FilterButton(FilterButtonState),
    ColumnsButton,
    Export {
        direct: bool,
    },
    AddButton {
        label: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toolbar {
    pub left: Vec<ToolbarItem>,
    pub right: Vec<ToolbarItem>,
}

impl Toolbar {
    pub fn items(&self) -> impl Iterator<Item = &ToolbarItem> {
        self.left.iter().chain(&self.right)
    }

    pub fn filter_button(&self) -> Option<FilterButtonState> {
        self.right.iter().find_map(|item| match item {
            ToolbarItem::FilterButton(state) => Some(*state),
            _ => None,
        })
    }
}

/// Everything the toolbar reflects.
#[derive(Debug, Clone, Copy)]
pub struct ToolbarInput<'a> {
    pub options: &'a ToolbarOptions,
    pub capabilities: Capabilities,
    pub filter_model: &'a FilterModel,
    /// Raw text in the search box, before debouncing.
    pub quick_text: &'a str,
    pub date_range: Option<&'a DateRangeFilter>,
    pub custom_filters: &'a [CustomFilter],
}

pub fn compose_toolbar(input: &ToolbarInput<'_>) -> Toolbar {
    let options = input.options;
    let mut left = Vec::new();
    if let Some(range) = input.date_range {
        left.push(ToolbarItem::DateRange {
            field: range.field.clone(),
            from: range.from,
            to: range.to,
        });
    }
    left.extend(input.custom_filters.iter().map(|filter| ToolbarItem::CustomFilter {
        key: filter.key.clone(),
        label: filter.label.clone(),
        options: filter.options.clone(),
        selected: filter.selected.clone(),
    }));
    if !options.disable_quick_filter {
        left.push(ToolbarItem::QuickFilter {
            text: input.quick_text.to_string(),
            placeholder: options.quick_filter_placeholder.clone(),
            width: options.quick_filter_width,
        });
    }

    let mut right = Vec::new();
    if let Some(label) = &options.custom_button {
        right.push(ToolbarItem::CustomButton {
            label: label.clone(),
        });
    }
    right.push(ToolbarItem::FilterButton(FilterButtonState::for_model(
        input.filter_model,
    )));
    right.push(ToolbarItem::ColumnsButton);
    if options.enable_exports && input.capabilities.can_export {
        right.push(ToolbarItem::Export {
            direct: options.direct_export.is_some(),
        });
    }
    if let Some(label) = &options.add_button_text
        && input.capabilities.can_add
    {
        right.push(ToolbarItem::AddButton {
            label: label.clone(),
        });
    }
    Toolbar { left, right }
}

#[cfg(test)]
mod tests {
    use pgrid_model::{FilterItem, FilterOperator, FilterValue};

    use super::*;

    fn input<'a>(
        options: &'a ToolbarOptions,
        model: &'a FilterModel,
        capabilities: Capabilities,
    ) -> ToolbarInput<'a> {
        ToolbarInput {
            options,
            capabilities,
            filter_model: model,
            quick_text: "",
            date_range: None,
            custom_filters: &[],
        }
    }

    #[test]
    fn default_layout() {
        let options = ToolbarOptions::default();
        let model = FilterModel::default();
        let toolbar = compose_toolbar(&input(&options, &model, Capabilities::all()));
        assert!(matches!(toolbar.left[..], [ToolbarItem::QuickFilter { .. }]));
        assert_eq!(
            toolbar.right,
            vec![
                ToolbarItem::FilterButton(FilterButtonState {
                    active_count: 0,
                    highlighted: false,
                    show_clear: false,
                }),
                ToolbarItem::ColumnsButton,
                ToolbarItem::Export { direct: false },
            ]
        );
    }

    #[test]
    fn capabilities_gate_add_and_export() {
        let options = ToolbarOptions {
            add_button_text: Some("Add Employee".into()),
            custom_button: Some("Import".into()),
            disable_quick_filter: true,
            ..ToolbarOptions::default()
        };
        let model = FilterModel::default();

        let toolbar = compose_toolbar(&input(&options, &model, Capabilities::default()));
        assert!(toolbar.left.is_empty());
        assert!(!toolbar.items().any(|item| matches!(
            item,
            ToolbarItem::AddButton { .. } | ToolbarItem::Export { .. }
        )));
        assert_eq!(
            toolbar.right[0],
            ToolbarItem::CustomButton {
                label: "Import".into()
            }
        );

        let toolbar = compose_toolbar(&input(&options, &model, Capabilities::all()));
        assert_eq!(
            toolbar.right.last(),
            Some(&ToolbarItem::AddButton {
                label: "Add Employee".into()
            })
        );
    }

    #[test]
    fn active_filters_highlight_button() {
        let options = ToolbarOptions::default();
        let model = FilterModel {
            items: vec![
                FilterItem::new(1, "name", FilterOperator::Contains)
                    .with_value(FilterValue::text("ada")),
                FilterItem::new(2, "name", FilterOperator::Contains),
            ],
            ..FilterModel::default()
        };
        let toolbar = compose_toolbar(&input(&options, &model, Capabilities::all()));
        let state = toolbar.filter_button().unwrap();
        assert_eq!(state.active_count, 1);
        assert!(state.highlighted && state.show_clear);
    }
}
