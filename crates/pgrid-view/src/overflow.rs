//! Cell overflow rendering.
//!
//! Cells render as a single ellipsis-truncated line. Hovering measures the
//! content; only overflowing content expands into a tooltip above the cell.
//! The key listener that dismisses the tooltip on Escape exists only while
//! the tooltip is shown.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pgrid_model::{Align, ColumnDescriptor, Row};
use pgrid_state::{Observers, Subscription};
use tracing::trace;

/// Column width used when a column declares none.
pub const DEFAULT_COLUMN_WIDTH: f32 = 100.0;

/// Scroll and client extents of rendered content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentMetrics {
    pub scroll_width: f32,
    pub client_width: f32,
    pub scroll_height: f32,
    pub client_height: f32,
}

impl ContentMetrics {
    pub fn overflows(&self) -> bool {
        self.scroll_width > self.client_width || self.scroll_height > self.client_height
    }
}

/// Measures how rendered text fits in a cell.
pub trait MeasureContent {
    fn measure(&self, text: &str, width: f32) -> ContentMetrics;
}

/// Fixed-advance measurement: every character is `char_width` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    pub char_width: f32,
    pub line_height: f32,
    /// Horizontal cell padding, both sides combined.
    pub padding: f32,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 20.0,
            padding: 20.0,
        }
    }
}

impl MeasureContent for MonospaceMeasure {
    fn measure(&self, text: &str, width: f32) -> ContentMetrics {
        ContentMetrics {
            scroll_width: text.chars().count() as f32 * self.char_width,
            client_width: (width - self.padding).max(0.0),
            scroll_height: self.line_height,
            client_height: self.line_height,
        }
    }
}

/// Keyboard events delivered to document-level listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Escape,
    Key(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPlacement {
    Top,
}

/// What the host draws for a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellRender {
    /// Single line, truncated with an ellipsis.
    Text { text: String, align: Align },
    Tooltip {
        text: String,
        align: Align,
        title: String,
        placement: TooltipPlacement,
    },
}

pub struct OverflowCell {
    text: String,
    width: f32,
    align: Align,
    expanded: Rc<Cell<bool>>,
    listener: Rc<RefCell<Option<Subscription>>>,
}

impl OverflowCell {
    pub fn new(text: impl Into<String>, width: f32, align: Align) -> Self {
        Self {
            text: text.into(),
            width,
            align,
            expanded: Rc::new(Cell::new(false)),
            listener: Rc::new(RefCell::new(None)),
        }
    }

    /// Cell for a column's formatted value in `row`.
    pub fn for_column(column: &ColumnDescriptor, row: &Row) -> Self {
        Self::new(
            column.formatted(row),
            column.width.unwrap_or(DEFAULT_COLUMN_WIDTH),
            column.align,
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    pub fn has_key_listener(&self) -> bool {
        self.listener.borrow().is_some()
    }

    pub fn render(&self) -> CellRender {
        if self.expanded.get() {
            CellRender::Tooltip {
                text: self.text.clone(),
                align: self.align,
                title: self.text.clone(),
                placement: TooltipPlacement::Top,
            }
        } else {
            CellRender::Text {
                text: self.text.clone(),
                align: self.align,
            }
        }
    }

    /// Measure on hover; expand and start listening for Escape on overflow.
    ///
    /// Returns whether the cell is expanded afterwards.
    pub fn pointer_enter(
        &mut self,
        measure: &dyn MeasureContent,
        keys: &Observers<KeyEvent>,
    ) -> bool {
        if self.expanded.get() {
            return true;
        }
        if !measure.measure(&self.text, self.width).overflows() {
            return false;
        }
        self.expanded.set(true);

        let expanded = Rc::clone(&self.expanded);
        let slot = Rc::clone(&self.listener);
        let subscription = keys.subscribe(move |event: &KeyEvent| {
            if *event == KeyEvent::Escape {
                expanded.set(false);
                slot.borrow_mut().take();
            }
        });
        *self.listener.borrow_mut() = Some(subscription);
        trace!(width = self.width, "cell expanded");
        true
    }

    pub fn pointer_leave(&mut self) {
        self.collapse();
    }

    fn collapse(&mut self) {
        self.expanded.set(false);
        let listener = self.listener.borrow_mut().take();
        drop(listener);
    }
}

impl Drop for OverflowCell {
    fn drop(&mut self) {
        self.collapse();
    }
}

impl std::fmt::Debug for OverflowCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverflowCell")
            .field("text", &self.text)
            .field("width", &self.width)
            .field("expanded", &self.expanded.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_cell() -> OverflowCell {
        OverflowCell::new("Senior Payroll Compliance Specialist", 100.0, Align::Left)
    }

    #[test]
    fn short_content_stays_plain_without_listener() {
        let keys = Observers::new();
        let mut cell = OverflowCell::new("Ada", 100.0, Align::Left);
        assert!(!cell.pointer_enter(&MonospaceMeasure::default(), &keys));
        assert!(matches!(cell.render(), CellRender::Text { .. }));
        assert!(keys.is_empty());
    }

    #[test]
    fn overflow_shows_tooltip_until_pointer_leaves() {
        let keys = Observers::new();
        let mut cell = long_cell();
        assert!(cell.pointer_enter(&MonospaceMeasure::default(), &keys));
        assert_eq!(keys.len(), 1);
        match cell.render() {
            CellRender::Tooltip {
                title, placement, ..
            } => {
                assert_eq!(title, "Senior Payroll Compliance Specialist");
                assert_eq!(placement, TooltipPlacement::Top);
            }
            other => panic!("expected tooltip, got {other:?}"),
        }
        cell.pointer_leave();
        assert!(!cell.is_expanded());
        assert!(keys.is_empty());
    }

    #[test]
    fn escape_dismisses_and_unregisters() {
        let keys = Observers::new();
        let mut cell = long_cell();
        cell.pointer_enter(&MonospaceMeasure::default(), &keys);

        keys.publish(&KeyEvent::Key("a".into()));
        assert!(cell.is_expanded());

        keys.publish(&KeyEvent::Escape);
        assert!(!cell.is_expanded());
        assert!(!cell.has_key_listener());
        assert!(keys.is_empty());
    }

    #[test]
    fn repeated_enter_registers_once() {
        let keys = Observers::new();
        let mut cell = long_cell();
        cell.pointer_enter(&MonospaceMeasure::default(), &keys);
        cell.pointer_enter(&MonospaceMeasure::default(), &keys);
        assert_eq!(keys.len(), 1);
        drop(cell);
        assert!(keys.is_empty());
    }
}
