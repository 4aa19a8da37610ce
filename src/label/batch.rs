//! Batch print state: copies, pacing and the variable rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Largest accepted copies-per-row value.
pub const MAX_COPIES: u32 = 999;
/// Largest accepted pause between prints, in seconds.
pub const MAX_PAUSE_SECS: f64 = 60.0;

/// One data row: variable name to value.
pub type BatchRow = HashMap<String, String>;

/// Editable batch configuration.
///
/// `rows` always holds at least one row; the editing helpers keep it that way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchState {
    pub enabled: bool,
    pub copies: u32,
    pub pause_time: f64,
    pub rows: Vec<BatchRow>,
    /// Highlighted row in an editor; ignored by the print pipeline.
    pub selected_row_index: Option<usize>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self {
            enabled: false,
            copies: 1,
            pause_time: 0.0,
            rows: vec![BatchRow::new()],
            selected_row_index: None,
        }
    }
}

impl BatchState {
    /// Copies per row, clamped to `1..=999`.
    pub fn copies(&self) -> u32 {
        self.copies.clamp(1, MAX_COPIES)
    }

    /// Pause between prints in seconds, clamped to `0..=60`.
    pub fn pause_secs(&self) -> f64 {
        if self.pause_time.is_finite() {
            self.pause_time.clamp(0.0, MAX_PAUSE_SECS)
        } else {
            0.0
        }
    }

    /// Total number of prints: rows × copies.
    pub fn total_units(&self) -> usize {
        self.rows.len().max(1) * self.copies() as usize
    }

    /// Append an empty row.
    pub fn add_row(&mut self) {
        self.rows.push(BatchRow::new());
    }

    /// Remove a row. The last remaining row is never removed.
    ///
    /// The selection follows the row it pointed at, or is cleared when that
    /// row is the one removed.
    pub fn remove_row(&mut self, index: usize) {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return;
        }
        self.rows.remove(index);
        self.selected_row_index = match self.selected_row_index {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
    }

    /// Set one cell. Out-of-range row indices are ignored.
    pub fn set_value(&mut self, index: usize, name: &str, value: &str) {
        if let Some(row) = self.rows.get_mut(index) {
            row.insert(name.to_string(), value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_one_row() {
        let state = BatchState::default();
        assert_eq!(state.rows.len(), 1);
        assert_eq!(state.total_units(), 1);
    }

    #[test]
    fn test_total_units() {
        let mut state = BatchState::default();
        state.add_row();
        state.add_row();
        state.copies = 2;
        assert_eq!(state.total_units(), 6);
    }

    #[test]
    fn test_clamping() {
        let state = BatchState {
            copies: 0,
            pause_time: -3.0,
            ..Default::default()
        };
        assert_eq!(state.copies(), 1);
        assert_eq!(state.pause_secs(), 0.0);

        let state = BatchState {
            copies: 5000,
            pause_time: 600.0,
            ..Default::default()
        };
        assert_eq!(state.copies(), MAX_COPIES);
        assert_eq!(state.pause_secs(), MAX_PAUSE_SECS);
    }

    #[test]
    fn test_last_row_is_never_removed() {
        let mut state = BatchState::default();
        state.remove_row(0);
        assert_eq!(state.rows.len(), 1);
    }

    #[test]
    fn test_remove_row_adjusts_selection() {
        let mut state = BatchState::default();
        state.add_row();
        state.add_row();
        state.set_value(2, "name", "Carol");
        state.selected_row_index = Some(2);

        state.remove_row(0);
        assert_eq!(state.selected_row_index, Some(1));
        assert_eq!(state.rows[1].get("name").map(String::as_str), Some("Carol"));

        state.remove_row(1);
        assert_eq!(state.selected_row_index, None);
    }

    #[test]
    fn test_set_value_out_of_range_is_ignored() {
        let mut state = BatchState::default();
        state.set_value(7, "a", "b");
        assert!(state.rows[0].is_empty());
    }
}
