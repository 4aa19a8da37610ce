//! # Variable Substitution
//!
//! Widgets may embed `:name:` placeholders in their text-bearing fields
//! (text, QR content, barcode content). A batch print fills them from one
//! data row per label.
//!
//! ```
//! use tapelabel::label::{QrWidget, TextWidget, Widget};
//! use tapelabel::variables::{detect_variables, substitute};
//! use std::collections::HashMap;
//!
//! let widgets = vec![
//!     Widget::Text(TextWidget::new("Hello :name:")),
//!     Widget::Qr(QrWidget::new("https://example.com/:id:")),
//! ];
//! assert_eq!(detect_variables(&widgets), vec!["name", "id"]);
//!
//! let row = HashMap::from([("name".to_string(), "Ada".to_string())]);
//! let filled = substitute(&widgets, &row);
//! assert_eq!(filled[0].text_field(), Some("Hello Ada"));
//! assert_eq!(filled[1].text_field(), Some("https://example.com/:id:"));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::label::Widget;

static VARIABLE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn variable_pattern() -> &'static Regex {
    VARIABLE_PATTERN.get_or_init(|| {
        Regex::new(r":([A-Za-z_][A-Za-z0-9_]*):").expect("variable pattern is a valid regex")
    })
}

/// Distinct variable names referenced by the widgets, in first-seen order.
pub fn detect_variables(widgets: &[Widget]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for text in widgets.iter().filter_map(Widget::text_field) {
        for caps in variable_pattern().captures_iter(text) {
            let name = &caps[1];
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }

    names
}

/// Replace every `:name:` with its value from `row`.
///
/// Placeholders whose name is missing from `row` are kept verbatim. Image
/// widgets pass through unchanged.
pub fn substitute(widgets: &[Widget], row: &HashMap<String, String>) -> Vec<Widget> {
    let mut result = widgets.to_vec();
    for widget in &mut result {
        if let Some(field) = widget.text_field_mut() {
            *field = substitute_str(field, row);
        }
    }
    result
}

/// Substitute placeholders in a single string.
pub fn substitute_str(text: &str, row: &HashMap<String, String>) -> String {
    variable_pattern()
        .replace_all(text, |caps: &Captures| match row.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
