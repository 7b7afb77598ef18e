//! Grade vocabularies. Grades are opaque labels, not comparable values:
//! a V4, a 6b+ and a "blue" never order against each other here.

use once_cell::sync::Lazy;

const V_SCALE: [&str; 14] = [
    "VB", "V0", "V1", "V2", "V3", "V4", "V5", "V6", "V7", "V8", "V9", "V10", "V11", "V12",
];

const FRENCH_SCALE: [&str; 18] = [
    "4a", "4b", "4c", "5a", "5b", "5c", "6a", "6a+", "6b", "6b+", "6c", "6c+", "7a", "7a+", "7b",
    "7b+", "7c", "8a",
];

const HOLD_COLORS: [&str; 8] = [
    "green", "yellow", "orange", "blue", "red", "purple", "black", "white",
];

/// The default palette offered when a location carries no custom grading:
/// every standard vocabulary, in order.
pub static DEFAULT_VOCABULARY: Lazy<Vec<String>> = Lazy::new(|| {
    V_SCALE
        .iter()
        .chain(FRENCH_SCALE.iter())
        .chain(HOLD_COLORS.iter())
        .map(|g| (*g).to_string())
        .collect()
});

/// Resolve the palette for a location: its custom grading array when it is a
/// non-empty list of strings, the default vocabulary otherwise.
pub fn palette_for(grading: Option<&serde_json::Value>) -> Vec<String> {
    if let Some(value) = grading {
        if let Some(labels) = as_label_list(value) {
            if !labels.is_empty() {
                return labels;
            }
        }
    }
    DEFAULT_VOCABULARY.clone()
}

fn as_label_list(value: &serde_json::Value) -> Option<Vec<String>> {
    let entries = value.as_array()?;
    entries
        .iter()
        .map(|e| e.as_str().map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_palette_overrides_defaults() {
        let grading = json!(["green", "blue", "red", "black"]);
        let palette = palette_for(Some(&grading));
        assert_eq!(palette, vec!["green", "blue", "red", "black"]);
    }

    #[test]
    fn missing_or_empty_palette_falls_back_to_default() {
        assert_eq!(palette_for(None), *DEFAULT_VOCABULARY);
        let empty = json!([]);
        assert_eq!(palette_for(Some(&empty)), *DEFAULT_VOCABULARY);
    }

    #[test]
    fn non_string_entries_fall_back_to_default() {
        let junk = json!([1, 2, 3]);
        assert_eq!(palette_for(Some(&junk)), *DEFAULT_VOCABULARY);
    }

    #[test]
    fn default_vocabulary_keeps_scale_order() {
        let v0 = DEFAULT_VOCABULARY.iter().position(|g| g == "V0").unwrap();
        let v5 = DEFAULT_VOCABULARY.iter().position(|g| g == "V5").unwrap();
        assert!(v0 < v5);
    }
}
