//! Minimal English inflection for resource and relationship names.
//!
//! `heck` handles casing but not number, so singularization lives here.
//! The rule set is deliberately small: regular English plurals, a short
//! irregular table and a few uncountable nouns. Anything else passes
//! through unchanged.

use heck::ToUpperCamelCase;

const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("teeth", "tooth"),
    ("feet", "foot"),
];

const UNCOUNTABLE: &[&str] = &["equipment", "information", "metadata", "data", "news", "series", "species"];

fn singularize_word(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return (*singular).to_string();
    }

    let strip = |n: usize| word[..word.len() - n].to_string();
    if lower.ends_with("ies") && lower.len() > 3 {
        format!("{}y", strip(3))
    } else if ["sses", "shes", "ches", "xes", "zes"].iter().any(|s| lower.ends_with(s)) {
        strip(2)
    } else if lower.ends_with("ss") || lower.ends_with("us") || lower.ends_with("is") {
        word.to_string()
    } else if lower.ends_with('s') && lower.len() > 1 {
        strip(1)
    } else {
        word.to_string()
    }
}

/// Singular form of a (possibly snake_case) name; only the last word is
/// inflected.
pub fn singularize(name: &str) -> String {
    match name.rfind(|c| c == '_' || c == '-') {
        Some(i) => format!("{}{}", &name[..=i], singularize_word(&name[i + 1..])),
        None => singularize_word(name),
    }
}

/// Model-style class name of a resource type, e.g. `user_profiles` becomes
/// `UserProfile`.
pub fn classify(name: &str) -> String {
    singularize(name).to_upper_camel_case()
}
