//! String inflection helpers.
//!
//! These functions derive renderer names from semantic types, attribute
//! names from association names, and fallback labels from attribute names.

use regex::Regex;
use std::sync::OnceLock;

/// Words that have no distinct singular form.
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
];

/// Irregular plural → singular pairs.
const IRREGULAR: &[(&str, &str)] = &[
    ("people", "person"),
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("sexes", "sex"),
    ("moves", "move"),
    ("zombies", "zombie"),
    ("movies", "movie"),
];

/// Ordered singularization rules; the first matching rule wins.
fn singular_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)(database)s$", "$1"),
            (r"(?i)(quiz)zes$", "$1"),
            (r"(?i)(matr)ices$", "${1}ix"),
            (r"(?i)(vert|ind)ices$", "${1}ex"),
            (r"(?i)^(ox)en", "$1"),
            (r"(?i)(alias|status)(es)?$", "$1"),
            (r"(?i)(octop|vir)(us|i)$", "${1}us"),
            (r"(?i)(cris|test)(is|es)$", "${1}is"),
            (r"(?i)(shoe)s$", "$1"),
            (r"(?i)(o)es$", "$1"),
            (r"(?i)(bus)(es)?$", "$1"),
            (r"(?i)(m|l)ice$", "${1}ouse"),
            (r"(?i)(x|ch|ss|sh)es$", "$1"),
            (r"(?i)(m)ovies$", "${1}ovie"),
            (r"(?i)(s)eries$", "${1}eries"),
            (r"(?i)([^aeiouy]|qu)ies$", "${1}y"),
            (r"(?i)([lr])ves$", "${1}f"),
            (r"(?i)(tive)s$", "$1"),
            (r"(?i)(hive)s$", "$1"),
            (r"(?i)([^f])ves$", "${1}fe"),
            (r"(?i)(ss)$", "$1"),
            (r"(?i)s$", ""),
        ]
        .into_iter()
        .map(|(pattern, replacement)| {
            (
                Regex::new(pattern).expect("singular rule must be a valid regex"),
                replacement,
            )
        })
        .collect()
    })
}

/// Returns the singular form of an English word.
///
/// Only the last underscore-separated segment is inflected, so compound
/// association names keep their prefix.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::text::singularize;
///
/// assert_eq!(singularize("tags"), "tag");
/// assert_eq!(singularize("categories"), "category");
/// assert_eq!(singularize("people"), "person");
/// assert_eq!(singularize("blog_posts"), "blog_post");
/// ```
pub fn singularize(word: &str) -> String {
    let (prefix, last) = match word.rfind('_') {
        Some(idx) => word.split_at(idx + 1),
        None => ("", word),
    };

    let lower = last.to_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }
    if let Some((_, singular)) = IRREGULAR.iter().find(|(plural, _)| *plural == lower) {
        return format!("{prefix}{singular}");
    }

    for (rule, replacement) in singular_rules() {
        if rule.is_match(last) {
            return format!("{prefix}{}", rule.replace(last, *replacement));
        }
    }
    word.to_string()
}

/// Converts a snake_case identifier to PascalCase.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::text::camelize;
///
/// assert_eq!(camelize("radio_buttons"), "RadioButtons");
/// assert_eq!(camelize("string"), "String");
/// ```
pub fn camelize(s: &str) -> String {
    s.split('_')
        .filter(|segment| !segment.is_empty())
        .map(capfirst)
        .collect()
}

/// Turns an attribute name into a human-readable label.
///
/// Drops a trailing `_id`, replaces underscores with spaces, and capitalizes
/// the first character.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::text::humanize;
///
/// assert_eq!(humanize("first_name"), "First name");
/// assert_eq!(humanize("author_id"), "Author");
/// ```
pub fn humanize(s: &str) -> String {
    let s = s.strip_suffix("_id").unwrap_or(s);
    let s = s.trim_start_matches('_').replace('_', " ");
    capfirst(&s.to_lowercase())
}

/// Capitalizes the first character of a string.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::text::capfirst;
///
/// assert_eq!(capfirst("hello"), "Hello");
/// assert_eq!(capfirst(""), "");
/// assert_eq!(capfirst("HELLO"), "HELLO");
/// ```
pub fn capfirst(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        let mut result = c.to_uppercase().to_string();
        result.extend(chars);
        result
    })
}

/// Joins a list into a sentence: `a`, `a and b`, `a, b and c`.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::text::to_sentence;
///
/// let words = vec!["short".to_string(), "blank".to_string(), "taken".to_string()];
/// assert_eq!(to_sentence(&words), "short, blank and taken");
/// ```
pub fn to_sentence(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── singularize ──────────────────────────────────────────────────

    #[test]
    fn test_singularize_regular() {
        assert_eq!(singularize("tags"), "tag");
        assert_eq!(singularize("users"), "user");
    }

    #[test]
    fn test_singularize_ies() {
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("companies"), "company");
    }

    #[test]
    fn test_singularize_es() {
        assert_eq!(singularize("addresses"), "address");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("matches"), "match");
        assert_eq!(singularize("statuses"), "status");
    }

    #[test]
    fn test_singularize_irregular() {
        assert_eq!(singularize("people"), "person");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("movies"), "movie");
    }

    #[test]
    fn test_singularize_uncountable() {
        assert_eq!(singularize("news"), "news");
        assert_eq!(singularize("series"), "series");
    }

    #[test]
    fn test_singularize_compound() {
        assert_eq!(singularize("blog_posts"), "blog_post");
        assert_eq!(singularize("tag_categories"), "tag_category");
    }

    #[test]
    fn test_singularize_already_singular() {
        assert_eq!(singularize("glass"), "glass");
    }

    // ── camelize ─────────────────────────────────────────────────────

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("string"), "String");
        assert_eq!(camelize("radio_buttons"), "RadioButtons");
        assert_eq!(camelize("time_zone"), "TimeZone");
    }

    #[test]
    fn test_camelize_collapses_double_underscore() {
        assert_eq!(camelize("rich__text"), "RichText");
    }

    // ── humanize ─────────────────────────────────────────────────────

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("email"), "Email");
        assert_eq!(humanize("first_name"), "First name");
    }

    #[test]
    fn test_humanize_foreign_key() {
        assert_eq!(humanize("author_id"), "Author");
    }

    #[test]
    fn test_humanize_plural_ids_kept() {
        assert_eq!(humanize("tag_ids"), "Tag ids");
    }

    // ── capfirst ─────────────────────────────────────────────────────

    #[test]
    fn test_capfirst() {
        assert_eq!(capfirst("hello"), "Hello");
        assert_eq!(capfirst("HELLO"), "HELLO");
        assert_eq!(capfirst(""), "");
        assert_eq!(capfirst("a"), "A");
    }

    // ── to_sentence ──────────────────────────────────────────────────

    #[test]
    fn test_to_sentence() {
        assert_eq!(to_sentence(&[]), "");
        assert_eq!(to_sentence(&["a".to_string()]), "a");
        assert_eq!(to_sentence(&["a".to_string(), "b".to_string()]), "a and b");
    }
}
