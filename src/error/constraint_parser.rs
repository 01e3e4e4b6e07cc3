use std::sync::OnceLock;

use regex::Regex;

/// Tables whose constraint names the parser recognizes, longest first so that
/// `post_tags_...` is never mistaken for `posts_...`.
const KNOWN_TABLES: &[&str] = &["post_tags", "posts", "users", "tags"];

/// Suffixes PostgreSQL appends to generated constraint names.
const CONSTRAINT_SUFFIXES: &[&str] = &["_fkey", "_key", "_pkey", "_check", "_not_null"];

/// Utility for parsing PostgreSQL constraint violation messages.
///
/// Used to describe a propagated store error, never to replace it.
pub struct ConstraintParser;

struct RegexPatterns {
    key_value: Regex,
    column_name: Regex,
    relation_name: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            // Key (username)=(albert) / Key ("postId", "tagId")=(1, 2)
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").unwrap(),
            column_name: Regex::new(r#"column "([^"]+)""#).unwrap(),
            relation_name: Regex::new(r#"(?:table|relation) "([^"]+)""#).unwrap(),
        }
    }
}

static REGEX_PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        REGEX_PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Splits a generated constraint name into (table, field).
    ///
    /// - `users_username_key` -> ("users", "username")
    /// - `posts_authorId_fkey` -> ("posts", "authorId")
    /// - `post_tags_postId_tagId_key` -> ("post_tags", "postId_tagId")
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let table = KNOWN_TABLES
            .iter()
            .find(|table| constraint_name.starts_with(&format!("{}_", table)))?;

        let rest = &constraint_name[table.len() + 1..];
        let field = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| rest.strip_suffix(suffix))
            .unwrap_or(rest);

        if field.is_empty() {
            return None;
        }
        Some((table.to_string(), field.to_string()))
    }

    /// Extracts `(field, value)` from a `Key (field)=(value)` detail line.
    /// Quoted identifiers are unquoted.
    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns().key_value.captures(message).and_then(|caps| {
            let field = caps.get(1)?.as_str().replace('"', "");
            let value = caps.get(2)?.as_str().to_string();
            Some((field, value))
        })
    }

    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .relation_name
            .captures(message)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Resolves (entity, field, value) for a unique or foreign key violation.
    ///
    /// The constraint name decides the entity; the detail line, when present,
    /// decides the field and value.
    pub fn parse_keyed_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, Option<String>)> {
        let from_name = constraint_name.and_then(Self::parse_constraint_name);
        let from_detail = Self::extract_key_value_from_message(message);

        match (from_name, from_detail) {
            (Some((entity, _)), Some((field, value))) => Some((entity, field, Some(value))),
            (Some((entity, field)), None) => Some((entity, field, None)),
            (None, Some((field, value))) => {
                let entity = Self::extract_table_from_message(message)
                    .unwrap_or_else(|| "resource".to_string());
                Some((entity, field, Some(value)))
            }
            (None, None) => None,
        }
    }

    /// Resolves (entity, field) for a not-null or check violation.
    pub fn parse_column_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        if let Some(field) = Self::extract_column_from_message(message) {
            let entity = Self::extract_table_from_message(message)
                .or_else(|| {
                    constraint_name.and_then(|c| Self::parse_constraint_name(c).map(|(e, _)| e))
                })
                .unwrap_or_else(|| "resource".to_string());
            return Some((entity, field));
        }

        constraint_name.and_then(Self::parse_constraint_name)
    }
}
