//! Identifier transformations shared by the scanner, the reconciler and the
//! emitter.
//!
//! All functions here are pure and deterministic. Title-casing follows the Go
//! `strings.Title` rules, since the upstream skeleton names its functions that
//! way and both sides must agree on the result.

use std::path::Path;

use crate::types::TypeError;

/// Whether `ch` ends a word for [`title_case`].
fn is_separator(ch: char) -> bool {
    if ch.is_ascii() {
        return !(ch.is_ascii_alphanumeric() || ch == '_');
    }
    if ch.is_alphanumeric() {
        return false;
    }
    ch.is_whitespace()
}

/// Upper-case the first letter of every word, leaving the rest untouched.
///
/// `listPets` becomes `ListPets`, `X-tag` becomes `X-Tag`.
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev = ' ';
    for ch in s.chars() {
        if is_separator(prev) {
            result.extend(ch.to_uppercase());
        } else {
            result.push(ch);
        }
        prev = ch;
    }
    result
}

/// Service name of an `api_<group>.go` skeleton file, e.g. `PetsService`.
pub fn service_name_from_path(path: impl AsRef<Path>) -> String {
    let stem = path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name: String = stem.split('_').skip(1).map(title_case).collect();
    name.push_str("Service");
    name
}

/// Service name of an OpenAPI tag, e.g. `pet store` becomes `PetStoreService`.
pub fn service_name_from_tag(tag: &str) -> String {
    let mut name: String = tag.split(' ').map(title_case).collect();
    name.push_str("Service");
    name
}

/// Struct name referenced by a schema `$ref`.
pub fn struct_name_from_ref(reference: &str) -> Result<String, TypeError> {
    match reference.rsplit('/').next() {
        Some(last) if !last.is_empty() => Ok(title_case(last)),
        _ => Err(TypeError::BadRef(reference.to_string())),
    }
}

/// Translate an OpenAPI path template into a Gin route, `/pets/{petId}`
/// becomes `/pets/:petId`.
pub fn router_path(template: &str) -> String {
    template.replace('{', ":").replace('}', "")
}

/// Struct field name of a path or query parameter.
pub fn field_name(param: &str) -> String {
    title_case(param)
}

/// Struct field name of a header parameter, hyphens are dropped.
pub fn header_field_name(param: &str) -> String {
    title_case(param).replace('-', "")
}

/// Convert a string to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    let mut prev_is_lowercase = false;

    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && prev_is_lowercase {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
            prev_is_lowercase = false;
        } else if ch.is_alphanumeric() {
            result.push(ch);
            prev_is_lowercase = ch.is_lowercase() || ch.is_ascii_digit();
        } else if ch == '-' || ch == '_' || ch == ' ' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            prev_is_lowercase = false;
        }
    }

    result.trim_matches('_').to_string()
}
