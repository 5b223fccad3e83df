//! Content-addressed naming
//!
//! Identifiers are derived from a SHA-256 digest of the text they name, so
//! repeated runs over the same input always produce the same file names.

use sha2::{Digest, Sha256};

/// Number of hex digits of the digest kept in an instance identifier
pub const SHORT_HASH_LEN: usize = 10;

/// Full lowercase hex SHA-256 digest of `text`
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// First ten hex digits of [`content_hash`]
pub fn hash10(text: &str) -> String {
    let mut digest = content_hash(text);
    digest.truncate(SHORT_HASH_LEN);
    digest
}

/// Replace characters that cannot appear in a symbol or file name
pub fn sanitize(expression: &str) -> String {
    expression
        .chars()
        .map(|c| match c {
            '<' | '>' | ',' | ':' => '_',
            other => other,
        })
        .collect()
}

/// Stable identifier of a type expression: `hash10(expr) + "_" + sanitize(expr)`
pub fn identifier(expression: &str) -> String {
    format!("{}_{}", hash10(expression), sanitize(expression))
}

/// File stem of a compilation group, hashed from its members' identifiers
pub fn group_file_stem<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> String {
    let mut hasher = Sha256::new();
    for ident in identifiers {
        hasher.update(ident.as_bytes());
    }
    format!("group_{}", hex::encode(hasher.finalize()))
}
