//! SQL identifier quoting utilities
//!
//! Statements generated by the schema-mutation primitives are built from
//! table and column names; every identifier goes through [`quote_ident`] and
//! every literal through [`quote_literal`].

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them, following the SQL standard.
///
/// # Examples
/// ```
/// use sw_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("alias"), r#""alias""#);
/// assert_eq!(quote_ident(r#"my"col"#), r#""my""col""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a string literal by wrapping it in single quotes and doubling any
/// embedded single quote.
///
/// # Examples
/// ```
/// use sw_core::sql_utils::quote_literal;
/// assert_eq!(quote_literal("it's"), "'it''s'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Check that `ident` is a plain SQL identifier: a letter or underscore
/// followed by letters, digits, or underscores.
pub fn is_plain_identifier(ident: &str) -> bool {
    let mut bytes = ident.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
