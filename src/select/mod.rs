//! Query expression builder.
//!
//! Builds select statements against a domain and renders them to store
//! query text:
//!
//! ```text
//! SELECT <output> FROM `<domain>` [WHERE <predicate>] [ORDER BY <attr> ASC|DESC] [LIMIT n]
//! ```
//!
//! Identifiers are quoted with backticks and string literals with single
//! quotes; an embedded quote character is escaped by doubling it. Values on
//! the right hand side of a comparison go through the same encoding as
//! document leaves, so they compare against stored data byte for byte.

mod condition;
mod expression;

pub use condition::{Condition, Operator};
pub use expression::{Direction, Output, Select, MAX_LIMIT};

/// Quote an attribute or domain name.
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote a string literal.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
