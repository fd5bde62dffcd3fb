//! Immutable select expressions.

use super::condition::Condition;
use super::{quote_identifier, quote_literal};
use crate::error::{Result, StoreError};
use crate::format::{encode_element, encode_leaf, FormatOptions};
use crate::types::{AttributePath, Value};
use std::fmt;

/// Largest page size accepted by the store.
pub const MAX_LIMIT: u32 = 2500;

/// Item name pseudo-attribute used for the primary key.
const ITEM_NAME: &str = "itemName()";

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => f.write_str("ASC"),
            Direction::Desc => f.write_str("DESC"),
        }
    }
}

/// What a select returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    /// Every attribute.
    All,
    /// The named attributes only.
    Fields(Vec<String>),
    /// Number of matching items.
    Count,
}

/// A select expression bound to a domain.
///
/// Every builder call returns a new expression, so partially built
/// expressions can be shared and extended independently. Invalid input is
/// rejected by the call that introduces it.
///
/// # Example
///
/// ```ignore
/// let query = store
///     .query_builder()
///     .fields(["name", "tags[]"])?
///     .filter(Condition::eq("profile.age", 42).and(Condition::eq("tags[]", "admin")))?
///     .order_by("name", Direction::Asc)?
///     .limit(100)?;
///
/// // SELECT `name`, `tags[]` FROM `users` WHERE (`profile.age` = '42' AND `tags[]` = '"admin"') ...
/// let page = store.select(&query, None).await?;
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Select {
    domain: String,
    key: String,
    format: FormatOptions,
    output: Output,
    condition: Option<Condition>,
    /// Rendered form of `condition`, kept in sync by `with_condition`.
    predicate: Option<String>,
    order: Option<(String, Direction)>,
    limit: Option<u32>,
}

impl Select {
    /// Create a `SELECT *` over a domain.
    ///
    /// `key` names the document field mapped to the item name; `format`
    /// must match the options the items were written with.
    pub fn new(
        domain: impl Into<String>,
        key: impl Into<String>,
        format: FormatOptions,
    ) -> Result<Self> {
        let domain = domain.into();
        if domain.is_empty() {
            return Err(StoreError::Build("domain name is empty".to_string()));
        }
        let key = key.into();
        if key.is_empty() {
            return Err(StoreError::Build("key field name is empty".to_string()));
        }
        Ok(Self::from_parts(domain, key, format))
    }

    /// Construct without validation; callers guarantee non-empty names.
    pub(crate) fn from_parts(domain: String, key: String, format: FormatOptions) -> Self {
        Self {
            domain,
            key,
            format,
            output: Output::All,
            condition: None,
            predicate: None,
            order: None,
            limit: None,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    pub fn limit_value(&self) -> Option<u32> {
        self.limit
    }

    /// Select the named attributes only.
    pub fn fields<I, S>(&self, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(StoreError::Build("field list is empty".to_string()));
        }
        if fields.iter().any(String::is_empty) {
            return Err(StoreError::Build("field name is empty".to_string()));
        }
        Ok(Self {
            output: Output::Fields(fields),
            ..self.clone()
        })
    }

    /// Select every attribute.
    pub fn all(&self) -> Self {
        Self {
            output: Output::All,
            ..self.clone()
        }
    }

    /// Count matching items instead of returning them.
    pub fn count(&self) -> Self {
        Self {
            output: Output::Count,
            ..self.clone()
        }
    }

    /// Add a condition, combined with any existing one by AND.
    pub fn filter(&self, condition: Condition) -> Result<Self> {
        let combined = match &self.condition {
            Some(existing) => existing.clone().and(condition),
            None => condition,
        };
        self.with_condition(combined)
    }

    /// Add a condition, combined with any existing one by OR.
    pub fn or_filter(&self, condition: Condition) -> Result<Self> {
        let combined = match &self.condition {
            Some(existing) => existing.clone().or(condition),
            None => condition,
        };
        self.with_condition(combined)
    }

    /// Sort by an attribute.
    pub fn order_by(&self, attribute: impl Into<String>, direction: Direction) -> Result<Self> {
        let attribute = attribute.into();
        if attribute.is_empty() {
            return Err(StoreError::Build("sort attribute is empty".to_string()));
        }
        Ok(Self {
            order: Some((attribute, direction)),
            ..self.clone()
        })
    }

    /// Cap the number of items per page.
    pub fn limit(&self, limit: u32) -> Result<Self> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(StoreError::Build(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }
        Ok(Self {
            limit: Some(limit),
            ..self.clone()
        })
    }

    fn with_condition(&self, condition: Condition) -> Result<Self> {
        let predicate = self.render_condition(&condition, false)?;
        Ok(Self {
            condition: Some(condition),
            predicate: Some(predicate),
            ..self.clone()
        })
    }

    fn render_attribute(&self, attribute: &str) -> Result<String> {
        if attribute.is_empty() {
            return Err(StoreError::Build("attribute name is empty".to_string()));
        }
        if attribute == self.key {
            return Ok(ITEM_NAME.to_string());
        }
        Ok(quote_identifier(attribute))
    }

    /// Encode a right hand side value exactly as the codec stores it.
    fn render_value(&self, attribute: &str, value: &Value) -> Result<String> {
        if attribute == self.key {
            return match value {
                Value::String(s) => Ok(quote_literal(s)),
                Value::Number(n) => Ok(quote_literal(&n.to_string())),
                Value::Bool(b) => Ok(quote_literal(&b.to_string())),
                _ => Err(StoreError::Build(format!(
                    "key `{}` can only be compared with a string, number or boolean",
                    attribute
                ))),
            };
        }

        let path = AttributePath::parse(attribute);
        let encoded = if path.is_multiple() {
            encode_element(value)?
        } else {
            match value {
                Value::Object(_) => {
                    return Err(StoreError::Build(format!(
                        "`{}` cannot be compared with a map; compare its leaves instead",
                        attribute
                    )))
                }
                Value::Array(_) if self.format.multiple => {
                    return Err(StoreError::Build(format!(
                        "arrays are stored as multi-valued attributes; compare elements of `{}`",
                        AttributePath::new(path.segments().to_vec(), true)
                    )))
                }
                leaf => encode_leaf(leaf, self.format.encoding)?,
            }
        };
        Ok(quote_literal(&encoded))
    }

    fn render_condition(&self, condition: &Condition, every: bool) -> Result<String> {
        let subject = |attribute: &str| -> Result<String> {
            let rendered = self.render_attribute(attribute)?;
            Ok(if every {
                format!("every({})", rendered)
            } else {
                rendered
            })
        };

        match condition {
            Condition::Compare {
                attribute,
                operator,
                value,
            } => Ok(format!(
                "{} {} {}",
                subject(attribute)?,
                operator,
                self.render_value(attribute, value)?
            )),
            Condition::Between {
                attribute,
                lower,
                upper,
            } => Ok(format!(
                "{} BETWEEN {} AND {}",
                subject(attribute)?,
                self.render_value(attribute, lower)?,
                self.render_value(attribute, upper)?
            )),
            Condition::In { attribute, values } => {
                if values.is_empty() {
                    return Err(StoreError::Build(format!(
                        "IN list for `{}` is empty",
                        attribute
                    )));
                }
                let values = values
                    .iter()
                    .map(|value| self.render_value(attribute, value))
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{} IN ({})", subject(attribute)?, values.join(", ")))
            }
            Condition::IsNull(attribute) => Ok(format!("{} IS NULL", subject(attribute)?)),
            Condition::IsNotNull(attribute) => {
                Ok(format!("{} IS NOT NULL", subject(attribute)?))
            }
            Condition::Every(inner) => match inner.as_ref() {
                Condition::Every(_) | Condition::And(_) | Condition::Or(_) | Condition::Not(_) => {
                    Err(StoreError::Build(
                        "every() applies to a single attribute comparison".to_string(),
                    ))
                }
                simple => self.render_condition(simple, true),
            },
            Condition::And(all) => self.render_group(all, "AND", every),
            Condition::Or(any) => self.render_group(any, "OR", every),
            Condition::Not(inner) => Ok(format!("NOT ({})", self.render_condition(inner, every)?)),
        }
    }

    fn render_group(&self, conditions: &[Condition], joiner: &str, every: bool) -> Result<String> {
        if conditions.is_empty() {
            return Err(StoreError::Build(format!("{} group is empty", joiner)));
        }
        let parts = conditions
            .iter()
            .map(|condition| self.render_condition(condition, every))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", parts.join(&format!(" {} ", joiner))))
    }

    fn render_output(&self) -> String {
        match &self.output {
            Output::All => "*".to_string(),
            Output::Count => "count(*)".to_string(),
            Output::Fields(fields) => fields
                .iter()
                .map(|field| {
                    if *field == self.key {
                        ITEM_NAME.to_string()
                    } else {
                        quote_identifier(field)
                    }
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl fmt::Display for Select {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SELECT {} FROM {}",
            self.render_output(),
            quote_identifier(&self.domain)
        )?;
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        if let Some((attribute, direction)) = &self.order {
            let attribute = if *attribute == self.key {
                ITEM_NAME.to_string()
            } else {
                quote_identifier(attribute)
            };
            write!(f, " ORDER BY {} {}", attribute, direction)?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        Ok(())
    }
}
