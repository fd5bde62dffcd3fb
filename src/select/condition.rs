//! Predicate trees for select expressions.

use crate::error::{Result, StoreError};
use crate::types::Value;
use std::fmt;
use std::str::FromStr;

/// Comparison operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    NotLike,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_ascii_lowercase().as_str() {
            "" => Err(StoreError::Build("predicate has no operator".to_string())),
            "=" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "like" => Ok(Operator::Like),
            "not like" => Ok(Operator::NotLike),
            _ => Err(StoreError::Build(format!("unknown operator `{}`", s))),
        }
    }
}

/// A predicate over item attributes.
///
/// Attribute names are wire paths (`a.b`, or `a.b[]` for multi-valued
/// attributes). Values are plain document leaves; they are encoded the way
/// the codec stores them when the condition is added to a [`Select`].
///
/// [`Select`]: super::Select
#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Compare {
        attribute: String,
        operator: Operator,
        value: Value,
    },
    Between {
        attribute: String,
        lower: Value,
        upper: Value,
    },
    In {
        attribute: String,
        values: Vec<Value>,
    },
    IsNull(String),
    IsNotNull(String),
    /// Holds for every value of a multi-valued attribute.
    Every(Box<Condition>),
    And(Vec<Condition>),
    Or(Vec<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// Comparison with an operator given as text (`"="`, `"like"`, ...).
    pub fn compare(
        attribute: impl Into<String>,
        operator: &str,
        value: impl Into<Value>,
    ) -> Result<Self> {
        Ok(Condition::Compare {
            attribute: attribute.into(),
            operator: operator.parse()?,
            value: value.into(),
        })
    }

    fn op(attribute: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Condition::Compare {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn eq(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Eq, value)
    }

    pub fn ne(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Ne, value)
    }

    pub fn gt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Gt, value)
    }

    pub fn ge(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Ge, value)
    }

    pub fn lt(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Lt, value)
    }

    pub fn le(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(attribute, Operator::Le, value)
    }

    /// Pattern match. The pattern is encoded like a string leaf, so under
    /// json encoding `Jo%` becomes `"Jo%"` and still matches `"John"`.
    pub fn like(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::op(attribute, Operator::Like, Value::String(pattern.into()))
    }

    pub fn not_like(attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::op(attribute, Operator::NotLike, Value::String(pattern.into()))
    }

    pub fn between(
        attribute: impl Into<String>,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
    ) -> Self {
        Condition::Between {
            attribute: attribute.into(),
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    pub fn is_in<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Condition::In {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Condition::IsNull(attribute.into())
    }

    pub fn is_not_null(attribute: impl Into<String>) -> Self {
        Condition::IsNotNull(attribute.into())
    }

    pub fn every(condition: Condition) -> Self {
        Condition::Every(Box::new(condition))
    }

    /// Conjunction. Nested conjunctions are flattened.
    pub fn and(self, other: Condition) -> Self {
        match self {
            Condition::And(mut all) => {
                all.push(other);
                Condition::And(all)
            }
            first => Condition::And(vec![first, other]),
        }
    }

    /// Disjunction. Nested disjunctions are flattened.
    pub fn or(self, other: Condition) -> Self {
        match self {
            Condition::Or(mut any) => {
                any.push(other);
                Condition::Or(any)
            }
            first => Condition::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Self {
        Condition::Not(Box::new(self))
    }
}
