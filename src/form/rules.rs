//! Composable field constraints and their single evaluator.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::form::record::Record;
use crate::form::value::Value;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is valid")
});

/// A single constraint kind. Format rules pass on blank values so that only
/// [`Rule::Required`] reports a missing entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    Email,
    Date,
    Number,
    OneOf(Vec<String>),
    /// The leaf, read as a date, must not fall after the sibling date `field`.
    NotAfter {
        field: &'static str,
        label: &'static str,
    },
    /// Conjunction, evaluated in order, first failure wins.
    All(Vec<Rule>),
}

impl Rule {
    pub fn one_of<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Rule::OneOf(options.into_iter().map(Into::into).collect())
    }

    /// Evaluates the rule for the leaf `value` whose owning record is
    /// `siblings`, returning the message of the first violation.
    pub fn check(&self, label: &str, value: &Value, siblings: &Record) -> Result<(), String> {
        match self {
            Rule::Required => {
                if value.is_blank() {
                    Err(format!("{} is required", label))
                } else {
                    Ok(())
                }
            }
            Rule::Email => match value {
                _ if value.is_blank() => Ok(()),
                Value::Text(text) if EMAIL.is_match(text.trim()) => Ok(()),
                _ => Err("Invalid email address".to_string()),
            },
            Rule::Date => {
                if value.is_blank() || value.as_date().is_some() {
                    Ok(())
                } else {
                    Err(format!("{} must be a valid date", label))
                }
            }
            Rule::Number => {
                if value.is_blank() || value.as_number().is_some() {
                    Ok(())
                } else {
                    Err(format!("{} must be a number", label))
                }
            }
            Rule::OneOf(options) => match value {
                _ if value.is_blank() => Ok(()),
                Value::Text(text) if options.iter().any(|option| option == text) => Ok(()),
                _ => Err(format!("{} must be one of: {}", label, options.join(", "))),
            },
            Rule::NotAfter {
                field,
                label: other,
            } => {
                let own = value.as_date();
                let bound = siblings.leaf(field).and_then(Value::as_date);
                match (own, bound) {
                    (Some(own), Some(bound)) if own > bound => {
                        Err(format!("{} must not be after {}", label, other))
                    }
                    _ => Ok(()),
                }
            }
            Rule::All(rules) => rules
                .iter()
                .try_for_each(|rule| rule.check(label, value, siblings)),
        }
    }

    /// Sibling keys this rule reads besides its own leaf.
    pub fn references(&self) -> Vec<&'static str> {
        match self {
            Rule::NotAfter { field, .. } => vec![*field],
            Rule::All(rules) => rules.iter().flat_map(Rule::references).collect(),
            _ => Vec::new(),
        }
    }
}
