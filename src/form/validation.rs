use std::collections::BTreeMap;

use tracing::debug;

use crate::form::path::{FieldPath, PathResolver, PathTemplate};
use crate::form::record::Record;
use crate::form::rules::Rule;
use crate::form::schema::Schema;

/// Violations keyed by leaf path. A path that is absent is valid.
pub type ErrorMap = BTreeMap<FieldPath, String>;

/// Rule attached to one template.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub label: &'static str,
    pub rule: Rule,
}

/// Rule table keyed by path template, interpreted by one generic evaluator.
///
/// Evaluation never mutates the tree, so a shared engine may be consulted
/// from any number of readers.
#[derive(Debug, Clone, Default)]
pub struct ValidationEngine {
    rules: BTreeMap<PathTemplate, FieldRule>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per schema leaf that carries at least one rule.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut engine = Self::new();
        for (template, field) in schema.leaf_templates() {
            if !field.rules.is_empty() {
                engine.insert(
                    template,
                    FieldRule {
                        label: field.label,
                        rule: field.rule(),
                    },
                );
            }
        }
        engine
    }

    /// Adds or replaces the rule for `template`.
    pub fn insert(&mut self, template: PathTemplate, rule: FieldRule) -> Option<FieldRule> {
        self.rules.insert(template, rule)
    }

    pub fn rule_for(&self, path: &FieldPath) -> Option<&FieldRule> {
        self.rules.get(&path.template())
    }

    pub fn templates(&self) -> impl Iterator<Item = &PathTemplate> {
        self.rules.keys()
    }

    /// Evaluates only the rule of `path`. Paths without a rule, or that do
    /// not resolve in `tree`, report nothing.
    pub fn validate_field(&self, tree: &Record, path: &FieldPath) -> Option<String> {
        let field_rule = self.rule_for(path)?;
        let value = match PathResolver::get(tree, path) {
            Ok(value) => value,
            Err(err) => {
                debug!("skipping validation of `{}`: {}", path, err);
                return None;
            }
        };
        let siblings = PathResolver::record_at(tree, &path.parent()).ok()?;
        field_rule
            .rule
            .check(field_rule.label, value, siblings)
            .err()
    }

    /// Evaluates every rule over every leaf its template expands to.
    pub fn validate_all(&self, tree: &Record) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for template in self.rules.keys() {
            for path in PathResolver::expand(tree, template) {
                if let Some(message) = self.validate_field(tree, &path) {
                    errors.insert(path, message);
                }
            }
        }
        errors
    }

    /// Sibling leaves whose rules read `path`, in the same record node.
    pub fn dependents(&self, path: &FieldPath) -> Vec<FieldPath> {
        let Some(leaf) = path.leaf_name() else {
            return Vec::new();
        };
        let owner = path.template().parent();
        self.rules
            .iter()
            .filter(|(template, field_rule)| {
                template.parent() == owner
                    && field_rule.rule.references().iter().any(|name| *name == leaf)
            })
            .filter_map(|(template, _)| template.leaf_name())
            .map(|name| path.parent().then(name))
            .collect()
    }
}
