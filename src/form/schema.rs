use crate::form::path::{FieldPath, PathTemplate, Segment};
use crate::form::rules::Rule;
use crate::form::value::{FieldKind, Value};

/// Declarative description of a single leaf.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub default: Value,
    /// Evaluated in order; the first failure is reported.
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    /// Number and date kinds carry their type rule implicitly.
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        let rules = match kind {
            FieldKind::Number => vec![Rule::Number],
            FieldKind::Date => vec![Rule::Date],
            FieldKind::Text | FieldKind::Choice => Vec::new(),
        };
        Self {
            key,
            label,
            kind,
            default: Value::empty(),
            rules,
        }
    }

    pub fn required(mut self) -> Self {
        if !self.rules.contains(&Rule::Required) {
            self.rules.insert(0, Rule::Required);
        }
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = value;
        self
    }

    pub fn is_required(&self) -> bool {
        self.rules.contains(&Rule::Required)
    }

    /// All rules as one conjunction.
    pub fn rule(&self) -> Rule {
        Rule::All(self.rules.clone())
    }
}

/// A repeatable sub-record.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub item: Schema,
    /// Elements created with a fresh tree.
    pub min_items: usize,
}

/// Shape of a record: its leaves and its nested collections.
#[derive(Debug, Clone)]
pub struct Schema {
    pub name: &'static str,
    pub fields: Vec<FieldSpec>,
    pub collections: Vec<CollectionSpec>,
}

impl Schema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            collections: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a collection that always starts with one element.
    pub fn with_collection(self, key: &'static str, label: &'static str, item: Schema) -> Self {
        self.with_collection_spec(CollectionSpec {
            key,
            label,
            item,
            min_items: 1,
        })
    }

    pub fn with_collection_spec(mut self, spec: CollectionSpec) -> Self {
        self.collections.push(spec);
        self
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn collection(&self, key: &str) -> Option<&CollectionSpec> {
        self.collections.iter().find(|collection| collection.key == key)
    }

    /// Spec of the leaf addressed by `path`, ignoring indices.
    pub fn field_at(&self, path: &FieldPath) -> Option<&FieldSpec> {
        let (last, parents) = path.segments().split_last()?;
        let Segment::Field(key) = last else {
            return None;
        };
        self.descend(parents)?.field(key)
    }

    /// Spec of the collection addressed by `prefix` (e.g. `plans[0].payments`).
    pub fn collection_at(&self, prefix: &FieldPath) -> Option<&CollectionSpec> {
        let (last, parents) = prefix.segments().split_last()?;
        let Segment::Field(key) = last else {
            return None;
        };
        self.descend(parents)?.collection(key)
    }

    fn descend(&self, segments: &[Segment]) -> Option<&Schema> {
        segments.iter().try_fold(self, |schema, segment| match segment {
            Segment::Item(key, _) => schema.collection(key).map(|spec| &spec.item),
            Segment::Field(_) => None,
        })
    }

    /// Every leaf of the schema paired with its template, depth first.
    pub fn leaf_templates(&self) -> Vec<(PathTemplate, &FieldSpec)> {
        let mut out = Vec::new();
        self.collect_leaves(PathTemplate::root(), &mut out);
        out
    }

    fn collect_leaves<'a>(
        &'a self,
        prefix: PathTemplate,
        out: &mut Vec<(PathTemplate, &'a FieldSpec)>,
    ) {
        for field in &self.fields {
            out.push((prefix.clone().then(field.key), field));
        }
        for collection in &self.collections {
            collection
                .item
                .collect_leaves(prefix.clone().each(collection.key), out);
        }
    }
}
