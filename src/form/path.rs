//! Typed addressing for the record tree.
//!
//! A [`FieldPath`] names exactly one node (`plans[0].payments[0].amountPaid`);
//! a [`PathTemplate`] names a family of leaves (`plans[*].trainingType`) and
//! is what rule tables are keyed by. [`PathResolver`] turns either into
//! accessors over a [`Record`].

use std::fmt;
use std::str::FromStr;

use crate::errors::PathError;
use crate::form::record::{Node, Record};
use crate::form::schema::Schema;
use crate::form::value::Value;

/// One step of a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// A named field of the current record.
    Field(String),
    /// Element `index` of the collection `field`.
    Item(String, usize),
}

impl Segment {
    pub fn name(&self) -> &str {
        match self {
            Segment::Field(name) | Segment::Item(name, _) => name,
        }
    }
}

/// Concrete, fully indexed path into a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path, addressing the record itself.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::root().then(name)
    }

    pub fn then(mut self, name: impl Into<String>) -> Self {
        self.segments.push(Segment::Field(name.into()));
        self
    }

    pub fn item(mut self, name: impl Into<String>, index: usize) -> Self {
        self.segments.push(Segment::Item(name.into(), index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Name of the final segment, if any.
    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(Segment::name)
    }

    /// Everything but the final segment.
    pub fn parent(&self) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.pop();
        FieldPath { segments }
    }

    /// The template this path instantiates (indices replaced by `[*]`).
    pub fn template(&self) -> PathTemplate {
        PathTemplate {
            segments: self
                .segments
                .iter()
                .map(|segment| match segment {
                    Segment::Field(name) => TemplateSegment::Field(name.clone()),
                    Segment::Item(name, _) => TemplateSegment::Each(name.clone()),
                })
                .collect(),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            match segment {
                Segment::Field(name) => f.write_str(name)?,
                Segment::Item(name, index) => write!(f, "{}[{}]", name, index)?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut path = FieldPath::root();
        for part in split_parts(input)? {
            path.segments.push(match part {
                RawPart::Field(name) => Segment::Field(name.to_string()),
                RawPart::Index(name, index) => Segment::Item(name.to_string(), index),
                RawPart::Each(_) => return Err(PathError::Malformed(input.to_string())),
            });
        }
        Ok(path)
    }
}

/// One step of a path template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateSegment {
    Field(String),
    /// Every element of the named collection.
    Each(String),
}

impl TemplateSegment {
    pub fn name(&self) -> &str {
        match self {
            TemplateSegment::Field(name) | TemplateSegment::Each(name) => name,
        }
    }
}

/// Leaf-path pattern with `[*]` wildcards over collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathTemplate {
    segments: Vec<TemplateSegment>,
}

impl PathTemplate {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::root().then(name)
    }

    pub fn then(mut self, name: impl Into<String>) -> Self {
        self.segments.push(TemplateSegment::Field(name.into()));
        self
    }

    pub fn each(mut self, name: impl Into<String>) -> Self {
        self.segments.push(TemplateSegment::Each(name.into()));
        self
    }

    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    pub fn leaf_name(&self) -> Option<&str> {
        self.segments.last().map(TemplateSegment::name)
    }

    pub fn parent(&self) -> PathTemplate {
        let mut segments = self.segments.clone();
        segments.pop();
        PathTemplate { segments }
    }

    pub fn matches(&self, path: &FieldPath) -> bool {
        path.template() == *self
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.segments.iter().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            match segment {
                TemplateSegment::Field(name) => f.write_str(name)?,
                TemplateSegment::Each(name) => write!(f, "{}[*]", name)?,
            }
        }
        Ok(())
    }
}

impl FromStr for PathTemplate {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut template = PathTemplate::root();
        for part in split_parts(input)? {
            template.segments.push(match part {
                RawPart::Field(name) => TemplateSegment::Field(name.to_string()),
                RawPart::Each(name) => TemplateSegment::Each(name.to_string()),
                RawPart::Index(_, _) => return Err(PathError::Malformed(input.to_string())),
            });
        }
        Ok(template)
    }
}

enum RawPart<'a> {
    Field(&'a str),
    Index(&'a str, usize),
    Each(&'a str),
}

fn split_parts(input: &str) -> Result<Vec<RawPart<'_>>, PathError> {
    let malformed = || PathError::Malformed(input.to_string());
    if input.trim().is_empty() {
        return Err(malformed());
    }
    input
        .split('.')
        .map(|part| {
            let (name, index) = match part.split_once('[') {
                Some((name, rest)) => (name, Some(rest.strip_suffix(']').ok_or_else(malformed)?)),
                None => (part, None),
            };
            let valid_name = !name.is_empty()
                && name
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
            if !valid_name {
                return Err(malformed());
            }
            match index {
                None => Ok(RawPart::Field(name)),
                Some("*") => Ok(RawPart::Each(name)),
                Some(digits) => digits
                    .parse::<usize>()
                    .map(|index| RawPart::Index(name, index))
                    .map_err(|_| malformed()),
            }
        })
        .collect()
}

/// Get/set accessors over a [`Record`] addressed by [`FieldPath`].
pub struct PathResolver;

impl PathResolver {
    /// Reads the leaf at `path`.
    pub fn get<'a>(record: &'a Record, path: &FieldPath) -> Result<&'a Value, PathError> {
        let (parent, leaf) = Self::split_leaf(path)?;
        let owner = Self::record_at(record, &parent)?;
        match owner.node(leaf) {
            Some(Node::Leaf(value)) => Ok(value),
            Some(Node::Items(_)) => Err(PathError::NotALeaf(path.to_string())),
            None => Err(PathError::UnknownField(path.to_string())),
        }
    }

    /// Replaces the leaf at `path`, returning the previous value.
    pub fn set(record: &mut Record, path: &FieldPath, value: Value) -> Result<Value, PathError> {
        let (parent, leaf) = Self::split_leaf(path)?;
        let owner = Self::record_at_mut(record, &parent)?;
        match owner.node_mut(leaf) {
            Some(Node::Leaf(slot)) => Ok(std::mem::replace(slot, value)),
            Some(Node::Items(_)) => Err(PathError::NotALeaf(path.to_string())),
            None => Err(PathError::UnknownField(path.to_string())),
        }
    }

    /// Resolves a path made only of indexed segments to the sub-record it
    /// names. The root path resolves to `record` itself.
    pub fn record_at<'a>(record: &'a Record, path: &FieldPath) -> Result<&'a Record, PathError> {
        let mut current = record;
        for segment in path.segments() {
            let Segment::Item(name, index) = segment else {
                return Err(PathError::Malformed(path.to_string()));
            };
            current = match current.node(name) {
                Some(Node::Items(items)) => {
                    items.get(*index).ok_or_else(|| PathError::IndexOutOfRange {
                        path: path.to_string(),
                        index: *index,
                        len: items.len(),
                    })?
                }
                Some(Node::Leaf(_)) => return Err(PathError::NotACollection(path.to_string())),
                None => return Err(PathError::UnknownField(path.to_string())),
            };
        }
        Ok(current)
    }

    fn record_at_mut<'a>(
        record: &'a mut Record,
        path: &FieldPath,
    ) -> Result<&'a mut Record, PathError> {
        let mut current = record;
        for segment in path.segments() {
            let Segment::Item(name, index) = segment else {
                return Err(PathError::Malformed(path.to_string()));
            };
            current = match current.node_mut(name) {
                Some(Node::Items(items)) => {
                    let len = items.len();
                    items
                        .get_mut(*index)
                        .ok_or_else(|| PathError::IndexOutOfRange {
                            path: path.to_string(),
                            index: *index,
                            len,
                        })?
                }
                Some(Node::Leaf(_)) => return Err(PathError::NotACollection(path.to_string())),
                None => return Err(PathError::UnknownField(path.to_string())),
            };
        }
        Ok(current)
    }

    /// Number of elements in the collection named by `prefix`
    /// (e.g. `plans` or `plans[0].payments`).
    pub fn len(record: &Record, prefix: &FieldPath) -> Result<usize, PathError> {
        let (parent, name) = Self::split_collection(prefix)?;
        match Self::record_at(record, &parent)?.node(name) {
            Some(Node::Items(items)) => Ok(items.len()),
            Some(Node::Leaf(_)) => Err(PathError::NotACollection(prefix.to_string())),
            None => Err(PathError::UnknownField(prefix.to_string())),
        }
    }

    /// Grows the collection named by `prefix` by one default element built
    /// from `schema`, returning the new element's index.
    pub fn append(
        record: &mut Record,
        schema: &Schema,
        prefix: &FieldPath,
    ) -> Result<usize, PathError> {
        let spec = schema
            .collection_at(prefix)
            .ok_or_else(|| PathError::NotACollection(prefix.to_string()))?;
        let (parent, name) = Self::split_collection(prefix)?;
        match Self::record_at_mut(record, &parent)?.node_mut(name) {
            Some(Node::Items(items)) => {
                items.push(Record::from_schema(&spec.item));
                Ok(items.len() - 1)
            }
            Some(Node::Leaf(_)) => Err(PathError::NotACollection(prefix.to_string())),
            None => Err(PathError::UnknownField(prefix.to_string())),
        }
    }

    /// Every concrete leaf path matching `template` in `record`.
    pub fn expand(record: &Record, template: &PathTemplate) -> Vec<FieldPath> {
        let mut out = Vec::new();
        expand_into(record, template.segments(), FieldPath::root(), &mut out);
        out
    }

    fn split_leaf(path: &FieldPath) -> Result<(FieldPath, &str), PathError> {
        match path.segments().last() {
            Some(Segment::Field(name)) => Ok((path.parent(), name.as_str())),
            Some(Segment::Item(_, _)) | None => Err(PathError::NotALeaf(path.to_string())),
        }
    }

    fn split_collection(prefix: &FieldPath) -> Result<(FieldPath, &str), PathError> {
        match prefix.segments().last() {
            Some(Segment::Field(name)) => Ok((prefix.parent(), name.as_str())),
            Some(Segment::Item(_, _)) | None => {
                Err(PathError::NotACollection(prefix.to_string()))
            }
        }
    }
}

fn expand_into(
    record: &Record,
    remaining: &[TemplateSegment],
    prefix: FieldPath,
    out: &mut Vec<FieldPath>,
) {
    let Some((head, rest)) = remaining.split_first() else {
        return;
    };
    match head {
        TemplateSegment::Field(name) => {
            if rest.is_empty() && matches!(record.node(name), Some(Node::Leaf(_))) {
                out.push(prefix.then(name.clone()));
            }
        }
        TemplateSegment::Each(name) => {
            if let Some(Node::Items(items)) = record.node(name) {
                for (index, item) in items.iter().enumerate() {
                    expand_into(item, rest, prefix.clone().item(name.clone(), index), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::schema::{FieldSpec, Schema};
    use crate::form::value::FieldKind;

    fn schema() -> Schema {
        Schema::new("order")
            .with_field(FieldSpec::new("name", "Name", FieldKind::Text))
            .with_collection(
                "lines",
                "Lines",
                Schema::new("line")
                    .with_field(FieldSpec::new("sku", "SKU", FieldKind::Text))
                    .with_collection(
                        "splits",
                        "Splits",
                        Schema::new("split").with_field(
                            FieldSpec::new("amount", "Amount", FieldKind::Number)
                                .with_default(Value::Number(0.0)),
                        ),
                    ),
            )
    }

    #[test]
    fn parses_and_displays_indexed_paths() {
        let path: FieldPath = "lines[0].splits[2].amount".parse().unwrap();
        assert_eq!(
            path,
            FieldPath::root()
                .item("lines", 0)
                .item("splits", 2)
                .then("amount")
        );
        assert_eq!(path.to_string(), "lines[0].splits[2].amount");
        assert_eq!(path.template().to_string(), "lines[*].splits[*].amount");
    }

    #[test]
    fn rejects_malformed_paths() {
        for raw in ["", "a..b", "a[", "a[x]", "a[*]", "[0]", "a-b"] {
            assert!(
                matches!(raw.parse::<FieldPath>(), Err(PathError::Malformed(_))),
                "{raw} should be malformed"
            );
        }
        assert!("lines[0].sku".parse::<PathTemplate>().is_err());
        assert!("lines[*].sku".parse::<PathTemplate>().is_ok());
    }

    #[test]
    fn set_then_get_round_trips() {
        let schema = schema();
        let mut record = Record::from_schema(&schema);
        let path: FieldPath = "lines[0].splits[0].amount".parse().unwrap();
        let previous = PathResolver::set(&mut record, &path, Value::Number(12.0)).unwrap();
        assert_eq!(previous, Value::Number(0.0));
        assert_eq!(PathResolver::get(&record, &path).unwrap(), &Value::Number(12.0));
    }

    #[test]
    fn reports_addressing_errors() {
        let schema = schema();
        let mut record = Record::from_schema(&schema);
        let out_of_range: FieldPath = "lines[3].sku".parse().unwrap();
        assert!(matches!(
            PathResolver::get(&record, &out_of_range),
            Err(PathError::IndexOutOfRange { index: 3, len: 1, .. })
        ));
        let unknown = FieldPath::field("missing");
        assert!(matches!(
            PathResolver::set(&mut record, &unknown, Value::empty()),
            Err(PathError::UnknownField(_))
        ));
        let collection = FieldPath::field("lines");
        assert!(matches!(
            PathResolver::get(&record, &collection),
            Err(PathError::NotALeaf(_))
        ));
    }

    #[test]
    fn append_grows_nested_collections() {
        let schema = schema();
        let mut record = Record::from_schema(&schema);
        let lines = FieldPath::field("lines");
        assert_eq!(PathResolver::append(&mut record, &schema, &lines).unwrap(), 1);
        let splits = FieldPath::root().item("lines", 1).then("splits");
        assert_eq!(PathResolver::len(&record, &splits).unwrap(), 1);
        assert_eq!(PathResolver::append(&mut record, &schema, &splits).unwrap(), 1);
        assert_eq!(PathResolver::len(&record, &splits).unwrap(), 2);
        assert!(PathResolver::append(&mut record, &schema, &FieldPath::field("name")).is_err());
    }

    #[test]
    fn expands_templates_over_actual_lengths() {
        let schema = schema();
        let mut record = Record::from_schema(&schema);
        PathResolver::append(&mut record, &schema, &FieldPath::field("lines")).unwrap();
        let template: PathTemplate = "lines[*].splits[*].amount".parse().unwrap();
        let paths: Vec<String> = PathResolver::expand(&record, &template)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            paths,
            vec!["lines[0].splits[0].amount", "lines[1].splits[0].amount"]
        );
    }
}
