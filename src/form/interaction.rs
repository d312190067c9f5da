use std::collections::BTreeSet;

use crate::form::path::FieldPath;

/// Records which leaves the user has interacted with.
///
/// Whether an error is shown is decided by the caller: a path's message is
/// visible only once the path is touched.
#[derive(Debug, Clone, Default)]
pub struct InteractionTracker {
    touched: BTreeSet<FieldPath>,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` as interacted; returns `true` the first time.
    pub fn touch(&mut self, path: FieldPath) -> bool {
        self.touched.insert(path)
    }

    pub fn touch_all<I: IntoIterator<Item = FieldPath>>(&mut self, paths: I) {
        self.touched.extend(paths);
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.touched.iter()
    }

    pub fn len(&self) -> usize {
        self.touched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    pub fn clear(&mut self) {
        self.touched.clear();
    }
}
