//! Work items and batch validation.
//!
//! A [`Batch`] is the unit of submission: an ordered, duplicate-free
//! sequence of [`WorkItem`]s. Validation happens when the batch is built,
//! so a rejected batch never schedules any work.

use crate::error::SubmissionError;
use std::collections::HashSet;

/// One named unit of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    name: String,
    payload: String,
}

impl WorkItem {
    /// Create a new work item.
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }

    /// Unique key of the item within its batch.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw content to transform.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Split the item into its name and payload.
    pub fn into_parts(self) -> (String, String) {
        (self.name, self.payload)
    }
}

impl<N: Into<String>, P: Into<String>> From<(N, P)> for WorkItem {
    fn from((name, payload): (N, P)) -> Self {
        Self::new(name, payload)
    }
}

/// A validated, ordered batch of work items.
///
/// # Example
///
/// ```rust
/// use headless::item::Batch;
///
/// let batch = Batch::new([("a", "1"), ("b", "2")]).unwrap();
/// assert_eq!(batch.len(), 2);
///
/// assert!(Batch::new([("a", "1"), ("a", "2")]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    items: Vec<WorkItem>,
}

impl Batch {
    /// Build a batch from `(name, payload)` pairs, keeping their order.
    ///
    /// Fails on the first empty or repeated name.
    pub fn new<I, T>(items: I) -> Result<Self, SubmissionError>
    where
        I: IntoIterator<Item = T>,
        T: Into<WorkItem>,
    {
        let items: Vec<WorkItem> = items.into_iter().map(Into::into).collect();

        let mut seen = HashSet::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if item.name.is_empty() {
                return Err(SubmissionError::EmptyName { index });
            }
            if !seen.insert(item.name.as_str()) {
                return Err(SubmissionError::DuplicateName {
                    name: item.name.clone(),
                });
            }
        }

        Ok(Self { items })
    }

    /// Build a batch from a name-keyed mapping.
    ///
    /// Keys of a map are already unique, so only empty names can fail.
    /// Items keep the map's iteration order.
    pub fn from_map<M, K, V>(map: M) -> Result<Self, SubmissionError>
    where
        M: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(map.into_iter().map(|(k, v)| WorkItem::new(k, v)))
    }

    /// An empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the batch has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item names in submission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(WorkItem::name)
    }

    /// Borrow the items.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub(crate) fn into_items(self) -> Vec<WorkItem> {
        self.items
    }
}

impl TryFrom<Vec<WorkItem>> for Batch {
    type Error = SubmissionError;

    fn try_from(items: Vec<WorkItem>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}
