//! Result paging

use serde::Deserialize;

/// Window over the matching resources, in provider order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: Option<usize>,
}

impl PageRequest {
    #[must_use]
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// The first `limit` resources
    #[must_use]
    pub fn first(limit: usize) -> Self {
        Self::new(0, Some(limit))
    }

    /// Apply the window to `items`.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let window = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        }
    }
}
