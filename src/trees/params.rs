use super::split::SplitSearch;
use crate::error::TreeError;

#[derive(Clone, Debug, Default)]
pub struct TreeClassifierParams {
    /// `None` grows the tree until every leaf is pure or cannot be split.
    max_depth: Option<u16>,
    split_search: SplitSearch,
}

impl TreeClassifierParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// A depth of 0 makes the whole tree a single leaf.
    pub fn set_max_depth(&mut self, max_depth: Option<u16>) {
        self.max_depth = max_depth;
    }

    pub fn set_split_search(&mut self, split_search: SplitSearch) -> Result<(), TreeError> {
        if let SplitSearch::Parallel { workers: 0 } = split_search {
            return Err(TreeError::InvalidWorkerCount(0));
        }
        self.split_search = split_search;
        Ok(())
    }

    pub fn max_depth(&self) -> Option<u16> {
        self.max_depth
    }

    pub fn split_search(&self) -> SplitSearch {
        self.split_search
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = TreeClassifierParams::new();
        assert_eq!(params.max_depth(), None);
        assert_eq!(params.split_search(), SplitSearch::Parallel { workers: 2 });
    }

    #[test]
    fn test_set_split_search_rejects_zero_workers() {
        let mut params = TreeClassifierParams::new();
        assert!(params
            .set_split_search(SplitSearch::Parallel { workers: 0 })
            .is_err());
        assert!(params.set_split_search(SplitSearch::Sequential).is_ok());
        assert_eq!(params.split_search(), SplitSearch::Sequential);
    }
}
