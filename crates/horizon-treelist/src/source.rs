//! On-demand population of rows from an external hierarchy.
//!
//! The control never loads anything by itself. A [`LazyPopulator`] listens
//! to `row_expanded`, remembers which rows were expanded, and loads their
//! children from a [`HierarchySource`] when the host calls
//! [`populate`](LazyPopulator::populate), after the triggering operation has
//! returned.
//!
//! ```
//! use horizon_treelist::source::{HierarchySource, LazyPopulator};
//! use horizon_treelist::{CellValue, RowContainer, TreeListControl, TreeListError};
//!
//! /// Numbers whose children are their multiples up to 20.
//! struct Multiples;
//!
//! impl HierarchySource for Multiples {
//!     type Item = u32;
//!     type Error = TreeListError;
//!
//!     fn roots(&self) -> Result<Vec<u32>, TreeListError> {
//!         Ok(vec![2, 3])
//!     }
//!
//!     fn is_container(&self, item: &u32) -> bool {
//!         item * 2 <= 20
//!     }
//!
//!     fn children(&self, item: &u32) -> Result<Vec<u32>, TreeListError> {
//!         Ok((2..).map(|n| n * item).take_while(|&n| n <= 20).collect())
//!     }
//!
//!     fn cells(&self, item: &u32) -> Vec<CellValue> {
//!         vec![CellValue::from(i64::from(*item))]
//!     }
//! }
//!
//! let mut control = TreeListControl::default();
//! let mut populator = LazyPopulator::attach(&control);
//! populator.add_roots(&mut control, &Multiples).unwrap();
//!
//! let three = control.rows(RowContainer::Root).unwrap()[1];
//! control.expand(three).unwrap();
//! assert_eq!(populator.populate(&mut control, &Multiples).unwrap(), 1);
//! assert_eq!(control.visible_row_count(), 2 + 5);
//! ```

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::TreeListError;
use crate::logging::{span_names, targets};
use crate::model::{CellValue, Row, RowContainer, RowKey, Tag};
use crate::signal::ConnectionId;
use crate::view::TreeListControl;

/// A hierarchy whose children can be enumerated on demand.
pub trait HierarchySource {
    /// One node of the hierarchy; stored in the tag of its row.
    type Item: Clone + Send + Sync + 'static;
    /// Enumeration failure; control errors convert into it.
    type Error: From<TreeListError>;

    /// The top-level items.
    fn roots(&self) -> Result<Vec<Self::Item>, Self::Error>;

    /// Whether the item may have children that were not fetched yet.
    fn is_container(&self, item: &Self::Item) -> bool;

    /// Enumerates the children of a container item.
    fn children(&self, item: &Self::Item) -> Result<Vec<Self::Item>, Self::Error>;

    /// Cell values of the item's row, one per column.
    fn cells(&self, item: &Self::Item) -> Vec<CellValue>;
}

/// Loads the children of expanded rows once each.
#[derive(Debug)]
pub struct LazyPopulator {
    pending: Arc<Mutex<VecDeque<RowKey>>>,
    loaded: HashSet<RowKey>,
    connection: ConnectionId,
}

impl LazyPopulator {
    /// Starts recording the rows `control` expands.
    pub fn attach(control: &TreeListControl) -> Self {
        let pending = Arc::new(Mutex::new(VecDeque::new()));
        let queue = Arc::clone(&pending);
        let connection = control
            .row_expanded
            .observe(move |event| queue.lock().push_back(event.key));
        Self {
            pending,
            loaded: HashSet::new(),
            connection,
        }
    }

    /// Stops recording expansions.
    pub fn detach(self, control: &TreeListControl) {
        control.row_expanded.disconnect(self.connection);
    }

    /// Number of expanded rows waiting to be populated.
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Whether the children of `key` were loaded already.
    pub fn is_loaded(&self, key: RowKey) -> bool {
        self.loaded.contains(&key)
    }

    /// Marks a row unloaded so its next expansion loads its children again.
    ///
    /// The caller clears the row's current children first. Returns `false`
    /// if the row was not loaded.
    pub fn forget(&mut self, key: RowKey) -> bool {
        self.loaded.remove(&key)
    }

    /// Adds a row for every top-level item of `source`.
    pub fn add_roots<S: HierarchySource>(
        &mut self,
        control: &mut TreeListControl,
        source: &S,
    ) -> Result<usize, S::Error> {
        let roots = source.roots()?;
        self.add_items(control, RowContainer::Root, source, roots)
    }

    /// Adds a row per item to `container`.
    ///
    /// Container items get an expander before their children are known.
    pub fn add_items<S: HierarchySource>(
        &mut self,
        control: &mut TreeListControl,
        container: RowContainer,
        source: &S,
        items: Vec<S::Item>,
    ) -> Result<usize, S::Error> {
        let count = items.len();
        let mut rows = control.rows_mut(container);
        for item in items {
            let mut row = Row::with_cells(source.cells(&item));
            if source.is_container(&item) {
                row = row.with_expandable(true);
            }
            rows.add(row.with_tag(Tag::new(item)))?;
        }
        Ok(count)
    }

    /// Populates every recorded row, including rows expanded while
    /// populating. Returns the number of rows populated.
    ///
    /// Rows removed from the control since the last call are forgotten. On
    /// error the failing row stays unloaded and the rest stay queued.
    pub fn populate<S: HierarchySource>(
        &mut self,
        control: &mut TreeListControl,
        source: &S,
    ) -> Result<usize, S::Error> {
        let _span =
            tracing::debug_span!(target: targets::SOURCE, "populate", operation = span_names::POPULATE)
                .entered();
        let before = self.loaded.len();
        self.loaded.retain(|&key| control.row(key).is_some());
        if self.loaded.len() != before {
            tracing::trace!(
                target: targets::SOURCE,
                pruned = before - self.loaded.len(),
                "forgot removed rows"
            );
        }

        let mut populated = 0;
        loop {
            let Some(key) = self.pending.lock().pop_front() else {
                break;
            };
            match self.populate_row(control, source, key) {
                Ok(true) => populated += 1,
                Ok(false) => {}
                Err(error) => {
                    self.pending.lock().push_front(key);
                    return Err(error);
                }
            }
        }
        Ok(populated)
    }

    /// Loads the children of one row now, unless they were loaded before.
    ///
    /// Returns `false` if the row is gone, was loaded already or does not
    /// carry an item of `source`. Once loaded, the row's expander follows
    /// its actual children.
    pub fn populate_row<S: HierarchySource>(
        &mut self,
        control: &mut TreeListControl,
        source: &S,
        key: RowKey,
    ) -> Result<bool, S::Error> {
        let Some(item) = control
            .row(key)
            .and_then(Row::tag)
            .and_then(|tag| tag.downcast_ref::<S::Item>())
            .cloned()
        else {
            self.loaded.remove(&key);
            return Ok(false);
        };
        if !self.loaded.insert(key) {
            return Ok(false);
        }

        let children = match source.children(&item) {
            Ok(children) => children,
            Err(error) => {
                self.loaded.remove(&key);
                tracing::warn!(target: targets::SOURCE, %key, "failed to enumerate children");
                return Err(error);
            }
        };
        let count = self.add_items(control, key.into(), source, children)?;
        control.modify_row(key, |row| row.set_expandable(None))?;
        tracing::debug!(target: targets::SOURCE, %key, count, "populated row");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Paths separated by `/`; a path is a container if it is a key.
    struct MapSource {
        children: HashMap<&'static str, Vec<&'static str>>,
        failing: Option<&'static str>,
    }

    impl MapSource {
        fn new() -> Self {
            let children = HashMap::from([
                ("", vec!["docs", "src"]),
                ("docs", vec!["docs/a.md", "docs/b.md"]),
                ("src", vec!["src/lib", "src/main.rs"]),
                ("src/lib", vec!["src/lib/mod.rs"]),
                ("empty", vec![]),
            ]);
            Self {
                children,
                failing: None,
            }
        }
    }

    impl HierarchySource for MapSource {
        type Item = String;
        type Error = TreeListError;

        fn roots(&self) -> Result<Vec<String>, TreeListError> {
            self.children(&String::new())
        }

        fn is_container(&self, item: &String) -> bool {
            self.children.contains_key(item.as_str())
        }

        fn children(&self, item: &String) -> Result<Vec<String>, TreeListError> {
            if self.failing == Some(item.as_str()) {
                return Err(TreeListError::NoResizeInProgress);
            }
            Ok(self
                .children
                .get(item.as_str())
                .map(|children| children.iter().map(|c| c.to_string()).collect())
                .unwrap_or_default())
        }

        fn cells(&self, item: &String) -> Vec<CellValue> {
            let name = item.rsplit('/').next().unwrap_or_default();
            vec![CellValue::from(name.to_string())]
        }
    }

    fn texts(control: &TreeListControl) -> Vec<String> {
        control
            .cache()
            .keys()
            .map(|key| control.row(key).unwrap().text())
            .collect()
    }

    fn root(control: &TreeListControl, index: usize) -> RowKey {
        control.rows(RowContainer::Root).unwrap()[index]
    }

    #[test]
    fn test_roots_are_expandable_before_loading() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        assert_eq!(populator.add_roots(&mut control, &source).unwrap(), 2);

        let docs = root(&control, 0);
        assert!(control.row(docs).unwrap().is_expandable());
        assert!(!control.row(docs).unwrap().has_children());
    }

    #[test]
    fn test_populate_after_expand() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();

        let src = root(&control, 1);
        control.expand(src).unwrap();
        assert_eq!(populator.pending_count(), 1);
        assert_eq!(texts(&control), vec!["docs", "src"]);

        assert_eq!(populator.populate(&mut control, &source).unwrap(), 1);
        assert_eq!(texts(&control), vec!["docs", "src", "lib", "main.rs"]);
        assert!(populator.is_loaded(src));

        // Collapsing and expanding again does not load twice.
        control.collapse(src).unwrap();
        control.expand(src).unwrap();
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 0);
        assert_eq!(control.tree().children_of(src.into()).unwrap().len(), 2);
        assert!(control.is_consistent());
    }

    #[test]
    fn test_populate_follows_nested_expansion() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();

        control.expand_all();
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 2);
        control.expand_all();
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 1);
        assert_eq!(
            texts(&control),
            vec!["docs", "a.md", "b.md", "src", "lib", "mod.rs", "main.rs"]
        );
    }

    #[test]
    fn test_empty_container_loses_expander() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator
            .add_items(&mut control, RowContainer::Root, &source, vec!["empty".to_string()])
            .unwrap();

        let empty = root(&control, 0);
        assert!(control.row(empty).unwrap().is_expandable());
        populator.populate_row(&mut control, &source, empty).unwrap();
        assert!(!control.row(empty).unwrap().is_expandable());
    }

    #[test]
    fn test_failed_enumeration_stays_queued() {
        let mut source = MapSource::new();
        source.failing = Some("docs");
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();

        let docs = root(&control, 0);
        control.expand(docs).unwrap();
        assert!(populator.populate(&mut control, &source).is_err());
        assert_eq!(populator.pending_count(), 1);
        assert!(!populator.is_loaded(docs));

        source.failing = None;
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 1);
        assert_eq!(control.visible_row_count(), 4);
    }

    #[test]
    fn test_removed_rows_are_forgotten() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();

        let docs = root(&control, 0);
        control.expand(docs).unwrap();
        populator.populate(&mut control, &source).unwrap();
        assert!(populator.is_loaded(docs));

        control.rows_mut(RowContainer::Root).remove(docs).unwrap();
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 0);
        assert!(!populator.is_loaded(docs));
    }

    #[test]
    fn test_forget_reloads_on_next_expand() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();

        let src = root(&control, 1);
        control.expand(src).unwrap();
        populator.populate(&mut control, &source).unwrap();
        assert!(populator.forget(src));
        assert!(!populator.forget(src));

        control.rows_mut(src.into()).clear().unwrap();
        control.collapse(src).unwrap();
        control.expand(src).unwrap();
        assert_eq!(populator.populate(&mut control, &source).unwrap(), 1);
        assert_eq!(control.tree().children_of(src.into()).unwrap().len(), 2);
        assert!(control.is_consistent());
    }

    #[test]
    fn test_detach_stops_recording() {
        let source = MapSource::new();
        let mut control = TreeListControl::default();
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();
        populator.detach(&control);
        assert_eq!(control.row_expanded.connection_count(), 0);
    }
}
