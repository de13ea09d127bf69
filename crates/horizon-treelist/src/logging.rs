//! Logging and debugging facilities for the tree/list control.
//!
//! This module provides:
//! - Target and span names for filtering the control's `tracing` output
//! - A text dump of the row cache for inspecting the visible hierarchy
//!
//! # Tracing Integration
//!
//! The control only emits events; the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treelist::cache=trace")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_treelist::logging::CacheTreeDebug;
//! use horizon_treelist::{Row, RowContainer, TreeListControl};
//!
//! let mut control = TreeListControl::default();
//! control.rows_mut(RowContainer::Root).add(Row::with_cells(["docs"])).unwrap();
//! let dump = CacheTreeDebug::new().format(control.cache(), control.tree());
//! assert!(dump.contains("docs"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::model::RowTree;
use crate::view::RowCache;

/// Span names used by the control for tracing.
pub mod span_names {
    /// Expanding every row.
    pub const EXPAND_ALL: &str = "horizon_treelist::expand_all";
    /// Collapsing every row.
    pub const COLLAPSE_ALL: &str = "horizon_treelist::collapse_all";
    /// Loading children of expanded rows on demand.
    pub const POPULATE: &str = "horizon_treelist::populate";
}

/// Target names for log filtering.
pub mod targets {
    /// Control facade target.
    pub const CONTROL: &str = "horizon_treelist::control";
    /// Row cache and index target.
    pub const CACHE: &str = "horizon_treelist::cache";
    /// Selection and focus target.
    pub const SELECTION: &str = "horizon_treelist::selection";
    /// Scrolling and hit testing target.
    pub const VIEWPORT: &str = "horizon_treelist::viewport";
    /// Notification signals target.
    pub const SIGNAL: &str = "horizon_treelist::signal";
    /// Lazy population target.
    pub const SOURCE: &str = "horizon_treelist::source";
}

/// Style options for cache tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Indentation only.
    Compact,
}

/// Configuration for cache tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show row keys.
    pub show_keys: bool,
    /// Whether to show expanded/selected flags.
    pub show_state: bool,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_keys: true,
            show_state: true,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options for text only.
    pub fn minimal() -> Self {
        Self {
            show_keys: false,
            show_state: false,
            ..Default::default()
        }
    }
}

/// Renders the row cache as an indented tree, one visible row per line.
#[derive(Debug, Clone, Default)]
pub struct CacheTreeDebug {
    options: TreeFormatOptions,
}

impl CacheTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Formats every cached row, labelled with its first cell.
    pub fn format(&self, cache: &RowCache, tree: &RowTree) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "Row cache ({} visible of {} rows):", cache.len(), tree.len());
        if cache.is_empty() {
            output.push_str("  (empty)\n");
            return output;
        }

        let entries = cache.as_slice();
        for (position, entry) in entries.iter().enumerate() {
            // Last among its siblings if the next entry at or above its level
            // is shallower, or there is none.
            let is_last = entries[position + 1..]
                .iter()
                .find(|next| next.level <= entry.level)
                .is_none_or(|next| next.level < entry.level);

            output.push_str(&self.build_prefix(entry.level, is_last));
            let Some(row) = tree.get(entry.key) else {
                let _ = writeln!(output, "(missing {})", entry.key);
                continue;
            };
            let text = row.text();
            output.push_str(if text.is_empty() { "(empty)" } else { &text });
            if self.options.show_keys {
                let _ = write!(output, " [{}]", entry.key);
            }
            if self.options.show_state {
                if row.is_expandable() {
                    output.push_str(if row.is_expanded() { " -" } else { " +" });
                }
                if row.is_selected() {
                    output.push_str(" *");
                }
            }
            output.push('\n');
        }
        output
    }

    fn build_prefix(&self, depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, tee, corner) = match self.options.style {
            TreeStyle::Ascii => ("|", "+-- ", "`-- "),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} "),
            TreeStyle::Compact => ("", "", ""),
        };

        let mut prefix = String::new();
        for _ in 0..depth - 1 {
            prefix.push_str(branch);
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        }
        if self.options.style == TreeStyle::Compact {
            prefix.extend(std::iter::repeat_n(' ', self.options.indent_size));
        } else {
            prefix.push_str(if is_last { corner } else { tee });
        }
        prefix
    }
}
