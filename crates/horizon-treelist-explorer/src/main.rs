//! Sample file explorer for the Horizon Lattice tree/list control.
//!
//! Lists a directory with the columns Name, Date modified, Type and Size,
//! loading folder contents lazily as rows are expanded, and prints the
//! control's visible window as text.
//!
//! ```text
//! horizon-treelist-explorer [--config <file>] [--expand <depth>] [ROOT]
//! ```
//!
//! Set `RUST_LOG=debug` to trace cache, selection and population activity.

mod config;
mod error;
mod fs_source;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use horizon_treelist::{Column, HorizontalAlignment, LazyPopulator, RowKey, TreeListControl};
use tracing_subscriber::EnvFilter;

use crate::config::ExplorerConfig;
use crate::error::{ExplorerError, Result};
use crate::fs_source::FsSource;

/// Command-line overrides of the configuration.
#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    expand: Option<usize>,
    root: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().ok_or_else(|| missing_value(&arg))?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--expand" => {
                    let value = args.next().ok_or_else(|| missing_value(&arg))?;
                    let depth = value
                        .parse()
                        .map_err(|_| ExplorerError::Usage(format!("invalid depth `{value}`")))?;
                    parsed.expand = Some(depth);
                }
                flag if flag.starts_with("--") => {
                    return Err(ExplorerError::Usage(format!("unknown option `{flag}`")));
                }
                _ if parsed.root.is_some() => {
                    return Err(ExplorerError::Usage(format!("unexpected argument `{arg}`")));
                }
                _ => parsed.root = Some(PathBuf::from(arg)),
            }
        }
        Ok(parsed)
    }
}

fn missing_value(flag: &str) -> ExplorerError {
    ExplorerError::Usage(format!("`{flag}` needs a value"))
}

/// Adds the four explorer columns.
fn add_columns(control: &mut TreeListControl) -> Result<()> {
    let mut columns = control.columns_mut();
    columns.push(Column::with_sizes("Name", 240, 80, 5)?);
    columns.push(Column::with_sizes("Date modified", 136, 60, 5)?);
    columns.push(Column::with_sizes("Type", 112, 40, 5)?);
    columns.push(Column::with_sizes("Size", 80, 40, 5)?.with_alignment(HorizontalAlignment::Right));
    Ok(())
}

/// Expands every expandable row down to `depth` levels, loading as it goes.
fn expand_to_depth(
    control: &mut TreeListControl,
    populator: &mut LazyPopulator,
    source: &FsSource,
    depth: usize,
) -> Result<()> {
    for level in 0..depth {
        let folders: Vec<RowKey> = control
            .cache()
            .iter()
            .filter(|entry| entry.level == level)
            .map(|entry| entry.key)
            .filter(|&key| control.row(key).is_some_and(|row| row.is_expandable()))
            .collect();
        for key in folders {
            control.expand(key)?;
        }
        let populated = populator.populate(control, source)?;
        tracing::debug!(level, populated, "expanded level");
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let mut config = ExplorerConfig::discover(args.config.as_deref())?;
    if let Some(root) = args.root {
        config.root = Some(root);
    }
    if let Some(depth) = args.expand {
        config.expand_depth = depth;
    }
    let root = config.resolve_root()?;
    tracing::info!(root = %root.display(), depth = config.expand_depth, "listing");

    let mut control = TreeListControl::new(config.list.clone())?;
    control.set_viewport_size(config.viewport_size());
    add_columns(&mut control)?;
    control.row_activated.observe(|event| tracing::info!(key = %event.key, "row activated"));

    let source = FsSource::new(root, config.show_hidden, config.date_format.clone());
    let mut populator = LazyPopulator::attach(&control);
    let count = populator.add_roots(&mut control, &source)?;
    tracing::debug!(count, "added root rows");
    expand_to_depth(&mut control, &mut populator, &source, config.expand_depth)?;

    print!("{}", render::render(&control, config.char_width));
    let shown = control.visible_range().len();
    println!(
        "\n{} of {} rows shown ({} loaded)",
        shown,
        control.visible_row_count(),
        control.row_count()
    );
    tracing::debug!(damage = ?control.take_damage(), "pending repaint");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "explorer failed");
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use horizon_treelist::{RowContainer, Size, TreeListConfig};

    use super::*;

    fn args(list: &[&str]) -> Result<Args> {
        Args::parse(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["--expand", "2", "/tmp", "--config", "a.toml"]).unwrap();
        assert_eq!(
            parsed,
            Args {
                config: Some(PathBuf::from("a.toml")),
                expand: Some(2),
                root: Some(PathBuf::from("/tmp")),
            }
        );
        assert_eq!(args(&[]).unwrap(), Args::default());
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(args(&["--expand"]), Err(ExplorerError::Usage(_))));
        assert!(matches!(args(&["--expand", "x"]), Err(ExplorerError::Usage(_))));
        assert!(matches!(args(&["--verbose"]), Err(ExplorerError::Usage(_))));
        assert!(matches!(args(&["a", "b"]), Err(ExplorerError::Usage(_))));
    }

    #[test]
    fn test_expand_to_depth_loads_folders() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/view")).unwrap();
        fs::write(dir.path().join("src/lib.rs"), "").unwrap();
        fs::write(dir.path().join("src/view/mod.rs"), "").unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();

        let mut control = TreeListControl::new(TreeListConfig::default()).unwrap();
        control.set_viewport_size(Size::new(800, 600));
        add_columns(&mut control).unwrap();
        let source = FsSource::new(dir.path(), false, "%Y");
        let mut populator = LazyPopulator::attach(&control);
        populator.add_roots(&mut control, &source).unwrap();
        assert_eq!(control.visible_row_count(), 2);

        expand_to_depth(&mut control, &mut populator, &source, 2).unwrap();
        let names: Vec<String> = control
            .cache()
            .keys()
            .map(|key| control.row(key).unwrap().text())
            .collect();
        assert_eq!(names, vec!["src", "view", "mod.rs", "lib.rs", "Cargo.toml"]);
        assert!(control.is_consistent());

        let src = control.rows(RowContainer::Root).unwrap()[0];
        assert!(populator.is_loaded(src));
        let text = render::render(&control, 8);
        assert!(text.contains("File folder"));
    }
}
