//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::TreeStringConvert;
use crate::infrastructure::di::ServiceContainer;
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree {
            payload,
            collapse_depth,
            facets,
        }) => cmd_tree(cli, payload, *collapse_depth, *facets),
        Some(Commands::Roots { payload }) => cmd_roots(cli, payload),
        Some(Commands::Flat { payload, nodes }) => cmd_flat(cli, payload, nodes),
        Some(Commands::Select { payload, nodes }) => cmd_select(cli, payload, nodes),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Info) => cmd_info(cli),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => Err(CliError::Usage(
            "no command given, see `facettree --help`".to_string(),
        )),
    }
}

/// Explicit `--config` wins, otherwise the local file next to the payload.
fn local_config(cli: &Cli, payload: Option<&Path>) -> Option<PathBuf> {
    cli.config
        .as_deref()
        .map(expand_path)
        .or_else(|| payload.map(local_config_path))
}

fn load_settings(cli: &Cli, payload: Option<&Path>) -> CliResult<Settings> {
    let local = local_config(cli, payload);
    debug!("local config: {:?}", local);
    Ok(Settings::load(local.as_deref())?)
}

#[instrument(skip(cli))]
fn cmd_tree(
    cli: &Cli,
    payload: &Path,
    collapse_depth: Option<usize>,
    facets: bool,
) -> CliResult<()> {
    let mut settings = load_settings(cli, Some(payload))?;
    if collapse_depth.is_some() {
        settings.collapse_depth = collapse_depth;
    }
    let container = ServiceContainer::new(settings);
    let catalog = container.catalog.open(payload)?;

    let render = container.render_options();
    let trees = if facets {
        catalog.facets.to_tree_string(render)
    } else {
        catalog.display.to_tree_string(render)
    };
    if trees.is_empty() {
        output::warning("payload contains no categories");
    }
    for tree in trees {
        output::info(&tree);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_roots(cli: &Cli, payload: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, Some(payload))?);
    let catalog = container.catalog.open(payload)?;
    for identifier in catalog.facets.root_identifiers() {
        output::info(identifier);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_flat(cli: &Cli, payload: &Path, nodes: &[String]) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, Some(payload))?);
    let catalog = container.catalog.open(payload)?;
    let items = container.catalog.flat_items(&catalog, nodes)?;
    if items.is_empty() {
        output::warning("no items in the requested categories");
    }
    for item in items {
        output::info(item);
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_select(cli: &Cli, payload: &Path, nodes: &[String]) -> CliResult<()> {
    let container = ServiceContainer::new(load_settings(cli, Some(payload))?);
    let mut catalog = container.catalog.open(payload)?;
    let report = container.catalog.select(&mut catalog, nodes)?;

    output::header(&format!("Selected: {}", nodes.iter().join(", ")));
    for row in &report.rows {
        output::info(&format!(
            "{}{} {} ({}/{}) aria-checked={}",
            "  ".repeat(row.depth),
            output::selection_marker(row.state),
            row.label,
            row.selected,
            row.leaf_count,
            row.state.aria_checked()
        ));
    }
    output::action("Selected items", &report.selected_count);
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let container = ServiceContainer::new(load_settings(cli, None)?);
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no config directory available on this platform"),
            }
            if let Some(local) = local_config(cli, None) {
                output::action("local", &local.display());
            }
        }
    }
    Ok(())
}

fn cmd_info(cli: &Cli) -> CliResult<()> {
    output::header(&format!("facettree {}", env!("CARGO_PKG_VERSION")));
    cmd_config(cli, &ConfigCommands::Path)
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
