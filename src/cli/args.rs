//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Faceted category trees: leaf counts, collapse cascades and selection
#[derive(Parser, Debug)]
#[command(name = "facettree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Local config file (default: .facettree.toml next to the payload)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the category tree with leaf counts
    Tree {
        /// Payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
        /// Collapse categories at this depth (overrides config)
        #[arg(long)]
        collapse_depth: Option<usize>,
        /// Show the data tree (identifiers, item counts) instead of the display tree
        #[arg(long)]
        facets: bool,
    },

    /// List root identifiers in order
    Roots {
        /// Payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
    },

    /// Print the items of the catalog or of selected categories, pre-order
    Flat {
        /// Payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
        /// Category identifier (repeatable)
        #[arg(short, long = "node")]
        nodes: Vec<String>,
    },

    /// Select all leaves below categories and show selection states
    Select {
        /// Payload JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        payload: PathBuf,
        /// Category identifier (repeatable)
        #[arg(short, long = "node", required = true)]
        nodes: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show version and config locations
    Info,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print config template
    Template,

    /// Show config paths
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_repeated_node_flags_when_parsing_then_collects_all() {
        let cli = Cli::parse_from(["facettree", "flat", "cat.json", "-n", "a", "--node", "b"]);
        match cli.command {
            Some(Commands::Flat { nodes, .. }) => assert_eq!(nodes, vec!["a", "b"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_select_without_node_when_parsing_then_errors() {
        assert!(Cli::try_parse_from(["facettree", "select", "cat.json"]).is_err());
    }

    #[test]
    fn given_debug_flags_when_parsing_then_counts() {
        let cli = Cli::parse_from(["facettree", "-ddd", "info"]);
        assert_eq!(cli.debug, 3);
    }
}
