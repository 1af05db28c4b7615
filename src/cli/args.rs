//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::DEFAULT_EXPRESSION;

/// Evaluate arithmetic expressions against a BODMAS parse service and draw their parse trees
#[derive(Parser, Debug)]
#[command(name = "bodmas-viz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Backend base address (overrides config)
    #[arg(long, global = true, env = "BODMAS_BACKEND_URL", value_hint = ValueHint::Url)]
    pub backend: Option<String>,

    /// Origin serving config.json with the backend address
    #[arg(long, global = true, value_hint = ValueHint::Url)]
    pub origin: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an expression and show its parse tree
    Parse {
        /// Arithmetic expression
        #[arg(default_value = DEFAULT_EXPRESSION, allow_hyphen_values = true)]
        expression: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List built-in example expressions
    Examples {
        /// Submit example number N (1-based)
        #[arg(long, value_name = "N")]
        run: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Check backend connectivity
    Ping,

    /// Ask the backend whether an expression is valid
    Validate {
        /// Arithmetic expression
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },

    /// Explain a backend error message
    Explain {
        /// Error message as returned by the backend
        message: String,
    },

    /// Render a parse-tree JSON document to SVG without contacting the backend
    Render {
        /// Parse tree JSON file, '-' for stdin
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Output SVG file (default: <output_dir>/parse_tree.svg)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Where to put the results of a submission.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct OutputArgs {
    /// Write the diagram as SVG (default: <output_dir>/parse_tree.svg)
    #[arg(long, value_name = "PATH", num_args = 0..=1, value_hint = ValueHint::FilePath)]
    pub svg: Option<Option<PathBuf>>,

    /// Write an HTML report (default: <output_dir>/report.html)
    #[arg(long, value_name = "PATH", num_args = 0..=1, value_hint = ValueHint::FilePath)]
    pub html: Option<Option<PathBuf>>,

    /// Print the raw outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Create a template config file
    Init {
        /// Create in the global config directory instead of the current directory
        #[arg(short, long)]
        global: bool,
    },
    /// Show config file locations
    Path,
    /// Write a frontend config.json pointing at the backend
    Frontend {
        /// Output file
        #[arg(short, long, default_value = "config.json", value_hint = ValueHint::FilePath)]
        output: PathBuf,

        /// Set DEBUG in the generated file
        #[arg(long)]
        debug_frontend: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn given_no_expression_when_parsing_args_then_default_expression() {
        let cli = Cli::try_parse_from(["bodmas-viz", "parse"]).unwrap();

        match cli.command {
            Commands::Parse { expression, output } => {
                assert_eq!(expression, "3+4*5");
                assert!(output.svg.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_bare_svg_flag_when_parsing_args_then_default_path_requested() {
        let cli = Cli::try_parse_from(["bodmas-viz", "-dd", "parse", "(3+4)*5", "--svg"]).unwrap();

        assert_eq!(cli.debug, 2);
        match cli.command {
            Commands::Parse { expression, output } => {
                assert_eq!(expression, "(3+4)*5");
                assert_eq!(output.svg, Some(None));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn given_leading_operator_expression_when_parsing_args_then_kept_as_expression() {
        let cli = Cli::try_parse_from(["bodmas-viz", "parse", "+3"]).unwrap();

        assert!(matches!(cli.command, Commands::Parse { ref expression, .. } if expression == "+3"));
    }
}
