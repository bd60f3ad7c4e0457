use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Copy files through a chain of streaming text filters.",
	long_about = "filterchain copies a file through an ordered chain of streaming text filters \
	              declared in `filterchain.toml`.\n\nAvailable filters replace `@TOKEN@` markers, \
	              replace strings and characters, expand `${property}` references and turn tabs \
	              into spaces.\n\nQuick start:\n  filterchain run input.txt -o output.txt  Filter \
	              a file\n  filterchain list                         Show the available filters"
)]
pub struct FilterchainCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root used to discover `filterchain.toml`.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Use this config file instead of discovering one under the project
	/// root.
	#[arg(long, short, global = true)]
	pub config: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Copy a file through the configured filter chain.
	///
	/// Filters from the config are applied in ascending `order`. Without a
	/// config the input is copied unchanged. The result is written to
	/// `--output`, or to stdout when no output is given.
	Run {
		/// The file to read.
		input: PathBuf,

		/// Where to write the filtered text. Defaults to stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Set a property for the `expandproperties` filter, overriding the
		/// `[properties]` table of the config. May be repeated.
		#[arg(long = "define", short = 'D', value_name = "NAME=VALUE", value_parser = parse_property)]
		define: Vec<(String, String)>,
	},
	/// List every available filter with its parameters.
	///
	/// Also shows whether the filter supports `peek`, which matters when
	/// embedding the chain in another reader.
	List {
		/// Output format. Use `text` for human-readable output or `json` for
		/// programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}

/// Parse a `NAME=VALUE` property definition.
pub fn parse_property(value: &str) -> Result<(String, String), String> {
	let Some((name, property)) = value.split_once('=') else {
		return Err(format!("expected `NAME=VALUE`, got `{value}`"));
	};

	let name = name.trim();
	if name.is_empty() {
		return Err(format!("property name is empty in `{value}`"));
	}

	Ok((name.to_string(), property.to_string()))
}
