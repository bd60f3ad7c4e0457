use std::fmt::Display;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use clap::Parser;
use filterchain_cli::Commands;
use filterchain_cli::FilterchainCli;
use filterchain_cli::OutputFormat;
use filterchain_core::ChainConfig;
use filterchain_core::FilterKind;
use filterchain_core::PhysicalTextReader;
use filterchain_core::PropertyExpander;
use owo_colors::OwoColorize;
use owo_colors::Style;
use tracing_subscriber::EnvFilter;

static USE_COLOR: AtomicBool = AtomicBool::new(true);

/// Render `text` in `style` unless color output is disabled.
fn paint(text: impl Display, style: Style) -> String {
	if USE_COLOR.load(Ordering::Relaxed) {
		text.style(style).to_string()
	} else {
		text.to_string()
	}
}

fn main() {
	let args = FilterchainCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Run {
			input,
			output,
			define,
		}) => run_filter(&args, input, output.as_deref(), define),
		Some(Commands::List { format }) => run_list(*format),
		None => {
			eprintln!("No subcommand specified. Run `filterchain --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Render filter errors through miette for error codes and help text.
		match e.downcast::<filterchain_core::FilterError>() {
			Ok(filter_err) => {
				let report: miette::Report = (*filter_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", paint("error:", Style::new().red()));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_level = if verbose { "debug" } else { "warn" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.try_init()
		.ok();
}

fn resolve_root(args: &FilterchainCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn resolve_config(args: &FilterchainCli) -> Result<ChainConfig, Box<dyn std::error::Error>> {
	if let Some(path) = &args.config {
		return Ok(ChainConfig::from_path(path)?);
	}

	let root = resolve_root(args);
	match ChainConfig::load(&root)? {
		Some(config) => Ok(config),
		None => {
			eprintln!(
				"{} no filterchain.toml found in {}; copying input unchanged",
				paint("warning:", Style::new().yellow()),
				root.display()
			);
			Ok(ChainConfig::default())
		}
	}
}

fn is_same_file(left: &Path, right: &Path) -> bool {
	match (left.canonicalize(), right.canonicalize()) {
		(Ok(left), Ok(right)) => left == right,
		_ => false,
	}
}

fn run_filter(
	args: &FilterchainCli,
	input: &Path,
	output: Option<&Path>,
	define: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
	if output.is_some_and(|output| is_same_file(input, output)) {
		return Err(format!(
			"refusing to overwrite the input file {}; choose a different --output",
			input.display()
		)
		.into());
	}

	let config = resolve_config(args)?;
	let mut properties = config.properties.clone();
	for (name, value) in define {
		properties.insert(name.clone(), value.clone());
	}
	let expander: Arc<dyn PropertyExpander> = Arc::new(properties);

	let source = PhysicalTextReader::open(input)?;
	let chain = config.filter_chain().build(source, &expander)?;

	match output {
		Some(path) => {
			let mut writer = BufWriter::new(File::create(path)?);
			let written = chain.copy_to(&mut writer)?;
			writer.flush()?;

			if args.verbose {
				eprintln!(
					"{} {} ({written} characters)",
					paint("Wrote", Style::new().green()),
					path.display()
				);
			}
		}
		None => {
			let stdout = std::io::stdout();
			let mut writer = BufWriter::new(stdout.lock());
			chain.copy_to(&mut writer)?;
			writer.flush()?;
		}
	}

	Ok(())
}

fn run_list(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
	match format {
		OutputFormat::Json => {
			let filters: Vec<serde_json::Value> = FilterKind::ALL
				.iter()
				.map(|kind| {
					serde_json::json!({
						"name": kind.name(),
						"parameters": kind.parameters(),
						"supports_peek": kind.supports_peek(),
					})
				})
				.collect();
			println!("{}", serde_json::to_string_pretty(&filters)?);
		}
		OutputFormat::Text => {
			println!("{}", paint("Filters:", Style::new().bold()));
			for kind in FilterKind::ALL {
				let name = format!("{:<18}", kind.name());
				let parameters = if kind.parameters().is_empty() {
					"-".to_string()
				} else {
					kind.parameters().join(", ")
				};
				let peek = if kind.supports_peek() {
					paint("peek", Style::new().green())
				} else {
					paint("no peek", Style::new().yellow())
				};
				println!("  {} {parameters:<40} {peek}", paint(name, Style::new().bold()));
			}
		}
	}

	Ok(())
}
