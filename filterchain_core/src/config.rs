use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::FilterChain;
use crate::FilterError;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;
use crate::PropertyMap;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"filterchain.toml",
	".filterchain.toml",
	".config/filterchain.toml",
];

/// A filter chain declared in TOML.
///
/// ```toml
/// [properties]
/// name = "World"
///
/// [[filters]]
/// order = 1
/// kind = "replacetokens"
/// params = { begintoken = "@", endtoken = "@" }
/// tokens = [{ key = "NAME", value = "${name}" }]
///
/// [[filters]]
/// order = 2
/// kind = "expandproperties"
///
/// [[filters]]
/// order = 3
/// kind = "tabstospaces"
/// params = { tablength = 4 }
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ChainConfig {
	/// Values available to the `expandproperties` filter.
	#[serde(default)]
	pub properties: PropertyMap,
	/// The declared filters, in any order.
	#[serde(default)]
	pub filters: Vec<FilterSpec>,
	/// The file this config was read from, if any.
	#[serde(skip)]
	pub path: Option<PathBuf>,
}

impl ChainConfig {
	/// Find the first existing config file under `root`.
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> FilterResult<Option<ChainConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		Self::from_path(&config_path).map(Some)
	}

	/// Load the config from an explicit file.
	pub fn from_path(path: &Path) -> FilterResult<ChainConfig> {
		let content = std::fs::read_to_string(path)?;
		Self::parse(&content, Some(path))
	}

	/// Parse config content. Each filter's location points at its
	/// `[[filters]]` header when the file uses that form.
	pub fn parse(content: &str, path: Option<&Path>) -> FilterResult<ChainConfig> {
		let mut config: ChainConfig =
			toml::from_str(content).map_err(|e| FilterError::ConfigParse(e.to_string()))?;

		let headers = filter_header_lines(content);
		let lines_known = headers.len() == config.filters.len();

		for (index, spec) in config.filters.iter_mut().enumerate() {
			let line = if lines_known { headers[index] } else { 0 };
			spec.location = Location {
				file: path.map(Path::to_path_buf),
				line,
				column: usize::from(line > 0),
			};
		}

		config.path = path.map(Path::to_path_buf);
		Ok(config)
	}

	/// The chain described by this config.
	pub fn filter_chain(&self) -> FilterChain {
		let location = self
			.path
			.as_deref()
			.map(Location::in_file)
			.unwrap_or_default();

		FilterChain::new(self.filters.clone()).with_location(location)
	}
}

/// 1-indexed lines holding a `[[filters]]` table header.
fn filter_header_lines(content: &str) -> Vec<usize> {
	content
		.lines()
		.enumerate()
		.filter(|(_, line)| {
			let line = line.trim();
			let line = line.split('#').next().unwrap_or(line).trim_end();
			line == "[[filters]]"
		})
		.map(|(index, _)| index + 1)
		.collect()
}
