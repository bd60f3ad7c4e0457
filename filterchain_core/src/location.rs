use std::fmt::Display;
use std::path::Path;
use std::path::PathBuf;

/// The place a filter or chain was declared, attached to every build error so
/// the caller can point back at its own configuration.
///
/// Lines and columns are 1-indexed; `0` means "not known".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
	/// The configuration file the declaration came from.
	pub file: Option<PathBuf>,
	pub line: usize,
	pub column: usize,
}

impl Location {
	pub fn new(file: impl Into<PathBuf>, line: usize, column: usize) -> Self {
		Self {
			file: Some(file.into()),
			line,
			column,
		}
	}

	/// A location that only knows which file it belongs to.
	pub fn in_file(file: impl AsRef<Path>) -> Self {
		Self {
			file: Some(file.as_ref().to_path_buf()),
			line: 0,
			column: 0,
		}
	}

	/// Returns true when neither a file nor a line is known.
	pub fn is_unknown(&self) -> bool {
		self.file.is_none() && self.line == 0
	}

	/// Render the location as a message prefix (`"chain.toml(3,1): "`), or an
	/// empty string when the location is unknown.
	pub fn prefix(&self) -> String {
		if self.is_unknown() {
			String::new()
		} else {
			format!("{self}: ")
		}
	}
}

impl Display for Location {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if let Some(file) = &self.file {
			write!(f, "{}", file.display())?;
		}

		if self.line > 0 {
			write!(f, "({},{})", self.line, self.column)?;
		}

		Ok(())
	}
}
