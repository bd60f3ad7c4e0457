use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Cursor;
use std::path::Path;

use crate::CharStream;
use crate::FilterResult;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// The base of every chain: decodes UTF-8 text from a file or memory one
/// character at a time.
///
/// Only a single decoded character is ever held for `peek`, so files are never
/// loaded whole. A leading byte order mark is skipped.
pub struct PhysicalTextReader {
	source: Option<Box<dyn BufRead>>,
	peeked: Option<char>,
	started: bool,
}

impl std::fmt::Debug for PhysicalTextReader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PhysicalTextReader")
			.field("closed", &self.source.is_none())
			.field("peeked", &self.peeked)
			.finish_non_exhaustive()
	}
}

impl PhysicalTextReader {
	pub fn new(source: impl BufRead + 'static) -> Self {
		Self {
			source: Some(Box::new(source)),
			peeked: None,
			started: false,
		}
	}

	/// Read from in-memory text.
	pub fn from_text(text: impl Into<String>) -> Self {
		Self::new(Cursor::new(text.into().into_bytes()))
	}

	/// Open a file for buffered reading.
	pub fn open(path: impl AsRef<Path>) -> FilterResult<Self> {
		let file = File::open(path)?;
		Ok(Self::new(BufReader::new(file)))
	}

	fn fetch(&mut self, advance: bool) -> FilterResult<Option<char>> {
		if self.peeked.is_none() {
			self.peeked = self.decode()?;
		}

		if advance {
			Ok(self.peeked.take())
		} else {
			Ok(self.peeked)
		}
	}

	fn decode(&mut self) -> FilterResult<Option<char>> {
		let Some(source) = self.source.as_mut() else {
			return Ok(None);
		};

		let mut ch = decode_char(source.as_mut())?;

		if !self.started {
			self.started = true;
			if ch == Some(BYTE_ORDER_MARK) {
				ch = decode_char(source.as_mut())?;
			}
		}

		Ok(ch)
	}
}

impl CharStream for PhysicalTextReader {
	fn read(&mut self) -> FilterResult<Option<char>> {
		self.fetch(true)
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		self.fetch(false)
	}

	fn close(&mut self) -> FilterResult<()> {
		self.source = None;
		self.peeked = None;
		Ok(())
	}

	fn is_physical(&self) -> bool {
		true
	}
}

/// Number of bytes in the UTF-8 sequence introduced by `lead`, or `0` when
/// `lead` can't start a sequence.
fn utf8_width(lead: u8) -> usize {
	match lead {
		0x00..=0x7f => 1,
		0xc2..=0xdf => 2,
		0xe0..=0xef => 3,
		0xf0..=0xf4 => 4,
		_ => 0,
	}
}

fn invalid_utf8() -> io::Error {
	io::Error::new(io::ErrorKind::InvalidData, "stream did not contain valid UTF-8")
}

fn decode_char(source: &mut dyn BufRead) -> io::Result<Option<char>> {
	let lead = {
		let available = source.fill_buf()?;
		let Some(&lead) = available.first() else {
			return Ok(None);
		};
		lead
	};
	source.consume(1);

	let width = utf8_width(lead);
	if width == 0 {
		return Err(invalid_utf8());
	}

	let mut bytes = [lead, 0, 0, 0];
	source
		.read_exact(&mut bytes[1..width])
		.map_err(|e| {
			if e.kind() == io::ErrorKind::UnexpectedEof {
				invalid_utf8()
			} else {
				e
			}
		})?;

	let decoded = std::str::from_utf8(&bytes[..width]).map_err(|_| invalid_utf8())?;
	Ok(decoded.chars().next())
}
