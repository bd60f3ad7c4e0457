use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use crate::CharStream;
use crate::Filter;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;
use crate::PhysicalTextReader;
use crate::PropertyExpander;
use crate::PropertyMap;
use crate::TokenEntry;
use crate::filter_text;

pub fn properties() -> Arc<dyn PropertyExpander> {
	Arc::new(PropertyMap::from_iter([
		("name", "World"),
		("greeting", "Hello"),
		("nested", "${name}"),
	]))
}

pub fn no_properties() -> Arc<dyn PropertyExpander> {
	Arc::new(PropertyMap::new())
}

/// Run `text` through a chain built from `specs` with [`properties`].
pub fn run(text: &str, specs: &[FilterSpec]) -> FilterResult<String> {
	filter_text(text, specs, &properties())
}

/// Run `text` through a single declared filter.
pub fn run_one(text: &str, spec: FilterSpec) -> FilterResult<String> {
	run(text, &[spec])
}

/// Chain an already configured filter directly onto `text`.
pub fn over_text<F: Filter>(text: &str, mut filter: F) -> FilterResult<F> {
	filter.chain(Box::new(PhysicalTextReader::from_text(text)))?;
	Ok(filter)
}

/// Chain `filter` onto `text` through an [`EndCountingReader`], returning the
/// counter of reads made after the end of the stream.
pub fn over_counted_text<F: Filter>(
	text: &str,
	mut filter: F,
) -> FilterResult<(F, Rc<Cell<usize>>)> {
	let reader = EndCountingReader::new(text);
	let reads_past_end = Rc::clone(&reader.reads_past_end);
	filter.chain(Box::new(reader))?;
	Ok((filter, reads_past_end))
}

pub fn drain(stream: &mut dyn CharStream) -> FilterResult<String> {
	let mut output = String::new();
	while let Some(ch) = stream.read()? {
		output.push(ch);
	}
	Ok(output)
}

pub fn tokens_spec(order: u32, entries: &[(&str, &str)]) -> FilterSpec {
	entries
		.iter()
		.fold(FilterSpec::new(order, "replacetokens"), |spec, (key, value)| {
			spec.with_token(TokenEntry::new(*key, *value))
		})
}

pub fn name_tokens() -> FilterSpec {
	tokens_spec(1, &[("NAME", "World")])
}

pub fn replace_string(from: &str, to: &str) -> FilterSpec {
	FilterSpec::new(1, "replacestring")
		.with_param("from", from)
		.with_param("to", to)
}

pub fn tabs(order: u32, tab_length: usize) -> FilterSpec {
	FilterSpec::new(order, "tabstospaces").with_param("tablength", tab_length.to_string())
}

/// Records every run of text it is asked to expand, and expands nothing.
#[derive(Debug, Default)]
pub struct RecordingExpander {
	pub calls: RefCell<Vec<String>>,
}

impl PropertyExpander for RecordingExpander {
	fn expand(&self, text: &str, _location: &Location) -> FilterResult<String> {
		self.calls.borrow_mut().push(text.to_string());
		Ok(text.to_string())
	}
}

/// In-memory text that counts how often it is read after reporting the end
/// of the stream.
#[derive(Debug)]
pub struct EndCountingReader {
	chars: std::vec::IntoIter<char>,
	ended: bool,
	pub reads_past_end: Rc<Cell<usize>>,
}

impl EndCountingReader {
	pub fn new(text: &str) -> Self {
		Self {
			chars: text.chars().collect::<Vec<_>>().into_iter(),
			ended: false,
			reads_past_end: Rc::default(),
		}
	}
}

impl CharStream for EndCountingReader {
	fn read(&mut self) -> FilterResult<Option<char>> {
		if self.ended {
			self.reads_past_end.set(self.reads_past_end.get() + 1);
			return Ok(None);
		}

		let next = self.chars.next();
		self.ended = next.is_none();
		Ok(next)
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		Ok(self.chars.as_slice().first().copied())
	}

	fn close(&mut self) -> FilterResult<()> {
		Ok(())
	}

	fn is_physical(&self) -> bool {
		true
	}
}
