use super::OutputBuffer;
use super::Step;
use crate::ChainableReader;
use crate::CharStream;
use crate::Filter;
use crate::FilterError;
use crate::FilterKind;
use crate::FilterResult;
use crate::FilterSpec;
use crate::Location;

/// Replaces every occurrence of `from` with `to` without materializing the
/// stream.
///
/// Matching is leftmost and single pass. When a partial match fails, the
/// characters scanned during the attempt are emitted verbatim and only the
/// last of them is examined again as a possible new match start. An empty
/// `to` deletes each match.
///
/// Confirming a match consumes upstream characters, so `peek` is not
/// supported.
#[derive(Debug, Default)]
pub struct ReplaceString {
	upstream: ChainableReader,
	from: Vec<char>,
	to: Vec<char>,
	ignore_case: bool,
	buffer: OutputBuffer,
	stream_ended: bool,
}

impl ReplaceString {
	pub fn new(from: &str, to: &str, ignore_case: bool) -> Self {
		Self {
			from: from.chars().collect(),
			to: to.chars().collect(),
			ignore_case,
			..Self::default()
		}
	}

	fn next_step(&mut self) -> FilterResult<Step> {
		if let Some(step) = self.buffer.next() {
			return Ok(step);
		}

		Ok(self.read_upstream()?.map_or(Step::End, Step::Candidate))
	}

	/// Read from upstream until it first reports the end of the stream, and
	/// never again after that.
	fn read_upstream(&mut self) -> FilterResult<Option<char>> {
		if self.stream_ended {
			return Ok(None);
		}

		let next = self.upstream.read()?;
		self.stream_ended = next.is_none();
		Ok(next)
	}

	fn same(&self, left: char, right: char) -> bool {
		left == right || (self.ignore_case && left.to_uppercase().eq(right.to_uppercase()))
	}

	/// Read the rest of `from` after its first character has been seen.
	/// Returns whether it matched along with every character read.
	fn find_string(&mut self) -> FilterResult<(bool, Vec<char>)> {
		let mut scanned = Vec::with_capacity(self.from.len().saturating_sub(1));

		for index in 1..self.from.len() {
			let Some(ch) = self.read_upstream()? else {
				return Ok((false, scanned));
			};

			scanned.push(ch);
			if !self.same(ch, self.from[index]) {
				return Ok((false, scanned));
			}
		}

		Ok((true, scanned))
	}
}

impl CharStream for ReplaceString {
	fn read(&mut self) -> FilterResult<Option<char>> {
		loop {
			let ch = match self.next_step()? {
				Step::Emit(ch) => return Ok(Some(ch)),
				Step::End => return Ok(None),
				Step::Candidate(ch) => ch,
			};

			let Some(&first) = self.from.first() else {
				return Ok(Some(ch));
			};

			if !self.same(ch, first) {
				return Ok(Some(ch));
			}

			let (found, scanned) = self.find_string()?;
			if !found {
				if !scanned.is_empty() {
					self.buffer.fill(scanned, true);
				}
				return Ok(Some(ch));
			}

			if let Some((&head, tail)) = self.to.split_first() {
				if !tail.is_empty() {
					self.buffer.fill(tail.to_vec(), false);
				}
				return Ok(Some(head));
			}

			// Empty replacement: the match is dropped.
		}
	}

	fn peek(&mut self) -> FilterResult<Option<char>> {
		Err(FilterError::PeekNotSupported(self.kind()))
	}

	fn close(&mut self) -> FilterResult<()> {
		self.upstream.close()
	}

	fn supports_peek(&self) -> bool {
		self.kind().supports_peek()
	}
}

impl Filter for ReplaceString {
	fn kind(&self) -> FilterKind {
		FilterKind::ReplaceString
	}

	fn upstream_mut(&mut self) -> &mut ChainableReader {
		&mut self.upstream
	}

	fn initialize(&mut self, spec: &FilterSpec, location: &Location) -> FilterResult<()> {
		let from = spec.params.required("from", location)?;
		if from.is_empty() {
			return Err(FilterError::build(
				"parameter `from` must not be empty",
				location,
			));
		}

		self.from = from.chars().collect();
		self.to = spec.params.value("to").unwrap_or_default().chars().collect();
		self.ignore_case = spec.params.bool_or("ignorecase", false, location)?;

		Ok(())
	}
}
