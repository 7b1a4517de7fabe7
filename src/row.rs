//! Row kinds: the tagged variants stored in an index's row array, each
//! referencing an entry in one of the four entry-store lists.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::raw;
use crate::uniform::FixedWidthElement;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
	Pair,
	TokenMain,
	Text,
	TokenNonMain,
	Html,
}

impl RowKind {
	pub fn tag(self) -> u8 {
		match self {
			RowKind::Pair => 0,
			RowKind::TokenMain => 1,
			RowKind::Text => 2,
			RowKind::TokenNonMain => 3,
			RowKind::Html => 4,
		}
	}

	pub fn from_tag(tag: u8) -> Result<RowKind> {
		match tag {
			0 => Ok(RowKind::Pair),
			1 => Ok(RowKind::TokenMain),
			2 => Ok(RowKind::Text),
			3 => Ok(RowKind::TokenNonMain),
			4 => Ok(RowKind::Html),
			_ => Err(Error::Corrupt(format!("unknown row tag {}", tag))),
		}
	}

	/// The row at an index entry's `startRow` is always a TokenRow.
	pub fn is_token(self) -> bool {
		matches!(self, RowKind::TokenMain | RowKind::TokenNonMain)
	}
}

/// A single row: a kind discriminator plus the index of the referenced
/// entry in the corresponding store list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Row {
	pub kind: RowKind,
	pub reference_index: i32,
}

impl FixedWidthElement for Row {
	const WIDTH: usize = 5;

	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		w.write_all(&[self.kind.tag()])?;
		raw::write_i32(w, self.reference_index)?;
		Ok(())
	}

	fn decode<R: Read>(r: &mut R) -> Result<Self> {
		let mut tag = [0u8; 1];
		r.read_exact(&mut tag)?;
		let kind = RowKind::from_tag(tag[0])?;
		let reference_index = raw::read_i32(r)?;
		Ok(Row { kind, reference_index })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn test_row_roundtrip() {
		for kind in [
			RowKind::Pair,
			RowKind::TokenMain,
			RowKind::Text,
			RowKind::TokenNonMain,
			RowKind::Html,
		] {
			let row = Row { kind, reference_index: 42 };
			let mut buf = Vec::new();
			row.encode(&mut buf).unwrap();
			assert_eq!(buf.len(), Row::WIDTH);
			let mut cursor = Cursor::new(buf);
			assert_eq!(Row::decode(&mut cursor).unwrap(), row);
		}
	}

	#[test]
	fn test_unknown_tag_is_corrupt() {
		assert!(matches!(RowKind::from_tag(9), Err(Error::Corrupt(_))));
	}

	#[test]
	fn test_is_token() {
		assert!(RowKind::TokenMain.is_token());
		assert!(RowKind::TokenNonMain.is_token());
		assert!(!RowKind::Pair.is_token());
	}
}
