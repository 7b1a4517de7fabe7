//! Entry store element kinds: the payload rows held by the four parallel
//! entry-store lists. HTML bodies are gzip-compressed via `flate2` before
//! they're written.

use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::addressable::ListElement;
use crate::error::{Error, Result};
use crate::raw;

/// An entry's position in [`crate::dict::Dictionary::sources`]. Assigned by
/// the dictionary when the entry is fetched; equal to its position in the
/// sources list.
pub type Ordinal = i32;

/// Wire form: `MUTF8 name; int32 numEntries`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntrySource {
	pub name: String,
	pub num_entries: i32,
	/// Filled in by the dictionary when the entry is read; not persisted.
	pub ordinal: Ordinal,
}

impl std::fmt::Display for EntrySource {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.name)
	}
}

impl ListElement for EntrySource {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_mutf8(w, &self.name)?;
		raw::write_i32(w, self.num_entries)?;
		Ok(())
	}

	fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
		let name = raw::read_mutf8(r)?;
		let num_entries = raw::read_i32(r)?;
		Ok(EntrySource {
			name,
			num_entries,
			ordinal: -1,
		})
	}
}

/// Wire form: `int16 sourceOrdinal; int32 numPairs; numPairs × (MUTF8
/// langA; MUTF8 langB)`. `pairs` must be non-empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairEntry {
	pub source: Ordinal,
	pub pairs: Vec<(String, String)>,
}

impl ListElement for PairEntry {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_u16(w, self.source as u16)?;
		raw::write_i32(w, self.pairs.len() as i32)?;
		for (a, b) in &self.pairs {
			raw::write_mutf8(w, a)?;
			raw::write_mutf8(w, b)?;
		}
		Ok(())
	}

	fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
		let source = raw::read_u16(r)? as Ordinal;
		let count = raw::read_i32(r)?;
		if count <= 0 {
			return Err(Error::Corrupt("PairEntry.pairs must be non-empty".into()));
		}
		let mut pairs = Vec::with_capacity(count as usize);
		for _ in 0..count {
			let a = raw::read_mutf8(r)?;
			let b = raw::read_mutf8(r)?;
			pairs.push((a, b));
		}
		Ok(PairEntry { source, pairs })
	}
}

/// Wire form: `int16 sourceOrdinal; MUTF8 text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEntry {
	pub source: Ordinal,
	pub text: String,
}

impl ListElement for TextEntry {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_u16(w, self.source as u16)?;
		raw::write_mutf8(w, &self.text)?;
		Ok(())
	}

	fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
		let source = raw::read_u16(r)? as Ordinal;
		let text = raw::read_mutf8(r)?;
		Ok(TextEntry { source, text })
	}
}

/// Gzip-compressed HTML body. `uncompressed_len` is recorded alongside the
/// compressed bytes so the body can be preallocated on decompression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlBody {
	pub uncompressed_len: i32,
	pub compressed: Vec<u8>,
}

impl HtmlBody {
	pub fn compress(text: &str) -> Result<HtmlBody> {
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(text.as_bytes())?;
		let compressed = encoder.finish()?;
		Ok(HtmlBody {
			uncompressed_len: text.len() as i32,
			compressed,
		})
	}

	pub fn decompress(&self) -> Result<String> {
		let mut decoder = GzDecoder::new(self.compressed.as_slice());
		let mut out = String::with_capacity(self.uncompressed_len.max(0) as usize);
		decoder.read_to_string(&mut out)?;
		Ok(out)
	}

	fn write<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_i32(w, self.uncompressed_len)?;
		raw::write_i32(w, self.compressed.len() as i32)?;
		w.write_all(&self.compressed)?;
		Ok(())
	}

	fn read<R: Read>(r: &mut R) -> Result<HtmlBody> {
		let uncompressed_len = raw::read_i32(r)?;
		let compressed_len = raw::read_i32(r)?;
		if compressed_len < 0 {
			return Err(Error::Corrupt("negative HtmlBody compressed length".into()));
		}
		let mut compressed = vec![0u8; compressed_len as usize];
		r.read_exact(&mut compressed)?;
		Ok(HtmlBody {
			uncompressed_len,
			compressed,
		})
	}
}

impl ListElement for HtmlBody {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		self.write(w)
	}

	fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
		HtmlBody::read(r)
	}
}

/// How an [`HtmlEntry`]'s body is located: by ordinal into the dictionary's
/// `htmlBodies` list (v≥7), or inlined directly after the title (v5-6).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlBodyRef {
	ByOrdinal(i32),
	Inline(HtmlBody),
}

/// Wire form (v≥7): `int16 sourceOrdinal; MUTF8 title; int32 bodyRef`.
/// Wire form (v5–6): `int16 sourceOrdinal; MUTF8 title;` followed directly
/// by an inlined [`HtmlBody`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlEntry {
	pub source: Ordinal,
	pub title: String,
	pub body: HtmlBodyRef,
}

impl ListElement for HtmlEntry {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_u16(w, self.source as u16)?;
		raw::write_mutf8(w, &self.title)?;
		match &self.body {
			HtmlBodyRef::ByOrdinal(ordinal) => raw::write_i32(w, *ordinal)?,
			HtmlBodyRef::Inline(body) => body.write(w)?,
		}
		Ok(())
	}

	fn decode<R: Read>(r: &mut R, dict_file_version: i32) -> Result<Self> {
		let source = raw::read_u16(r)? as Ordinal;
		let title = raw::read_mutf8(r)?;
		let body = if dict_file_version >= 7 {
			HtmlBodyRef::ByOrdinal(raw::read_i32(r)?)
		} else {
			HtmlBodyRef::Inline(HtmlBody::read(r)?)
		};
		Ok(HtmlEntry { source, title, body })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[test]
	fn test_html_body_gzip_roundtrip() {
		let body = HtmlBody::compress("<p>ある</p>").unwrap();
		assert_eq!(body.decompress().unwrap(), "<p>ある</p>");
	}

	#[test]
	fn test_pair_entry_rejects_empty_pairs() {
		let mut buf = Vec::new();
		raw::write_u16(&mut buf, 0).unwrap();
		raw::write_i32(&mut buf, 0).unwrap();
		let mut cursor = Cursor::new(buf);
		assert!(matches!(PairEntry::decode(&mut cursor, 7), Err(Error::Corrupt(_))));
	}

	#[test]
	fn test_html_entry_v7_uses_ordinal() {
		let entry = HtmlEntry {
			source: 2,
			title: "見出し".into(),
			body: HtmlBodyRef::ByOrdinal(5),
		};
		let mut buf = Vec::new();
		entry.encode(&mut buf).unwrap();
		let mut cursor = Cursor::new(buf);
		let decoded = HtmlEntry::decode(&mut cursor, 7).unwrap();
		assert_eq!(decoded, entry);
	}

	#[test]
	fn test_html_entry_v6_inlines_body() {
		let body = HtmlBody::compress("legacy body").unwrap();
		let entry = HtmlEntry {
			source: 1,
			title: "title".into(),
			body: HtmlBodyRef::Inline(body),
		};
		let mut buf = Vec::new();
		entry.encode(&mut buf).unwrap();
		let mut cursor = Cursor::new(buf);
		let decoded = HtmlEntry::decode(&mut cursor, 6).unwrap();
		assert_eq!(decoded, entry);
	}
}
