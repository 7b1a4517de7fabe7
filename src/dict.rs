//! The dictionary container: header, entry store, and indices, terminated
//! by a sentinel string. Sections are parsed sequentially behind a shared
//! `Arc<Mutex<File>>`, and a compile-time assertion keeps the container
//! `Send + Sync`.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use slog::{debug, o, warn, Logger};

use crate::addressable::{write_addressable_list, AddressableList, RandomAccessList};
use crate::backing::{Backing, BoxedList};
use crate::caching::CachingList;
use crate::entry::{EntrySource, HtmlBody, HtmlEntry, Ordinal, PairEntry, TextEntry};
use crate::error::{Error, Result};
use crate::index::{self, Index};
use crate::perf::PerfTimer;
use crate::raw;
use crate::row::Row;

/// Highest version this crate can read; the only version it writes besides
/// the legacy `writev6`.
pub const CURRENT_VERSION: i32 = 7;

const SENTINEL: &str = "END OF DICTIONARY";

/// A resolved row: the typed entry a [`Row`] points to. A `TokenRow`'s
/// reference is read as the contributing [`EntrySource`], distinguishing
/// the "main" vs "non-main" headword variant.
pub enum DereferencedRow {
	Pair(PairEntry),
	Text(TextEntry),
	Html { entry: HtmlEntry, body: String },
	Token { source: EntrySource, is_main: bool },
}

/// Cheap metadata-only view of a dictionary file.
/// `Dictionary::info` never fails: on any parse error it degrades to a
/// record with only `file_name`/`file_len` populated.
#[derive(Clone, Debug, Default)]
pub struct DictionaryInfo {
	pub file_name: String,
	pub file_len: u64,
	pub version: Option<i32>,
	pub dict_info: Option<String>,
	pub creation_millis: Option<i64>,
	pub indices: Vec<IndexInfo>,
}

#[derive(Clone, Debug)]
pub struct IndexInfo {
	pub short_name: String,
	pub long_name: String,
	pub entry_count: usize,
}

pub struct Dictionary {
	version: i32,
	creation_millis: i64,
	dict_info: String,
	sources: Backing<EntrySource>,
	pairs: Backing<PairEntry>,
	texts: Backing<TextEntry>,
	html_titles: Backing<HtmlEntry>,
	html_bodies: Backing<HtmlBody>,
	indices: Vec<Index>,
	source: Option<Arc<Mutex<File>>>,
	logger: Logger,
	closed: AtomicBool,
}

fn _assert_send_sync()
where
	Dictionary: Send + Sync,
{
}

impl Dictionary {
	/// Builds an empty, in-memory dictionary meant for writing from scratch.
	pub fn new(dict_info: String, creation_millis: i64) -> Dictionary {
		Dictionary {
			version: CURRENT_VERSION,
			creation_millis,
			dict_info,
			sources: Backing::Memory(Vec::new()),
			pairs: Backing::Memory(Vec::new()),
			texts: Backing::Memory(Vec::new()),
			html_titles: Backing::Memory(Vec::new()),
			html_bodies: Backing::Memory(Vec::new()),
			indices: Vec::new(),
			source: None,
			logger: Logger::root(slog::Discard, o!()),
			closed: AtomicBool::new(false),
		}
	}

	pub fn add_source(&mut self, source: EntrySource) -> Ordinal {
		let ordinal = self.sources.len() as Ordinal;
		self.sources.push(EntrySource { ordinal, ..source });
		ordinal
	}

	pub fn add_pair(&mut self, entry: PairEntry) -> i32 {
		let ordinal = self.pairs.len() as i32;
		self.pairs.push(entry);
		ordinal
	}

	pub fn add_text(&mut self, entry: TextEntry) -> i32 {
		let ordinal = self.texts.len() as i32;
		self.texts.push(entry);
		ordinal
	}

	pub fn add_html_title(&mut self, entry: HtmlEntry) -> i32 {
		let ordinal = self.html_titles.len() as i32;
		self.html_titles.push(entry);
		ordinal
	}

	pub fn add_html_body(&mut self, body: HtmlBody) -> i32 {
		let ordinal = self.html_bodies.len() as i32;
		self.html_bodies.push(body);
		ordinal
	}

	pub fn add_index(&mut self, index: Index) {
		self.indices.push(index);
	}

	/// Opens a dictionary file read-only, with a no-op logger.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Dictionary> {
		Dictionary::open_with_logger(path, Logger::root(slog::Discard, o!()))
	}

	/// Opens a dictionary file read-only, threading a caller-supplied logger
	/// through construction rather than relying on a global.
	pub fn open_with_logger<P: AsRef<Path>>(path: P, logger: Logger) -> Result<Dictionary> {
		let timer = PerfTimer::now();
		let path = path.as_ref();
		let file = File::open(path)?;
		let source = Arc::new(Mutex::new(file));

		let (version, creation_millis, dict_info, pos) = {
			let mut file = source.lock().unwrap();
			let version = raw::read_i32(&mut *file)?;
			if !(0..=CURRENT_VERSION).contains(&version) {
				return Err(Error::UnsupportedVersion(version));
			}
			let creation_millis = raw::read_i64(&mut *file)?;
			let dict_info = raw::read_mutf8(&mut *file)?;
			let pos = file.seek(SeekFrom::Current(0))?;
			(version, creation_millis, dict_info, pos)
		};
		debug!(logger, "opening dictionary"; "path" => path.display().to_string(), "version" => version);

		let sources_list = AddressableList::<EntrySource>::open(source.clone(), version, pos)?;
		let pos = sources_list.end_offset();
		// EntrySource.ordinal is not persisted; fill it in from list position.
		let sources = fully_cache_with_ordinals(&sources_list)?;

		let pairs_list = AddressableList::<PairEntry>::open(source.clone(), version, pos)?;
		let pos = pairs_list.end_offset();
		let pairs = Backing::Cached(Arc::new(CachingList::new(
			Box::new(pairs_list) as BoxedList<PairEntry>
		)));

		let texts_list = AddressableList::<TextEntry>::open(source.clone(), version, pos)?;
		let pos = texts_list.end_offset();
		let texts = Backing::Cached(Arc::new(CachingList::fully_cached(
			Box::new(texts_list) as BoxedList<TextEntry>,
		)?));

		let (html_titles, pos) = if version >= 5 {
			let list = AddressableList::<HtmlEntry>::open(source.clone(), version, pos)?;
			let end = list.end_offset();
			let backing = Backing::Cached(Arc::new(CachingList::new(Box::new(list) as BoxedList<HtmlEntry>)));
			(backing, end)
		} else {
			(Backing::Memory(Vec::new()), pos)
		};

		let (html_bodies, pos) = if version >= 7 {
			let list = AddressableList::<HtmlBody>::open(source.clone(), version, pos)?;
			let end = list.end_offset();
			let backing = Backing::Cached(Arc::new(CachingList::new(Box::new(list) as BoxedList<HtmlBody>)));
			(backing, end)
		} else {
			(Backing::Memory(Vec::new()), pos)
		};

		let (indices, pos) = open_index_section(source.clone(), version, pos)?;

		let sentinel = {
			let mut file = source.lock().unwrap();
			file.seek(SeekFrom::Start(pos))?;
			raw::read_mutf8(&mut *file)?
		};
		if sentinel != SENTINEL {
			warn!(logger, "missing dictionary sentinel"; "found" => sentinel.clone());
			return Err(Error::Corrupt(format!("expected sentinel {:?}, found {:?}", SENTINEL, sentinel)));
		}

		debug!(logger, "dictionary opened"; "elapsed_ms" => timer.elapsed().as_millis() as u64);

		Ok(Dictionary {
			version,
			creation_millis,
			dict_info,
			sources,
			pairs,
			texts,
			html_titles,
			html_bodies,
			indices,
			source: Some(source),
			logger,
			closed: AtomicBool::new(false),
		})
	}

	/// Releases the file handle. Any reader operation afterwards fails
	/// with [`Error::Closed`].
	pub fn close(&mut self) {
		self.closed.store(true, AtomicOrdering::SeqCst);
		self.source = None;
	}

	fn check_open(&self) -> Result<()> {
		if self.closed.load(AtomicOrdering::SeqCst) {
			Err(Error::Closed)
		} else {
			Ok(())
		}
	}

	pub fn version(&self) -> i32 {
		self.version
	}

	pub fn dict_info(&self) -> &str {
		&self.dict_info
	}

	pub fn creation_millis(&self) -> i64 {
		self.creation_millis
	}

	pub fn indices(&self) -> Result<&[Index]> {
		self.check_open()?;
		Ok(&self.indices)
	}

	pub fn source(&self, ordinal: Ordinal) -> Result<EntrySource> {
		self.check_open()?;
		self.sources.get(ordinal as usize)
	}

	pub fn pair(&self, ordinal: i32) -> Result<PairEntry> {
		self.check_open()?;
		self.pairs.get(ordinal as usize)
	}

	pub fn text(&self, ordinal: i32) -> Result<TextEntry> {
		self.check_open()?;
		self.texts.get(ordinal as usize)
	}

	pub fn html_title(&self, ordinal: i32) -> Result<HtmlEntry> {
		self.check_open()?;
		self.html_titles.get(ordinal as usize)
	}

	/// Resolves an [`HtmlEntry`]'s body, following `bodyRef` into
	/// `htmlBodies` for v≥7 files or decompressing the inlined body for
	/// v5-6 files.
	pub fn html_body(&self, entry: &HtmlEntry) -> Result<String> {
		self.check_open()?;
		match &entry.body {
			crate::entry::HtmlBodyRef::Inline(body) => body.decompress(),
			crate::entry::HtmlBodyRef::ByOrdinal(ordinal) => {
				let body = self.html_bodies.get(*ordinal as usize)?;
				body.decompress()
			}
		}
	}

	/// Resolves a [`Row`] into its typed entry.
	pub fn dereference(&self, row: Row) -> Result<DereferencedRow> {
		self.check_open()?;
		use crate::row::RowKind::*;
		match row.kind {
			Pair => Ok(DereferencedRow::Pair(self.pair(row.reference_index)?)),
			Text => Ok(DereferencedRow::Text(self.text(row.reference_index)?)),
			Html => {
				let entry = self.html_title(row.reference_index)?;
				let body = self.html_body(&entry)?;
				Ok(DereferencedRow::Html { entry, body })
			}
			TokenMain | TokenNonMain => Ok(DereferencedRow::Token {
				source: self.source(row.reference_index)?,
				is_main: matches!(row.kind, TokenMain),
			}),
		}
	}

	/// Writes the dictionary as version 6 or 7. `skip_html` is rejected for
	/// v7.
	pub fn write<W: Write + Seek>(&self, w: &mut W, version: i32, skip_html: bool) -> Result<()> {
		match version {
			7 => {
				if skip_html {
					return Err(Error::Corrupt("skip_html is not supported when writing version 7".into()));
				}
				self.write_v7(w)
			}
			6 => self.write_v6(w, skip_html),
			other => Err(Error::UnsupportedVersion(other)),
		}
	}

	fn write_v7<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
		w.seek(SeekFrom::Start(0))?;
		raw::write_i32(w, 7)?;
		raw::write_i64(w, self.creation_millis)?;
		raw::write_mutf8(w, &self.dict_info)?;
		let pos = w.seek(SeekFrom::Current(0))?;

		let sources = self.sources.iter_collect()?;
		let pos = write_addressable_list(w, pos, &sources)?;

		let pairs = self.pairs.iter_collect()?;
		let pos = write_addressable_list(w, pos, &pairs)?;

		let texts = self.texts.iter_collect()?;
		let pos = write_addressable_list(w, pos, &texts)?;

		let html_titles = self.html_titles.iter_collect()?;
		let pos = write_addressable_list(w, pos, &html_titles)?;

		let html_bodies = self.html_bodies.iter_collect()?;
		let pos = write_addressable_list(w, pos, &html_bodies)?;

		let pos = write_index_section(w, pos, &self.indices)?;

		w.seek(SeekFrom::Start(pos))?;
		raw::write_mutf8(w, SENTINEL)?;
		Ok(())
	}

	/// Legacy writer. When `skip_html` is set, HTML rows are elided and
	/// every index's row array and each `IndexEntry`'s `startRow`/`numRows`
	/// are rewritten via a dense renumbering array. Start rows are always
	/// TokenRows and are never pruned.
	fn write_v6<W: Write + Seek>(&self, w: &mut W, skip_html: bool) -> Result<()> {
		w.seek(SeekFrom::Start(0))?;
		raw::write_i32(w, 6)?;
		raw::write_i64(w, self.creation_millis)?;
		raw::write_mutf8(w, &self.dict_info)?;
		let pos = w.seek(SeekFrom::Current(0))?;

		let sources = self.sources.iter_collect()?;
		let pos = write_addressable_list(w, pos, &sources)?;

		let pairs = self.pairs.iter_collect()?;
		let pos = write_addressable_list(w, pos, &pairs)?;

		let texts = self.texts.iter_collect()?;
		let pos = write_addressable_list(w, pos, &texts)?;

		let html_titles = self.html_titles.iter_collect()?;
		let html_titles = if skip_html {
			Vec::new()
		} else {
			inline_html_bodies(&html_titles, &self.html_bodies)?
		};
		let pos = write_addressable_list(w, pos, &html_titles)?;

		let pruned_indices: Result<Vec<Index>> = self
			.indices
			.iter()
			.map(|index| prune_html_rows(index, skip_html))
			.collect();
		let pruned_indices = pruned_indices?;
		let pos = write_index_section(w, pos, &pruned_indices)?;

		w.seek(SeekFrom::Start(pos))?;
		raw::write_mutf8(w, SENTINEL)?;
		Ok(())
	}

	/// Fast-path metadata read: never propagates an error, degrading to
	/// filename+length on any parse failure.
	pub fn info<P: AsRef<Path>>(path: P) -> DictionaryInfo {
		let path = path.as_ref();
		let file_name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		let file_len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
		let mut info = DictionaryInfo {
			file_name,
			file_len,
			..Default::default()
		};
		if let Ok(dict) = Dictionary::open(path) {
			info.version = Some(dict.version);
			info.dict_info = Some(dict.dict_info.clone());
			info.creation_millis = Some(dict.creation_millis);
			info.indices = dict
				.indices
				.iter()
				.map(|index| IndexInfo {
					short_name: index.short_name.clone(),
					long_name: index.long_name.clone(),
					entry_count: index.entry_count(),
				})
				.collect();
		}
		info
	}

	/// A debug view, not a stable schema.
	pub fn print<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
		writeln!(out, "dictInfo={}", self.dict_info)?;
		for i in 0..self.sources.len() {
			if let Ok(source) = self.sources.get(i) {
				writeln!(out, "EntrySource: {} {}", source.name, source.num_entries)?;
			}
		}
		for index in &self.indices {
			writeln!(out, "Index: {} {}", index.short_name, index.long_name)?;
			if let Ok(rows) = index.rows() {
				for row in rows {
					writeln!(out, "  {:?} -> {}", row.kind, row.reference_index)?;
				}
			}
		}
		Ok(())
	}
}

fn fully_cache_with_ordinals(list: &AddressableList<EntrySource>) -> Result<Backing<EntrySource>> {
	let mut items = Vec::with_capacity(list.size());
	for i in 0..list.size() {
		let mut source = list.get(i)?;
		source.ordinal = i as Ordinal;
		items.push(source);
	}
	Ok(Backing::Memory(items))
}

fn inline_html_bodies(titles: &[HtmlEntry], bodies: &Backing<HtmlBody>) -> Result<Vec<HtmlEntry>> {
	titles
		.iter()
		.map(|entry| {
			let inline_body = match &entry.body {
				crate::entry::HtmlBodyRef::Inline(body) => body.clone(),
				crate::entry::HtmlBodyRef::ByOrdinal(ordinal) => bodies.get(*ordinal as usize)?,
			};
			Ok(HtmlEntry {
				source: entry.source,
				title: entry.title.clone(),
				body: crate::entry::HtmlBodyRef::Inline(inline_body),
			})
		})
		.collect()
}

fn prune_html_rows(index: &Index, skip_html: bool) -> Result<Index> {
	use crate::row::RowKind;

	let rows = index.rows()?;
	if !skip_html {
		return Index::new(
			index.short_name.clone(),
			index.long_name.clone(),
			index.sort_language.clone(),
			index.normalizer_rules.clone(),
			index.swap_pair_entries,
			index.main_token_count,
			index.stoplist.clone(),
			index.sorted_entries()?,
			rows,
		);
	}

	let mut renumber = vec![-1i32; rows.len()];
	let mut kept_rows = Vec::new();
	for (old_index, row) in rows.iter().enumerate() {
		if row.kind == RowKind::Html {
			continue;
		}
		renumber[old_index] = kept_rows.len() as i32;
		kept_rows.push(*row);
	}

	let entries = index.sorted_entries()?;
	let mut new_entries = Vec::with_capacity(entries.len());
	for entry in entries {
		let old_start = entry.start_row as usize;
		let new_start = renumber[old_start];
		if new_start < 0 {
			return Err(Error::Corrupt("IndexEntry.start_row refers to a pruned HTML row".into()));
		}
		let mut new_num_rows = 0i32;
		for old in old_start..old_start + entry.num_rows as usize {
			if renumber[old] >= 0 {
				new_num_rows += 1;
			}
		}
		new_entries.push(
			crate::index::IndexEntry::new(entry.token.clone(), new_start, new_num_rows).with_html_refs(entry.html_refs.clone()),
		);
	}

	Index::new(
		index.short_name.clone(),
		index.long_name.clone(),
		index.sort_language.clone(),
		index.normalizer_rules.clone(),
		index.swap_pair_entries,
		index.main_token_count,
		index.stoplist.clone(),
		new_entries,
		kept_rows,
	)
}

fn open_index_section(
	source: Arc<Mutex<File>>,
	dict_file_version: i32,
	base_offset: u64,
) -> Result<(Vec<Index>, u64)> {
	let (count, offsets) = {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Start(base_offset))?;
		let count = raw::read_i32(&mut *file)?;
		if count < 0 {
			return Err(Error::Corrupt("negative indices count".into()));
		}
		let count = count as usize;
		let mut offsets = Vec::with_capacity(count + 1);
		for _ in 0..=count {
			let off = raw::read_i64(&mut *file)?;
			if off < 0 {
				return Err(Error::Corrupt("negative offset in indices TOC".into()));
			}
			offsets.push(off as u64);
		}
		(count, offsets)
	};

	let mut indices = Vec::with_capacity(count);
	for i in 0..count {
		let (parsed, end) = index::open_index(source.clone(), dict_file_version, offsets[i])?;
		if end != offsets[i + 1] {
			return Err(Error::Corrupt("Index end offset does not match indices TOC".into()));
		}
		indices.push(parsed);
	}
	Ok((indices, *offsets.last().unwrap()))
}

fn write_index_section<W: Write + Seek>(w: &mut W, base_offset: u64, indices: &[Index]) -> Result<u64> {
	let count = indices.len();
	w.seek(SeekFrom::Start(base_offset))?;
	raw::write_i32(w, count as i32)?;

	let toc_start = base_offset + 4;
	let elements_start = toc_start + (count as u64 + 1) * 8;

	let mut offsets = Vec::with_capacity(count + 1);
	let mut cursor = elements_start;
	for index in indices {
		offsets.push(cursor);
		cursor = index::write_index(w, cursor, index)?;
	}
	offsets.push(cursor);

	w.seek(SeekFrom::Start(toc_start))?;
	for offset in &offsets {
		raw::write_i64(w, *offset as i64)?;
	}
	w.seek(SeekFrom::Start(cursor))?;
	Ok(cursor)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entry::HtmlBodyRef;
	use crate::index::IndexEntry;
	use crate::row::RowKind;
	use std::collections::HashSet;
	use std::io::Cursor;

	fn sample_dictionary() -> Dictionary {
		let mut dict = Dictionary::new("sample dictionary".into(), 1_700_000_000_000);
		let source_ordinal = dict.add_source(EntrySource {
			name: "test-corpus".into(),
			num_entries: 1,
			ordinal: -1,
		});
		dict.add_pair(PairEntry {
			source: source_ordinal,
			pairs: vec![("apple".into(), "maçã".into())],
		});
		dict.add_pair(PairEntry {
			source: source_ordinal,
			pairs: vec![("apple tree".into(), "macieira".into())],
		});

		let rows = vec![
			Row {
				kind: RowKind::TokenMain,
				reference_index: source_ordinal,
			},
			Row {
				kind: RowKind::Pair,
				reference_index: 0,
			},
			Row {
				kind: RowKind::Pair,
				reference_index: 1,
			},
		];
		let entries = vec![IndexEntry::new("apple".into(), 0, 3)];
		let index = Index::new(
			"en".into(),
			"English".into(),
			"en".into(),
			":: Lower ;".into(),
			false,
			1,
			HashSet::new(),
			entries,
			rows,
		)
		.unwrap();
		dict.add_index(index);
		dict
	}

	// Round-trip write then open, assert structural equality.
	#[test]
	fn test_v7_roundtrip() {
		let dict = sample_dictionary();
		let mut buf = Cursor::new(Vec::new());
		dict.write(&mut buf, 7, false).unwrap();

		let mut tmp = tempfile::NamedTempFile::new().unwrap();
		tmp.write_all(buf.get_ref()).unwrap();
		tmp.flush().unwrap();

		let reopened = Dictionary::open(tmp.path()).unwrap();
		assert_eq!(reopened.version(), 7);
		assert_eq!(reopened.dict_info(), "sample dictionary");
		assert_eq!(reopened.source(0).unwrap().name, "test-corpus");
		assert_eq!(reopened.pair(0).unwrap().pairs[0].0, "apple");

		let indices = reopened.indices().unwrap();
		assert_eq!(indices.len(), 1);
		let entry = indices[0].find_insertion_point("apple", || false).unwrap().unwrap();
		assert_eq!(entry.num_rows, 3);
		let rows = indices[0].entry_rows(&entry).unwrap();
		assert_eq!(rows.len(), 3);
		match reopened.dereference(rows[0]).unwrap() {
			DereferencedRow::Token { source, is_main } => {
				assert!(is_main);
				assert_eq!(source.name, "test-corpus");
			}
			_ => panic!("expected a token row"),
		}
	}

	// writev6(skipHtml=true) prunes HTML rows and renumbers.
	#[test]
	fn test_v6_skip_html_renumbers_rows() {
		let mut dict = Dictionary::new("with html".into(), 0);
		let source_ordinal = dict.add_source(EntrySource {
			name: "src".into(),
			num_entries: 1,
			ordinal: -1,
		});
		dict.add_pair(PairEntry {
			source: source_ordinal,
			pairs: vec![("a".into(), "b".into())],
		});
		dict.add_pair(PairEntry {
			source: source_ordinal,
			pairs: vec![("c".into(), "d".into())],
		});
		let html_body = HtmlBody::compress("<p>x</p>").unwrap();
		dict.add_html_title(HtmlEntry {
			source: source_ordinal,
			title: "x".into(),
			body: HtmlBodyRef::Inline(html_body),
		});

		let rows = vec![
			Row {
				kind: RowKind::TokenMain,
				reference_index: source_ordinal,
			},
			Row {
				kind: RowKind::Pair,
				reference_index: 0,
			},
			Row {
				kind: RowKind::Html,
				reference_index: 0,
			},
			Row {
				kind: RowKind::Pair,
				reference_index: 1,
			},
		];
		let entries = vec![IndexEntry::new("x".into(), 0, 4)];
		let index = Index::new(
			"en".into(),
			"English".into(),
			"en".into(),
			":: Lower ;".into(),
			false,
			1,
			HashSet::new(),
			entries,
			rows,
		)
		.unwrap();
		dict.add_index(index);

		let mut buf = Cursor::new(Vec::new());
		dict.write(&mut buf, 6, true).unwrap();

		let mut tmp = tempfile::NamedTempFile::new().unwrap();
		tmp.write_all(buf.get_ref()).unwrap();
		tmp.flush().unwrap();

		let reopened = Dictionary::open(tmp.path()).unwrap();
		let indices = reopened.indices().unwrap();
		let rows = indices[0].rows().unwrap();
		assert_eq!(rows.len(), 3);
		assert_eq!(rows[0].kind, RowKind::TokenMain);
		assert_eq!(rows[1].kind, RowKind::Pair);
		assert_eq!(rows[2].kind, RowKind::Pair);

		let entry = indices[0].find_insertion_point("x", || false).unwrap().unwrap();
		assert_eq!(entry.num_rows, 3);
	}

	#[test]
	fn test_v7_rejects_skip_html() {
		let dict = sample_dictionary();
		let mut buf = Cursor::new(Vec::new());
		assert!(matches!(dict.write(&mut buf, 7, true), Err(Error::Corrupt(_))));
	}

	#[test]
	fn test_closed_dictionary_rejects_reads() {
		let dict = sample_dictionary();
		let mut buf = Cursor::new(Vec::new());
		dict.write(&mut buf, 7, false).unwrap();
		let mut tmp = tempfile::NamedTempFile::new().unwrap();
		tmp.write_all(buf.get_ref()).unwrap();
		tmp.flush().unwrap();

		let mut reopened = Dictionary::open(tmp.path()).unwrap();
		reopened.close();
		assert!(matches!(reopened.source(0), Err(Error::Closed)));
	}

	#[test]
	fn test_info_degrades_on_bad_file() {
		let tmp = tempfile::NamedTempFile::new().unwrap();
		let info = Dictionary::info(tmp.path());
		assert!(info.version.is_none());
		assert_eq!(info.file_len, 0);
	}
}
