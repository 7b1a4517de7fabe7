//! Sorted index and lookup: normalization, a language-aware collator,
//! binary search with "wind-back", and the optional longest-prefix search.
//!
//! Lookups run as a collator-driven binary search over a lazily paged,
//! sorted array, using `unicase::UniCase` as the comparator.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use unicase::UniCase;
use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

use crate::addressable::{write_addressable_list, AddressableList, ListElement, RandomAccessList};
use crate::backing::{Backing, BoxedList};
use crate::caching::CachingList;
use crate::error::{Error, Result};
use crate::raw;
use crate::row::Row;
use crate::uniform::{write_uniform_list, UniformAddressableList};

// ---------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq)]
enum NormalizeOp {
	Nfd,
	Nfc,
	RemoveNonspacingMarks,
	Lower,
	Upper,
	Map(char, String),
}

/// A compiled transliteration pipeline built from a persisted
/// `normalizerRules` string. Supports a subset of the ICU transliterator
/// grammar: `:: NFD ;`, `:: NFC ;`, `:: [:Mn:] Remove ;`, `:: Lower ;`,
/// `:: Upper ;`, and single rune replacement rules (`a > b ;`).
#[derive(Clone, Debug)]
pub struct Normalizer {
	ops: Vec<NormalizeOp>,
}

impl Normalizer {
	pub fn compile(rules: &str) -> Normalizer {
		let mut ops = Vec::new();
		for clause in rules.split(';') {
			let clause = clause.trim();
			if clause.is_empty() {
				continue;
			}
			if let Some(rest) = clause.strip_prefix("::") {
				let rest = rest.trim();
				match rest.to_ascii_lowercase().as_str() {
					"nfd" => ops.push(NormalizeOp::Nfd),
					"nfc" => ops.push(NormalizeOp::Nfc),
					"lower" => ops.push(NormalizeOp::Lower),
					"upper" => ops.push(NormalizeOp::Upper),
					"[:mn:] remove" => ops.push(NormalizeOp::RemoveNonspacingMarks),
					_ => { /* unrecognized functional clause: ignored */ }
				}
			} else if let Some((src, dst)) = clause.split_once('>') {
				let src = src.trim();
				let dst = dst.trim();
				if let Some(c) = src.chars().next() {
					if src.chars().count() == 1 {
						ops.push(NormalizeOp::Map(c, dst.to_string()));
					}
				}
			}
		}
		Normalizer { ops }
	}

	/// Applies the compiled pipeline. Pure and thread-safe: a fresh
	/// `String` is produced on every call.
	pub fn apply(&self, input: &str) -> String {
		let mut current = input.to_string();
		for op in &self.ops {
			current = match op {
				NormalizeOp::Nfd => current.nfd().collect(),
				NormalizeOp::Nfc => current.nfc().collect(),
				NormalizeOp::RemoveNonspacingMarks => {
					current.chars().filter(|c| !c.is_mark_nonspacing()).collect()
				}
				NormalizeOp::Lower => current.to_lowercase(),
				NormalizeOp::Upper => current.to_uppercase(),
				NormalizeOp::Map(src, dst) => current.replace(*src, dst),
			};
		}
		current
	}
}

// ---------------------------------------------------------------------
// Collator
// ---------------------------------------------------------------------

struct LanguageProfile {
	/// Tertiary strength keeps case/diacritic distinctions; anything looser
	/// collapses them via `unicase`. The strength is a property of the
	/// language configuration.
	case_sensitive: bool,
}

lazy_static::lazy_static! {
	static ref KNOWN_LANGUAGES: std::collections::HashMap<&'static str, LanguageProfile> = {
		let mut m = std::collections::HashMap::new();
		m.insert("und", LanguageProfile { case_sensitive: false });
		m.insert("en", LanguageProfile { case_sensitive: false });
		m.insert("ja", LanguageProfile { case_sensitive: false });
		m.insert("pt", LanguageProfile { case_sensitive: false });
		m.insert("pt-br", LanguageProfile { case_sensitive: false });
		m.insert("de", LanguageProfile { case_sensitive: false });
		m.insert("fr", LanguageProfile { case_sensitive: false });
		m.insert("es", LanguageProfile { case_sensitive: false });
		m
	};
}

/// Unicode-aware comparator parameterised by language, built on `unicase`.
pub struct Collator {
	case_sensitive: bool,
}

impl Collator {
	pub fn for_language(language_tag: &str) -> Result<Collator> {
		let key = language_tag.to_ascii_lowercase();
		KNOWN_LANGUAGES
			.get(key.as_str())
			.map(|profile| Collator {
				case_sensitive: profile.case_sensitive,
			})
			.ok_or_else(|| Error::UnsupportedLanguage(language_tag.to_string()))
	}

	pub fn compare(&self, a: &str, b: &str) -> Ordering {
		if self.case_sensitive {
			a.cmp(b)
		} else {
			UniCase::new(a).cmp(&UniCase::new(b))
		}
	}
}

// ---------------------------------------------------------------------
// IndexEntry
// ---------------------------------------------------------------------

/// A sorted lookup entry. `html_refs` (cross-references from one token to
/// its HTML variants) is stored with a `count; width; raw int32s` header
/// and materialized eagerly into a `Vec` at decode time, since the list is
/// always small: there's no memory-frugality benefit to keeping it
/// file-backed, only complexity.
#[derive(Clone, Debug)]
pub struct IndexEntry {
	pub token: String,
	pub start_row: i32,
	pub num_rows: i32,
	normalized_token_stored: Option<String>,
	pub html_refs: Vec<i32>,
	normalized_cache: Arc<Mutex<Option<String>>>,
}

impl PartialEq for IndexEntry {
	fn eq(&self, other: &Self) -> bool {
		self.token == other.token
			&& self.start_row == other.start_row
			&& self.num_rows == other.num_rows
			&& self.normalized_token_stored == other.normalized_token_stored
			&& self.html_refs == other.html_refs
	}
}

impl IndexEntry {
	pub fn new(token: String, start_row: i32, num_rows: i32) -> IndexEntry {
		IndexEntry {
			token,
			start_row,
			num_rows,
			normalized_token_stored: None,
			html_refs: Vec::new(),
			normalized_cache: Arc::new(Mutex::new(None)),
		}
	}

	pub fn with_normalized(mut self, normalized: String) -> IndexEntry {
		self.normalized_token_stored = Some(normalized);
		self
	}

	pub fn with_html_refs(mut self, refs: Vec<i32>) -> IndexEntry {
		self.html_refs = refs;
		self
	}

	/// Lazy per-entry memo of `normalizer.apply(&self.token)`. Computed
	/// once; safe under concurrent reads via the mutex guarding the memo
	/// cell.
	pub fn normalized_token(&self, normalizer: &Normalizer) -> String {
		if let Some(stored) = &self.normalized_token_stored {
			return stored.clone();
		}
		let mut cache = self.normalized_cache.lock().unwrap();
		if let Some(value) = &*cache {
			return value.clone();
		}
		let computed = normalizer.apply(&self.token);
		*cache = Some(computed.clone());
		computed
	}
}

impl ListElement for IndexEntry {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
		raw::write_mutf8(w, &self.token)?;
		raw::write_i32(w, self.start_row)?;
		raw::write_i32(w, self.num_rows)?;
		match &self.normalized_token_stored {
			Some(value) => {
				raw::write_bool(w, true)?;
				raw::write_mutf8(w, value)?;
			}
			None => raw::write_bool(w, false)?,
		}
		raw::write_i32(w, self.html_refs.len() as i32)?;
		raw::write_i32(w, 4)?;
		for r in &self.html_refs {
			raw::write_i32(w, *r)?;
		}
		Ok(())
	}

	fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
		let token = raw::read_mutf8(r)?;
		if token.is_empty() || token.trim() != token {
			return Err(Error::Corrupt("IndexEntry.token must be non-empty and trimmed".into()));
		}
		let start_row = raw::read_i32(r)?;
		let num_rows = raw::read_i32(r)?;
		let has_normalized = raw::read_bool(r)?;
		let normalized_token_stored = if has_normalized {
			Some(raw::read_mutf8(r)?)
		} else {
			None
		};
		let count = raw::read_i32(r)?;
		let width = raw::read_i32(r)?;
		if width != 4 {
			return Err(Error::Corrupt(format!("IndexEntry.htmlRefs width {} unsupported", width)));
		}
		if count < 0 {
			return Err(Error::Corrupt("negative IndexEntry.htmlRefs count".into()));
		}
		let mut html_refs = Vec::with_capacity(count as usize);
		for _ in 0..count {
			html_refs.push(raw::read_i32(r)?);
		}
		Ok(IndexEntry {
			token,
			start_row,
			num_rows,
			normalized_token_stored,
			html_refs,
			normalized_cache: Arc::new(Mutex::new(None)),
		})
	}
}

// ---------------------------------------------------------------------
// longest_prefix result
// ---------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct SearchResult {
	pub insertion_point: IndexEntry,
	pub longest_prefix: Option<IndexEntry>,
	pub longest_prefix_string: String,
	pub success: bool,
}

// ---------------------------------------------------------------------
// Index
// ---------------------------------------------------------------------

/// A sorted lookup index over one language's tokens.
pub struct Index {
	pub short_name: String,
	pub long_name: String,
	pub sort_language: String,
	pub normalizer_rules: String,
	pub swap_pair_entries: bool,
	pub main_token_count: i32,
	pub stoplist: HashSet<String>,
	sorted_entries: Backing<IndexEntry>,
	rows: Backing<Row>,
	normalizer: Normalizer,
	collator: Collator,
}

impl Index {
	/// Builds an in-memory index meant for writing from scratch.
	pub fn new(
		short_name: String,
		long_name: String,
		sort_language: String,
		normalizer_rules: String,
		swap_pair_entries: bool,
		main_token_count: i32,
		stoplist: HashSet<String>,
		sorted_entries: Vec<IndexEntry>,
		rows: Vec<Row>,
	) -> Result<Index> {
		let collator = Collator::for_language(&sort_language)?;
		let normalizer = Normalizer::compile(&normalizer_rules);
		validate_entries(&sorted_entries, &rows, &normalizer, &collator)?;
		Ok(Index {
			short_name,
			long_name,
			sort_language,
			normalizer_rules,
			swap_pair_entries,
			main_token_count,
			stoplist,
			sorted_entries: Backing::Memory(sorted_entries),
			rows: Backing::Memory(rows),
			normalizer,
			collator,
		})
	}

	pub fn normalizer(&self) -> &Normalizer {
		&self.normalizer
	}

	pub fn collator(&self) -> &Collator {
		&self.collator
	}

	pub fn sorted_entries(&self) -> Result<Vec<IndexEntry>> {
		self.sorted_entries.iter_collect()
	}

	pub fn entry_count(&self) -> usize {
		self.sorted_entries.len()
	}

	pub fn rows(&self) -> Result<Vec<Row>> {
		self.rows.iter_collect()
	}

	pub fn row(&self, index: usize) -> Result<Row> {
		self.rows.get(index)
	}

	/// Rows `[entry.start_row, entry.start_row + entry.num_rows)`.
	pub fn entry_rows(&self, entry: &IndexEntry) -> Result<Vec<Row>> {
		let start = entry.start_row as usize;
		let count = entry.num_rows as usize;
		(start..start + count).map(|i| self.rows.get(i)).collect()
	}

	pub fn normalize(&self, query: &str) -> String {
		self.normalizer.apply(query)
	}

	/// Binary search with wind-back. `interrupted` is polled once per
	/// binary-search step and once per wind-back step; a `true` result
	/// aborts with [`Error::Cancelled`] and leaves no observable side
	/// effect.
	pub fn find_insertion_point<F: Fn() -> bool>(
		&self,
		query: &str,
		interrupted: F,
	) -> Result<Option<IndexEntry>> {
		let n = self.sorted_entries.len();
		if n == 0 {
			return Ok(None);
		}
		let q = self.normalizer.apply(query);

		let mut lo = 0usize;
		let mut hi = n;
		let mut exact: Option<usize> = None;
		while lo < hi {
			if interrupted() {
				return Err(Error::Cancelled);
			}
			let mid = lo + (hi - lo) / 2;
			let entry = self.sorted_entries.get(mid)?;
			let key = entry.normalized_token(&self.normalizer);
			match self.collator.compare(&q, &key) {
				Ordering::Equal => {
					exact = Some(mid);
					break;
				}
				Ordering::Less => hi = mid,
				Ordering::Greater => lo = mid + 1,
			}
		}

		let mut m = match exact {
			Some(m) => m,
			None => lo.min(n - 1),
		};

		// Wind back to the first entry of the collator-equal run.
		loop {
			if interrupted() {
				return Err(Error::Cancelled);
			}
			if m == 0 {
				break;
			}
			let cur_key = self.sorted_entries.get(m)?.normalized_token(&self.normalizer);
			let prev_key = self.sorted_entries.get(m - 1)?.normalized_token(&self.normalizer);
			if self.collator.compare(&prev_key, &cur_key) == Ordering::Equal {
				m -= 1;
			} else {
				break;
			}
		}

		Ok(Some(self.sorted_entries.get(m)?))
	}

	/// Longest-prefix search: shortens `query` from the right until
	/// `find_insertion_point` returns an entry whose normalized token
	/// starts with the shortened (and normalized) prefix.
	pub fn longest_prefix<F: Fn() -> bool>(&self, query: &str, interrupted: F) -> Result<SearchResult> {
		let first = self.find_insertion_point(query, &interrupted)?;
		let first = match first {
			Some(entry) => entry,
			None => {
				return Ok(SearchResult {
					insertion_point: IndexEntry::new(String::new(), 0, 0),
					longest_prefix: None,
					longest_prefix_string: String::new(),
					success: false,
				})
			}
		};

		let chars: Vec<char> = query.chars().collect();
		let mut longest_prefix = None;
		let mut longest_prefix_string = String::new();
		let mut success = false;

		for len in (1..=chars.len()).rev() {
			if interrupted() {
				return Err(Error::Cancelled);
			}
			let prefix: String = chars[..len].iter().collect();
			if let Some(entry) = self.find_insertion_point(&prefix, &interrupted)? {
				let key = entry.normalized_token(&self.normalizer);
				let normalized_prefix = self.normalizer.apply(&prefix);
				if key.starts_with(&normalized_prefix) {
					longest_prefix = Some(entry);
					longest_prefix_string = prefix;
					success = true;
					break;
				}
			}
		}

		Ok(SearchResult {
			insertion_point: first,
			longest_prefix,
			longest_prefix_string,
			success,
		})
	}
}

fn validate_entries(
	entries: &[IndexEntry],
	rows: &[Row],
	normalizer: &Normalizer,
	collator: &Collator,
) -> Result<()> {
	for entry in entries {
		if entry.token.trim() != entry.token || entry.token.is_empty() {
			return Err(Error::Corrupt("IndexEntry.token must be non-empty and trimmed".into()));
		}
		let start = entry.start_row;
		if start < 0 || (start as usize) >= rows.len() {
			return Err(Error::Corrupt("IndexEntry.start_row out of range".into()));
		}
		if (start as i64) + (entry.num_rows as i64) > rows.len() as i64 {
			return Err(Error::Corrupt("IndexEntry range exceeds row count".into()));
		}
		if !rows[start as usize].kind.is_token() {
			return Err(Error::Corrupt("row at IndexEntry.start_row is not a TokenRow".into()));
		}
	}
	for window in entries.windows(2) {
		let a = window[0].normalized_token(normalizer);
		let b = window[1].normalized_token(normalizer);
		if collator.compare(&a, &b) == Ordering::Greater {
			return Err(Error::Corrupt("sortedEntries is not sorted".into()));
		}
	}
	Ok(())
}

// ---------------------------------------------------------------------
// File framing: Index header + nested entries/stoplist/rows sections.
// ---------------------------------------------------------------------

/// Opens one `Index` whose header starts at `base_offset`. Returns the
/// index plus the offset one past its row array, so the caller (the
/// dictionary's `indices` section scan) can validate it against the outer
/// TOC.
pub fn open_index(source: Arc<Mutex<File>>, dict_file_version: i32, base_offset: u64) -> Result<(Index, u64)> {
	let (short_name, long_name, sort_language, normalizer_rules, swap_pair_entries, main_token_count, after_header) = {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Start(base_offset))?;
		let short_name = raw::read_mutf8(&mut *file)?;
		let long_name = raw::read_mutf8(&mut *file)?;
		let sort_language = raw::read_mutf8(&mut *file)?;
		let normalizer_rules = raw::read_mutf8(&mut *file)?;
		let swap_pair_entries = raw::read_bool(&mut *file)?;
		let main_token_count = raw::read_i32(&mut *file)?;
		let after_header = file.seek(SeekFrom::Current(0))?;
		(
			short_name,
			long_name,
			sort_language,
			normalizer_rules,
			swap_pair_entries,
			main_token_count,
			after_header,
		)
	};

	let collator = Collator::for_language(&sort_language)?;
	let normalizer = Normalizer::compile(&normalizer_rules);

	let entries_list = AddressableList::<IndexEntry>::open(source.clone(), dict_file_version, after_header)?;
	let entries_end = entries_list.end_offset();

	let stoplist = {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Start(entries_end))?;
		let count = raw::read_i32(&mut *file)?;
		if count < 0 {
			return Err(Error::Corrupt("negative stoplist size".into()));
		}
		let mut set = HashSet::with_capacity(count as usize);
		for _ in 0..count {
			set.insert(raw::read_mutf8(&mut *file)?);
		}
		set
	};
	let stoplist_end = {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Current(0))?
	};

	let rows_list = UniformAddressableList::<Row>::open(source.clone(), stoplist_end)?;
	let end_offset = rows_list.end_offset();

	let boxed_entries: BoxedList<IndexEntry> = Box::new(entries_list);
	let boxed_rows: BoxedList<Row> = Box::new(rows_list);

	let index = Index {
		short_name,
		long_name,
		sort_language,
		normalizer_rules,
		swap_pair_entries,
		main_token_count,
		stoplist,
		sorted_entries: Backing::Cached(Arc::new(CachingList::new(boxed_entries))),
		rows: Backing::Cached(Arc::new(CachingList::fully_cached(boxed_rows)?)),
		normalizer,
		collator,
	};

	Ok((index, end_offset))
}

/// Writes one `Index` (header, entries, stoplist, rows) and returns the
/// offset one past its row array.
pub fn write_index<W: Write + Seek>(w: &mut W, base_offset: u64, index: &Index) -> Result<u64> {
	w.seek(SeekFrom::Start(base_offset))?;
	raw::write_mutf8(w, &index.short_name)?;
	raw::write_mutf8(w, &index.long_name)?;
	raw::write_mutf8(w, &index.sort_language)?;
	raw::write_mutf8(w, &index.normalizer_rules)?;
	raw::write_bool(w, index.swap_pair_entries)?;
	raw::write_i32(w, index.main_token_count)?;
	let after_header = w.seek(SeekFrom::Current(0))?;

	let entries = index.sorted_entries.iter_collect()?;
	let entries_end = write_addressable_list(w, after_header, &entries)?;

	w.seek(SeekFrom::Start(entries_end))?;
	let mut stoplist: Vec<&String> = index.stoplist.iter().collect();
	stoplist.sort();
	raw::write_i32(w, stoplist.len() as i32)?;
	for word in stoplist {
		raw::write_mutf8(w, word)?;
	}
	let stoplist_end = w.seek(SeekFrom::Current(0))?;

	let rows = index.rows.iter_collect()?;
	let end_offset = write_uniform_list(w, stoplist_end, &rows)?;
	Ok(end_offset)
}
