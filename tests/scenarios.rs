//! End-to-end scenarios exercising the public API across module boundaries,
//! complementing the inline unit tests in each module.

use std::collections::HashSet;
use std::io::Cursor;

use dictstore::{Dictionary, EntrySource, Index, IndexEntry, PairEntry, Row, RowKind};

fn build_dictionary(tokens: &[&str], normalizer_rules: &str) -> Dictionary {
	let mut dict = Dictionary::new("test dictionary".into(), 1234);
	let source = dict.add_source(EntrySource {
		name: "corpus".into(),
		num_entries: tokens.len() as i32,
		ordinal: -1,
	});

	let mut rows = Vec::new();
	let mut entries = Vec::new();
	for (i, token) in tokens.iter().enumerate() {
		let pair_ordinal = dict.add_pair(PairEntry {
			source,
			pairs: vec![(token.to_string(), format!("{}-translated", token))],
		});
		rows.push(Row {
			kind: RowKind::TokenMain,
			reference_index: source,
		});
		rows.push(Row {
			kind: RowKind::Pair,
			reference_index: pair_ordinal,
		});
		entries.push(IndexEntry::new(token.to_string(), (i * 2) as i32, 2));
	}

	let index = Index::new(
		"en".into(),
		"English".into(),
		"en".into(),
		normalizer_rules.into(),
		false,
		tokens.len() as i32,
		HashSet::new(),
		entries,
		rows,
	)
	.expect("valid index");
	dict.add_index(index);
	dict
}

fn reopen(dict: &Dictionary, version: i32) -> Dictionary {
	let mut buf = Cursor::new(Vec::new());
	dict.write(&mut buf, version, false).unwrap();
	let tmp = tempfile::NamedTempFile::new().unwrap();
	std::fs::write(tmp.path(), buf.get_ref()).unwrap();
	Dictionary::open(tmp.path()).unwrap()
}

#[test]
fn case_insensitive_search_round_trips_through_a_file() {
	let dict = build_dictionary(&["Apple", "banana", "Cherry"], ":: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];

	let found = index.find_insertion_point("apple", || false).unwrap().unwrap();
	assert_eq!(found.token, "Apple");
	let found = index.find_insertion_point("APPLE", || false).unwrap().unwrap();
	assert_eq!(found.token, "Apple");
}

#[test]
fn diacritic_and_case_folding_search() {
	let dict = build_dictionary(&["cafe", "Café"], ":: NFD ; :: [:Mn:] Remove ; :: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];

	let found = index.find_insertion_point("CAFE", || false).unwrap().unwrap();
	assert_eq!(found.token, "cafe", "wind-back must land on the first tied entry");
}

#[test]
fn query_past_the_end_clamps_to_the_last_entry() {
	let dict = build_dictionary(&["ant", "bee", "cat"], ":: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];

	let found = index.find_insertion_point("zzz", || false).unwrap().unwrap();
	assert_eq!(found.token, "cat");
	let result = index.longest_prefix("zzz", || false).unwrap();
	assert!(!result.success);
}

// A shorter prefix's match can never sort after a longer one's.
#[test]
fn prefix_monotonicity_holds() {
	let dict = build_dictionary(&["apple", "application", "banana"], ":: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];

	let shorter = index.find_insertion_point("app", || false).unwrap().unwrap();
	let longer = index.find_insertion_point("application", || false).unwrap().unwrap();
	assert!(shorter.start_row <= longer.start_row);
}

#[test]
fn normalization_is_idempotent() {
	let dict = build_dictionary(&["Café", "naive"], ":: NFD ; :: [:Mn:] Remove ; :: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];

	for token in ["Café", "NAIVE", "café"] {
		let once = index.normalize(token);
		let twice = index.normalize(&once);
		assert_eq!(once, twice);
	}
}

// Sortedness, token anchor, and row range well-formedness.
#[test]
fn structural_invariants_hold_after_round_trip() {
	let dict = build_dictionary(&["ant", "bee", "cat", "dog"], ":: Lower ;");
	let reopened = reopen(&dict, 7);
	let index = &reopened.indices().unwrap()[0];
	let rows = index.rows().unwrap();
	let entries = index.sorted_entries().unwrap();

	for window in entries.windows(2) {
		assert!(index.collator().compare(&window[0].normalized_token(index.normalizer()), &window[1].normalized_token(index.normalizer())) != std::cmp::Ordering::Greater);
	}
	for entry in &entries {
		let start = entry.start_row as usize;
		assert!(rows[start].kind.is_token());
		assert!(start + entry.num_rows as usize <= rows.len());
	}
}
