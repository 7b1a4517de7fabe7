//! Builds a small in-memory dictionary, writes it to a temp file, reopens
//! it, and runs a couple of sample queries.

use std::collections::HashSet;
use std::io::Cursor;

use dictstore::{Dictionary, EntrySource, Index, IndexEntry, PairEntry, Row, RowKind};

fn main() {
	println!();
	println!("Sample queries ~ v{}", dictstore::CURRENT_VERSION);
	println!("==============");

	let mut dict = Dictionary::new("sample dictionary".into(), 0);
	let source = dict.add_source(EntrySource {
		name: "sample-corpus".into(),
		num_entries: 2,
		ordinal: -1,
	});
	dict.add_pair(PairEntry {
		source,
		pairs: vec![("apple".into(), "maçã".into())],
	});
	dict.add_pair(PairEntry {
		source,
		pairs: vec![("banana".into(), "banana".into())],
	});

	let rows = vec![
		Row {
			kind: RowKind::TokenMain,
			reference_index: source,
		},
		Row {
			kind: RowKind::Pair,
			reference_index: 0,
		},
	];
	let entries = vec![IndexEntry::new("apple".into(), 0, 2)];
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
	.expect("valid index");
	dict.add_index(index);

	let start = std::time::Instant::now();
	let mut buf = Cursor::new(Vec::new());
	dict.write(&mut buf, dictstore::CURRENT_VERSION, false).expect("write succeeds");
	println!("-> Built and serialized in {:?}", start.elapsed());

	let tmp = tempfile::NamedTempFile::new().expect("temp file");
	std::fs::write(tmp.path(), buf.get_ref()).expect("write temp file");

	let reopened = Dictionary::open(tmp.path()).expect("reopen dictionary");
	let indices = reopened.indices().expect("dictionary is open");
	for query in ["apple", "APPLE", "zzz"] {
		match indices[0].find_insertion_point(query, || false) {
			Ok(Some(entry)) => println!("find({:?}) -> {}", query, entry.token),
			Ok(None) => println!("find({:?}) -> (empty index)", query),
			Err(err) => println!("find({:?}) -> error: {}", query, err),
		}
	}

	println!("Bye!");
	println!();
}
