//! Interactive lookup loop over a dictionary file, reading queries from a
//! plain `stdin` read loop.

use std::io::{self, BufRead, Write};

fn main() {
	let path = std::env::args().nth(1).expect("usage: query <dictionary-file>");
	let dict = dictstore::Dictionary::open(&path).expect("failed to open dictionary");

	println!("\nDictionary: {}\n", dict.dict_info());

	let indices = dict.indices().expect("dictionary is open");
	let index = match indices.first() {
		Some(index) => index,
		None => {
			println!("no indices in this dictionary");
			return;
		}
	};

	let stdin = io::stdin();
	loop {
		print!(">> ");
		io::stdout().flush().ok();
		let mut line = String::new();
		if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
			println!("\nBye!\n");
			break;
		}
		let query = line.trim();
		if query.is_empty() {
			continue;
		}

		match index.find_insertion_point(query, || false) {
			Ok(Some(entry)) => {
				println!("-> {} (rows {}..{})", entry.token, entry.start_row, entry.start_row + entry.num_rows);
				if let Ok(rows) = index.entry_rows(&entry) {
					for row in rows {
						match dict.dereference(row) {
							Ok(dictstore::DereferencedRow::Pair(pair)) => {
								for (a, b) in pair.pairs {
									println!("   {} = {}", a, b);
								}
							}
							Ok(dictstore::DereferencedRow::Text(text)) => println!("   {}", text.text),
							Ok(dictstore::DereferencedRow::Html { entry, .. }) => println!("   <html: {}>", entry.title),
							Ok(dictstore::DereferencedRow::Token { source, .. }) => println!("   [{}]", source.name),
							Err(err) => println!("   error: {}", err),
						}
					}
				}
			}
			Ok(None) => println!("-> (index is empty)"),
			Err(err) => println!("   error: {}", err),
		}
		println!();
	}
}
