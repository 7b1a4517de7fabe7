//! Opens a dictionary file given as the first argument and prints its
//! metadata view.

fn main() {
	let path = std::env::args().nth(1).expect("usage: loading <dictionary-file>");

	println!("=> Opening {}", path);
	let start = std::time::Instant::now();
	let dict = dictstore::Dictionary::open(&path).expect("failed to open dictionary");
	println!("-> Opened in {:?}", start.elapsed());
	println!();

	dict.print(std::io::stdout()).expect("failed to print dictionary");
}
