//! Addressable lists: a persisted ordered sequence of elements, openable by
//! byte offset, supporting O(1) random access without decoding any other
//! element. A single TOC-driven list works over any `T: ListElement`.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::raw;

/// An element that can be read from and written to an [`AddressableList`].
///
/// `decode` receives the container's `dict_file_version` so legacy element
/// layouts from older file versions can be handled without a separate
/// reader type per version.
pub trait ListElement: Sized {
	fn encode<W: Write>(&self, w: &mut W) -> Result<()>;
	fn decode<R: Read>(r: &mut R, dict_file_version: i32) -> Result<Self>;
}

/// Random access over a persisted list, regardless of whether it carries a
/// per-element TOC ([`AddressableList`]) or a fixed stride
/// (`UniformAddressableList`).
pub trait RandomAccessList<T> {
	fn size(&self) -> usize;
	fn get(&self, index: usize) -> Result<T>;
	fn end_offset(&self) -> u64;
}

/// A list of variably-sized elements addressed through an offset table.
///
/// On-disk layout:
///
/// ```text
/// int32 count
/// int64 offset[0..=count]   -- offset[count] == end_offset()
/// raw element bytes...
/// ```
pub struct AddressableList<T: ListElement> {
	source: Arc<Mutex<File>>,
	dict_file_version: i32,
	offsets: Vec<u64>,
	_marker: std::marker::PhantomData<T>,
}

impl<T: ListElement> AddressableList<T> {
	/// Opens a list whose header (`int32 count`) starts at `start_offset`.
	pub fn open(source: Arc<Mutex<File>>, dict_file_version: i32, start_offset: u64) -> Result<Self> {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Start(start_offset))?;
		let count = raw::read_i32(&mut *file)?;
		if count < 0 {
			return Err(Error::Corrupt(format!("negative element count {}", count)));
		}
		let count = count as usize;

		let mut offsets = Vec::with_capacity(count + 1);
		for _ in 0..=count {
			let offset = raw::read_i64(&mut *file)?;
			if offset < 0 {
				return Err(Error::Corrupt("negative offset in addressable list TOC".into()));
			}
			offsets.push(offset as u64);
		}
		for window in offsets.windows(2) {
			if window[1] < window[0] {
				return Err(Error::Corrupt("addressable list TOC is not monotonic".into()));
			}
		}

		drop(file);
		Ok(AddressableList {
			source,
			dict_file_version,
			offsets,
			_marker: std::marker::PhantomData,
		})
	}
}

impl<T: ListElement> RandomAccessList<T> for AddressableList<T> {
	fn size(&self) -> usize {
		self.offsets.len() - 1
	}

	fn get(&self, index: usize) -> Result<T> {
		if index >= self.size() {
			return Err(Error::Corrupt(format!(
				"addressable list index {} out of bounds ({})",
				index,
				self.size()
			)));
		}
		let offset = self.offsets[index];
		let mut file = self.source.lock().unwrap();
		file.seek(SeekFrom::Start(offset))?;
		T::decode(&mut *file, self.dict_file_version)
	}

	fn end_offset(&self) -> u64 {
		*self.offsets.last().unwrap()
	}
}

/// Writes an [`AddressableList`] body: reserves the header and TOC, writes
/// each element sequentially while recording its starting offset, then
/// rewinds to fill in the TOC. Returns the offset one past the last element
/// (the list's `end_offset()`).
pub fn write_addressable_list<T, W>(w: &mut W, base_offset: u64, items: &[T]) -> Result<u64>
where
	T: ListElement,
	W: Write + Seek,
{
	let count = items.len();
	w.seek(SeekFrom::Start(base_offset))?;
	raw::write_i32(w, count as i32)?;

	// Reserve space for the TOC (count + 1 int64 offsets).
	let toc_start = base_offset + 4;
	let elements_start = toc_start + (count as u64 + 1) * 8;
	w.seek(SeekFrom::Start(elements_start))?;

	let mut offsets = Vec::with_capacity(count + 1);
	for item in items {
		offsets.push(w.seek(SeekFrom::Current(0))?);
		item.encode(w)?;
	}
	let end_offset = w.seek(SeekFrom::Current(0))?;
	offsets.push(end_offset);

	w.seek(SeekFrom::Start(toc_start))?;
	for offset in &offsets {
		raw::write_i64(w, *offset as i64)?;
	}

	w.seek(SeekFrom::Start(end_offset))?;
	Ok(end_offset)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[derive(Clone, Debug, PartialEq, Eq)]
	struct TestElement(String);

	impl ListElement for TestElement {
		fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
			crate::raw::write_mutf8(w, &self.0)
		}

		fn decode<R: Read>(r: &mut R, _dict_file_version: i32) -> Result<Self> {
			Ok(TestElement(crate::raw::read_mutf8(r)?))
		}
	}

	fn temp_file_with(items: &[TestElement]) -> (Arc<Mutex<File>>, u64) {
		let mut tmp = tempfile::tempfile().unwrap();
		let end = write_addressable_list(&mut tmp, 0, items).unwrap();
		(Arc::new(Mutex::new(tmp)), end)
	}

	#[test]
	fn test_random_access_roundtrip() {
		let items = vec![
			TestElement("alpha".into()),
			TestElement("beta".into()),
			TestElement("gamma".into()),
		];
		let (file, end) = temp_file_with(&items);
		let list = AddressableList::<TestElement>::open(file, 7, 0).unwrap();
		assert_eq!(list.size(), 3);
		assert_eq!(list.end_offset(), end);
		assert_eq!(list.get(0).unwrap(), items[0]);
		assert_eq!(list.get(2).unwrap(), items[2]);
		assert_eq!(list.get(1).unwrap(), items[1]);
	}

	#[test]
	fn test_out_of_bounds_is_corrupt() {
		let (file, _) = temp_file_with(&[TestElement("only".into())]);
		let list = AddressableList::<TestElement>::open(file, 7, 0).unwrap();
		assert!(matches!(list.get(1), Err(Error::Corrupt(_))));
	}

	#[test]
	fn test_empty_list() {
		let (file, _) = temp_file_with(&[]);
		let list = AddressableList::<TestElement>::open(file, 7, 0).unwrap();
		assert_eq!(list.size(), 0);
	}
}
