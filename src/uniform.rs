//! Uniform addressable lists: the same random-access contract as
//! [`crate::addressable::AddressableList`], specialized for fixed-width
//! elements so no per-element TOC is needed.
//!
//! Used for the row array (tag byte + reference, `W = 5`) and for
//! `IndexEntry.htmlRefs` (plain `int32`s, `W = 4`).

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::{Arc, Mutex};

use crate::addressable::RandomAccessList;
use crate::error::{Error, Result};
use crate::raw;

/// A fixed-width element stored in a [`UniformAddressableList`].
pub trait FixedWidthElement: Sized {
	const WIDTH: usize;
	fn encode<W: Write>(&self, w: &mut W) -> Result<()>;
	fn decode<R: Read>(r: &mut R) -> Result<Self>;
}

/// On-disk layout:
///
/// ```text
/// int32 count
/// int32 width
/// raw element bytes × count
/// ```
pub struct UniformAddressableList<T: FixedWidthElement> {
	source: Arc<Mutex<File>>,
	elements_start: u64,
	count: usize,
	width: usize,
	_marker: std::marker::PhantomData<T>,
}

impl<T: FixedWidthElement> UniformAddressableList<T> {
	pub fn open(source: Arc<Mutex<File>>, start_offset: u64) -> Result<Self> {
		let mut file = source.lock().unwrap();
		file.seek(SeekFrom::Start(start_offset))?;
		let count = raw::read_i32(&mut *file)?;
		let width = raw::read_i32(&mut *file)?;
		if count < 0 || width < 0 {
			return Err(Error::Corrupt("negative count or width in uniform list".into()));
		}
		let width = width as usize;
		if width != T::WIDTH {
			return Err(Error::Corrupt(format!(
				"uniform list element width {} cannot be decoded (expected {})",
				width,
				T::WIDTH
			)));
		}
		drop(file);
		Ok(UniformAddressableList {
			source,
			elements_start: start_offset + 8,
			count: count as usize,
			width,
			_marker: std::marker::PhantomData,
		})
	}
}

impl<T: FixedWidthElement> RandomAccessList<T> for UniformAddressableList<T> {
	fn size(&self) -> usize {
		self.count
	}

	fn get(&self, index: usize) -> Result<T> {
		if index >= self.count {
			return Err(Error::Corrupt(format!(
				"uniform list index {} out of bounds ({})",
				index, self.count
			)));
		}
		let offset = self.elements_start + (index * self.width) as u64;
		let mut file = self.source.lock().unwrap();
		file.seek(SeekFrom::Start(offset))?;
		T::decode(&mut *file)
	}

	fn end_offset(&self) -> u64 {
		self.elements_start + (self.count * self.width) as u64
	}
}

/// Writes a uniform list body and returns its `end_offset()`.
pub fn write_uniform_list<T, W>(w: &mut W, base_offset: u64, items: &[T]) -> Result<u64>
where
	T: FixedWidthElement,
	W: Write + Seek,
{
	w.seek(SeekFrom::Start(base_offset))?;
	raw::write_i32(w, items.len() as i32)?;
	raw::write_i32(w, T::WIDTH as i32)?;
	for item in items {
		item.encode(w)?;
	}
	w.seek(SeekFrom::Current(0)).map_err(Error::from)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Cursor;

	#[derive(Clone, Copy, Debug, PartialEq, Eq)]
	struct Pair(u8, i32);

	impl FixedWidthElement for Pair {
		const WIDTH: usize = 5;

		fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
			w.write_all(&[self.0])?;
			raw::write_i32(w, self.1)
		}

		fn decode<R: Read>(r: &mut R) -> Result<Self> {
			let mut tag = [0u8; 1];
			r.read_exact(&mut tag)?;
			let value = raw::read_i32(r)?;
			Ok(Pair(tag[0], value))
		}
	}

	#[test]
	fn test_uniform_roundtrip() {
		let items = vec![Pair(0, 10), Pair(3, -5), Pair(4, 999)];
		let mut tmp = tempfile::tempfile().unwrap();
		write_uniform_list(&mut tmp, 0, &items).unwrap();
		let file = Arc::new(Mutex::new(tmp));
		let list = UniformAddressableList::<Pair>::open(file, 0).unwrap();
		assert_eq!(list.size(), 3);
		assert_eq!(list.get(0).unwrap(), items[0]);
		assert_eq!(list.get(2).unwrap(), items[2]);
	}

	#[test]
	fn test_width_mismatch_rejected() {
		// Hand-craft a header claiming width 4 while `Pair::WIDTH` is 5.
		let mut tmp = tempfile::tempfile().unwrap();
		raw::write_i32(&mut tmp, 1).unwrap();
		raw::write_i32(&mut tmp, 4).unwrap();
		raw::write_i32(&mut tmp, 0).unwrap();
		let file = Arc::new(Mutex::new(tmp));
		assert!(matches!(
			UniformAddressableList::<Pair>::open(file, 0),
			Err(Error::Corrupt(_))
		));
	}
}
