//! Shared storage for a Dictionary's lists: either a plain in-memory `Vec`,
//! used while building a dictionary from scratch for writing, or a
//! [`CachingList`] over a file-backed list, used once a dictionary has been
//! opened for reading.

use std::sync::Arc;

use crate::addressable::RandomAccessList;
use crate::caching::CachingList;
use crate::error::{Error, Result};

/// Boxed so [`Backing`] doesn't need to be generic over the concrete list
/// type backing a file-opened dictionary.
pub type BoxedList<T> = Box<dyn RandomAccessList<T> + Send + Sync>;

impl<T> RandomAccessList<T> for BoxedList<T> {
	fn size(&self) -> usize {
		(**self).size()
	}

	fn get(&self, index: usize) -> Result<T> {
		(**self).get(index)
	}

	fn end_offset(&self) -> u64 {
		(**self).end_offset()
	}
}

pub enum Backing<T> {
	Memory(Vec<T>),
	Cached(Arc<CachingList<T, BoxedList<T>>>),
}

impl<T: Clone> Backing<T> {
	pub fn len(&self) -> usize {
		match self {
			Backing::Memory(v) => v.len(),
			Backing::Cached(c) => c.size(),
		}
	}

	pub fn get(&self, index: usize) -> Result<T> {
		match self {
			Backing::Memory(v) => v
				.get(index)
				.cloned()
				.ok_or_else(|| Error::Corrupt(format!("index {} out of bounds ({})", index, v.len()))),
			Backing::Cached(c) => c.get(index),
		}
	}

	pub fn push(&mut self, item: T) {
		match self {
			Backing::Memory(v) => v.push(item),
			Backing::Cached(_) => panic!("cannot append to a file-backed list"),
		}
	}

	pub fn iter_collect(&self) -> Result<Vec<T>> {
		(0..self.len()).map(|i| self.get(i)).collect()
	}
}
