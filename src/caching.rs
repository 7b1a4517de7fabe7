//! Caching list: a decorator that memoizes decoded elements from an
//! addressable list behind a bounded LRU, or eagerly decodes everything up
//! front ("fully cached").
//!
//! A single mutex guards the cache state. Decoding happens before the lock
//! is retaken so a slow decode never blocks other readers, and `Arc<V>` is
//! handed out so clones are cheap. Eviction is lazy: stale entries sit in a
//! recency heap and are discarded the next time the cache is over capacity,
//! rather than kept eagerly in sync.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Mutex};

use crate::addressable::RandomAccessList;
use crate::error::Result;

/// Default LRU capacity.
pub const DEFAULT_CAPACITY: usize = 5000;

enum Backing<T> {
	/// Bounded LRU over the wrapped list.
	Lru {
		capacity: usize,
		tick: u64,
		map: HashMap<usize, (Arc<T>, u64)>,
		recency: BinaryHeap<Reverse<(u64, usize)>>,
	},
	/// Every element decoded up front; no eviction.
	Full(Vec<Arc<T>>),
}

pub struct CachingList<T, L: RandomAccessList<T>> {
	inner: L,
	state: Mutex<Backing<T>>,
	_marker: std::marker::PhantomData<T>,
}

impl<T, L: RandomAccessList<T>> CachingList<T, L> {
	pub fn new(inner: L) -> Self {
		Self::with_capacity(inner, DEFAULT_CAPACITY)
	}

	pub fn with_capacity(inner: L, capacity: usize) -> Self {
		CachingList {
			inner,
			state: Mutex::new(Backing::Lru {
				capacity: capacity.max(1),
				tick: 0,
				map: HashMap::new(),
				recency: BinaryHeap::new(),
			}),
			_marker: std::marker::PhantomData,
		}
	}

	/// Eagerly decodes every element of `inner` and keeps them all cached,
	/// with no eviction.
	pub fn fully_cached(inner: L) -> Result<Self> {
		let mut items = Vec::with_capacity(inner.size());
		for i in 0..inner.size() {
			items.push(Arc::new(inner.get(i)?));
		}
		Ok(CachingList {
			inner,
			state: Mutex::new(Backing::Full(items)),
			_marker: std::marker::PhantomData,
		})
	}

	pub fn is_fully_cached(&self) -> bool {
		matches!(&*self.state.lock().unwrap(), Backing::Full(_))
	}
}

impl<T, L: RandomAccessList<T>> RandomAccessList<T> for CachingList<T, L>
where
	T: Clone,
{
	fn size(&self) -> usize {
		self.inner.size()
	}

	fn end_offset(&self) -> u64 {
		self.inner.end_offset()
	}

	fn get(&self, index: usize) -> Result<T> {
		{
			let mut state = self.state.lock().unwrap();
			match &mut *state {
				Backing::Full(items) => {
					return items
						.get(index)
						.map(|v| (**v).clone())
						.ok_or_else(|| crate::error::Error::Corrupt(format!("index {} out of bounds", index)));
				}
				Backing::Lru { map, .. } => {
					if map.contains_key(&index) {
						touch(&mut state, index);
						if let Backing::Lru { map, .. } = &*state {
							return Ok((*map[&index].0).clone());
						}
						unreachable!()
					}
				}
			}
		}

		// Cache miss: decode outside the lock so a slow decode doesn't
		// block other readers.
		let value = Arc::new(self.inner.get(index)?);
		let out = (*value).clone();

		let mut state = self.state.lock().unwrap();
		if let Backing::Lru {
			capacity,
			tick,
			map,
			recency,
		} = &mut *state
		{
			*tick += 1;
			map.insert(index, (value, *tick));
			recency.push(Reverse((*tick, index)));
			evict_if_needed(*capacity, map, recency);
		}
		Ok(out)
	}
}

fn touch<T>(state: &mut Backing<T>, index: usize) {
	if let Backing::Lru { tick, map, recency, .. } = state {
		if let Some(entry) = map.get_mut(&index) {
			*tick += 1;
			entry.1 = *tick;
			recency.push(Reverse((*tick, index)));
		}
	}
}

fn evict_if_needed<T>(
	capacity: usize,
	map: &mut HashMap<usize, (Arc<T>, u64)>,
	recency: &mut BinaryHeap<Reverse<(u64, usize)>>,
) {
	while map.len() > capacity {
		match recency.pop() {
			Some(Reverse((tick, index))) => {
				// Discard stale heap entries: the key may have been
				// touched again since this entry was pushed.
				if let Some((_, current_tick)) = map.get(&index) {
					if *current_tick == tick {
						map.remove(&index);
					}
				}
			}
			None => break,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	/// In-memory list used only to exercise the cache's eviction policy
	/// without touching the filesystem.
	struct VecList(Vec<u32>);

	impl RandomAccessList<u32> for VecList {
		fn size(&self) -> usize {
			self.0.len()
		}

		fn end_offset(&self) -> u64 {
			self.0.len() as u64
		}

		fn get(&self, index: usize) -> Result<u32> {
			self.0
				.get(index)
				.copied()
				.ok_or_else(|| Error::Corrupt("oob".into()))
		}
	}

	#[test]
	fn test_cache_hits_return_same_value() {
		let list = CachingList::with_capacity(VecList((0..10).collect()), 5);
		for i in 0..10 {
			assert_eq!(list.get(i).unwrap(), i as u32);
		}
		// Second pass should hit the cache for the most recently used keys.
		for i in 5..10 {
			assert_eq!(list.get(i).unwrap(), i as u32);
		}
	}

	#[test]
	fn test_eviction_keeps_size_bounded() {
		let list = CachingList::with_capacity(VecList((0..100).collect()), 3);
		for i in 0..100 {
			list.get(i).unwrap();
		}
		let state = list.state.lock().unwrap();
		if let Backing::Lru { map, .. } = &*state {
			assert!(map.len() <= 3);
		} else {
			panic!("expected LRU backing");
		}
	}

	#[test]
	fn test_fully_cached_eager_load() {
		let list = CachingList::fully_cached(VecList(vec![1, 2, 3])).unwrap();
		assert!(list.is_fully_cached());
		assert_eq!(list.size(), 3);
		assert_eq!(list.get(1).unwrap(), 2);
	}
}
