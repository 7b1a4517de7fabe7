//! On-disk storage engine for a bilingual dictionary file: a versioned,
//! self-describing file format built from nested addressable lists, plus a
//! sorted lookup index with a culture-aware collator and lazy
//! normalization/caching.

mod addressable;
mod backing;
mod caching;
mod dict;
mod entry;
mod error;
mod index;
mod perf;
mod raw;
mod row;
mod uniform;

pub use addressable::{AddressableList, ListElement, RandomAccessList};
pub use dict::{DereferencedRow, Dictionary, DictionaryInfo, IndexInfo, CURRENT_VERSION};
pub use entry::{EntrySource, HtmlBody, HtmlBodyRef, HtmlEntry, Ordinal, PairEntry, TextEntry};
pub use error::{Error, Result};
pub use index::{Collator, Index, IndexEntry, Normalizer, SearchResult};
pub use row::{Row, RowKind};
pub use uniform::{FixedWidthElement, UniformAddressableList};
