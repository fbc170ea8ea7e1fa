//! Percent encoding of captured values.
//!
//! Only ASCII letters, digits, `_`, `.` and `-` are left as is. A segment
//! value also has its `/` escaped; a wildcard value keeps `/` as the
//! separator between segments.

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::observability::metrics;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'_').remove(b'.').remove(b'-');

/// Characters escaped inside a multi-segment path.
const PATH: &AsciiSet = &SEGMENT.remove(b'/');

/// Which characters an encoding leaves unescaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SafeSet {
    /// Always-safe characters only; `/` is escaped.
    Segment,
    /// Always-safe characters plus `/`.
    Path,
}

impl SafeSet {
    fn ascii_set(self) -> &'static AsciiSet {
        match self {
            SafeSet::Segment => SEGMENT,
            SafeSet::Path => PATH,
        }
    }
}

/// Encode `value` for use inside a single path segment.
pub fn quote_segment(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, SafeSet::Segment.ascii_set()).into()
}

/// Encode `value` keeping `/` as a path separator.
pub fn quote_path(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, SafeSet::Path.ascii_set()).into()
}

/// Decode `%XX` escapes. Invalid UTF-8 is replaced, not rejected.
pub fn unquote(value: &str) -> Cow<'_, str> {
    percent_decode_str(value).decode_utf8_lossy()
}

/// Bounded memo of encoded values.
///
/// Entries are keyed by safe set and value, so results never leak between
/// encoders. Once `capacity` entries are held, new values are encoded
/// without being stored. A capacity of zero disables the cache.
#[derive(Debug, Default)]
pub struct EncodingCache {
    capacity: usize,
    // slots reserved before insertion; never exceeds `capacity`
    stored: AtomicUsize,
    entries: DashMap<(SafeSet, String), String>,
}

impl EncodingCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            stored: AtomicUsize::new(0),
            entries: DashMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.stored.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode `value` under `safe`, consulting the cache first.
    pub fn quote(&self, value: &str, safe: SafeSet) -> String {
        if self.capacity == 0 {
            return utf8_percent_encode(value, safe.ascii_set()).to_string();
        }

        let key = (safe, value.to_string());
        if let Some(hit) = self.entries.get(&key) {
            metrics::record_encoding_cache("hit");
            return hit.value().clone();
        }

        metrics::record_encoding_cache("miss");
        let encoded = utf8_percent_encode(value, safe.ascii_set()).to_string();
        if self.reserve() {
            match self.entries.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(encoded.clone());
                }
                // another thread stored the same value first
                Entry::Occupied(_) => {
                    self.stored.fetch_sub(1, Ordering::AcqRel);
                }
            }
        }
        encoded
    }

    fn reserve(&self) -> bool {
        self.stored
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .is_ok()
    }
}
