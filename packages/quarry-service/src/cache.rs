//! Bounded in-memory result cache. Entries live in a slot arena threaded by
//! an intrusive recency list, with a key index on top; get, insert, and
//! evict are all O(1). Capacity is enforced as both an entry count and a
//! byte total, and the TTL slides: each hit restarts an entry's clock.

use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use tracing::debug;

use quarry_domain::SearchResponse;

#[derive(Debug)]
struct Slot {
	key: String,
	value: SearchResponse,
	size_bytes: usize,
	inserted_at: OffsetDateTime,
	last_accessed_at: OffsetDateTime,
	prev: Option<usize>,
	next: Option<usize>,
}

#[derive(Debug)]
pub struct ResultCache {
	slots: Vec<Option<Slot>>,
	free: Vec<usize>,
	index: HashMap<String, usize>,
	// Recency list runs head (most recent) to tail (least recent).
	head: Option<usize>,
	tail: Option<usize>,
	total_bytes: usize,
	max_entries: usize,
	max_bytes: usize,
	ttl: Duration,
}
impl ResultCache {
	pub fn new(max_entries: usize, max_bytes: usize, ttl: Duration) -> Self {
		Self {
			slots: Vec::new(),
			free: Vec::new(),
			index: HashMap::new(),
			head: None,
			tail: None,
			total_bytes: 0,
			max_entries,
			max_bytes,
			ttl,
		}
	}

	pub fn len(&self) -> usize {
		self.index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.index.is_empty()
	}

	pub fn max_entries(&self) -> usize {
		self.max_entries
	}

	pub fn total_bytes(&self) -> usize {
		self.total_bytes
	}

	pub fn get(&mut self, key: &str) -> Option<SearchResponse> {
		self.get_at(key, OffsetDateTime::now_utc())
	}

	/// Looks up `key` as of `now`. An entry idle for longer than the TTL is
	/// dropped on contact; a live hit moves to the front of the recency list
	/// and restarts its TTL clock.
	pub fn get_at(&mut self, key: &str, now: OffsetDateTime) -> Option<SearchResponse> {
		let slot_id = *self.index.get(key)?;
		let expired =
			self.slots[slot_id].as_ref().is_none_or(|slot| now - slot.last_accessed_at > self.ttl);

		if expired {
			self.remove(slot_id);

			return None;
		}

		self.detach(slot_id);
		self.attach_front(slot_id);

		let slot = self.slots[slot_id].as_mut()?;

		slot.last_accessed_at = now;

		Some(slot.value.clone())
	}

	pub fn insert(&mut self, key: String, value: SearchResponse, size_bytes: usize) -> bool {
		self.insert_at(key, value, size_bytes, OffsetDateTime::now_utc())
	}

	/// Stores an entry, evicting from the least-recent end until both caps
	/// hold. Returns `false` without storing when the entry alone exceeds
	/// the byte cap. Re-inserting an existing key replaces it as a fresh
	/// entry.
	pub fn insert_at(
		&mut self,
		key: String,
		value: SearchResponse,
		size_bytes: usize,
		now: OffsetDateTime,
	) -> bool {
		if self.max_entries == 0 || size_bytes > self.max_bytes {
			return false;
		}
		if let Some(&slot_id) = self.index.get(&key) {
			self.remove(slot_id);
		}

		let slot_id = match self.free.pop() {
			Some(id) => id,
			None => {
				self.slots.push(None);

				self.slots.len() - 1
			},
		};

		self.slots[slot_id] = Some(Slot {
			key: key.clone(),
			value,
			size_bytes,
			inserted_at: now,
			last_accessed_at: now,
			prev: None,
			next: None,
		});
		self.attach_front(slot_id);
		self.index.insert(key, slot_id);
		self.total_bytes += size_bytes;

		while self.index.len() > self.max_entries || self.total_bytes > self.max_bytes {
			let Some(tail) = self.tail else {
				break;
			};

			if let Some(slot) = self.slots[tail].as_ref() {
				let age = (now - slot.inserted_at).whole_seconds();

				debug!(key = slot.key, age_secs = age, "Evicted least-recently-used cache entry.");
			}

			self.remove(tail);
		}

		true
	}

	pub fn clear(&mut self) {
		self.slots.clear();
		self.free.clear();
		self.index.clear();
		self.head = None;
		self.tail = None;
		self.total_bytes = 0;
	}

	fn remove(&mut self, slot_id: usize) {
		self.detach(slot_id);

		if let Some(slot) = self.slots[slot_id].take() {
			self.index.remove(&slot.key);
			self.total_bytes -= slot.size_bytes;
			self.free.push(slot_id);
		}
	}

	fn detach(&mut self, slot_id: usize) {
		let (prev, next) = match self.slots[slot_id].as_mut() {
			Some(slot) => {
				let links = (slot.prev, slot.next);

				slot.prev = None;
				slot.next = None;

				links
			},
			None => return,
		};

		match prev {
			Some(prev_id) => {
				if let Some(slot) = self.slots[prev_id].as_mut() {
					slot.next = next;
				}
			},
			None if self.head == Some(slot_id) => self.head = next,
			None => {},
		}
		match next {
			Some(next_id) => {
				if let Some(slot) = self.slots[next_id].as_mut() {
					slot.prev = prev;
				}
			},
			None if self.tail == Some(slot_id) => self.tail = prev,
			None => {},
		}
	}

	fn attach_front(&mut self, slot_id: usize) {
		let old_head = self.head;

		if let Some(slot) = self.slots[slot_id].as_mut() {
			slot.prev = None;
			slot.next = old_head;
		}
		if let Some(head_id) = old_head
			&& let Some(slot) = self.slots[head_id].as_mut()
		{
			slot.prev = Some(slot_id);
		}

		self.head = Some(slot_id);

		if self.tail.is_none() {
			self.tail = Some(slot_id);
		}
	}
}
