use super::types::{Record, RecordId};

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    record: Option<Record<T>>,
}

/// Slot arena backing the intrusive lists. Freed slots are reused LIFO.
#[derive(Debug)]
pub(crate) struct RecordArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> RecordArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn insert(&mut self, payload: T) -> RecordId {
        self.len += 1;
        let record = Some(Record::detached(payload));
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.record = record;
            return RecordId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len()).expect("record arena exceeds u32 slots");
        self.slots.push(Slot {
            generation: 0,
            record,
        });
        RecordId {
            index,
            generation: 0,
        }
    }

    /// Frees the slot. The record must already be detached.
    pub(crate) fn remove(&mut self, id: RecordId) -> Option<Record<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let record = slot.record.take()?;
        debug_assert!(record.cell.is_none(), "freeing an attached record");
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(record)
    }

    pub(crate) fn get(&self, id: RecordId) -> Option<&Record<T>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.record.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: RecordId) -> Option<&mut Record<T>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.record.as_mut()
    }

    /// Live record at `index`. Only called with indices reached through
    /// list links, which always point at live records.
    #[inline(always)]
    pub(crate) fn slot(&self, index: u32) -> &Record<T> {
        self.slots[index as usize]
            .record
            .as_ref()
            .expect("linked record slot is vacant")
    }

    #[inline(always)]
    pub(crate) fn slot_mut(&mut self, index: u32) -> &mut Record<T> {
        self.slots[index as usize]
            .record
            .as_mut()
            .expect("linked record slot is vacant")
    }

    #[inline(always)]
    pub(crate) fn id_of(&self, index: u32) -> RecordId {
        RecordId {
            index,
            generation: self.slots[index as usize].generation,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (RecordId, &Record<T>)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record.as_ref().map(|record| {
                (
                    RecordId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    record,
                )
            })
        })
    }

    /// Drops every record. Generations survive so old handles stay invalid.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.record.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index as u32);
        }
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::RecordArena;

    #[test]
    fn reused_slots_get_new_generations() {
        let mut arena = RecordArena::with_capacity(4);
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.len(), 2);

        let record = arena.remove(a).unwrap();
        assert_eq!(record.payload, "a");
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());

        let c = arena.insert("c");
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c).unwrap().payload, "c");
        assert_eq!(arena.get(b).unwrap().payload, "b");
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn clear_invalidates_handles() {
        let mut arena = RecordArena::with_capacity(0);
        let ids: Vec<_> = (0..5).map(|i| arena.insert(i)).collect();
        arena.clear();
        assert!(arena.is_empty());
        assert!(ids.iter().all(|id| arena.get(*id).is_none()));
        assert_eq!(arena.iter().count(), 0);

        // Slots are reused lowest index first after a clear.
        let fresh = arena.insert(10);
        assert_eq!(fresh.index(), 0);
        assert_eq!(fresh.generation(), 1);
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut arena = RecordArena::with_capacity(0);
        let a = arena.insert(1);
        let b = arena.insert(2);
        let c = arena.insert(3);
        arena.remove(b);
        let seen: Vec<_> = arena.iter().map(|(id, r)| (id, r.payload)).collect();
        assert_eq!(seen, vec![(a, 1), (c, 3)]);
        let _ = arena.get_mut(a).map(|r| r.payload = 5);
        assert_eq!(arena.get(a).unwrap().payload, 5);
    }
}
