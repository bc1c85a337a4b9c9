use super::{RecordId, SpatialIndex};
use crate::error::{QuadtreeError, QuadtreeResult};
use common::shapes::Rectangle;
use tracing::{debug, trace};

/// Walks one node's intrusive list from its head, yielding slot indices.
pub(crate) struct CellMembers<'a, T> {
    index: &'a SpatialIndex<T>,
    cursor: Option<u32>,
}

impl<T> Iterator for CellMembers<'_, T> {
    type Item = u32;

    #[inline(always)]
    fn next(&mut self) -> Option<u32> {
        let slot = self.cursor?;
        self.cursor = self.index.records.slot(slot).next;
        Some(slot)
    }
}

impl<T> SpatialIndex<T> {
    /// Adds a detached record owning `payload`.
    pub fn add_record(&mut self, payload: T) -> RecordId {
        self.records.insert(payload)
    }

    /// Detaches the record, frees its slot and hands the payload back.
    pub fn take_record(&mut self, id: RecordId) -> Option<T> {
        self.records.get(id)?;
        self.detach(id.index);
        self.records.remove(id).map(|record| record.payload)
    }

    pub fn contains_record(&self, id: RecordId) -> bool {
        self.records.get(id).is_some()
    }

    pub fn payload(&self, id: RecordId) -> Option<&T> {
        self.records.get(id).map(|record| &record.payload)
    }

    pub fn payload_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.records.get_mut(id).map(|record| &mut record.payload)
    }

    /// Node the record is registered at, `None` when detached or unknown.
    pub fn cell_of(&self, id: RecordId) -> Option<usize> {
        self.records
            .get(id)
            .and_then(|record| record.cell)
            .map(|cell| cell as usize)
    }

    pub fn is_registered(&self, id: RecordId) -> bool {
        self.cell_of(id).is_some()
    }

    /// Every live record with its payload, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &T)> + '_ {
        self.records.iter().map(|(id, record)| (id, &record.payload))
    }

    pub fn register(&mut self, id: RecordId, bounds: &Rectangle) -> QuadtreeResult<()> {
        self.register_extent(id, bounds.left, bounds.top, bounds.right, bounds.bottom)
    }

    /// Registers the record at the deepest node containing the box.
    ///
    /// Registering again at the node the record already occupies is a
    /// no-op. A record registered at another node must be removed first, or
    /// moved with [`relocate_extent`](Self::relocate_extent).
    pub fn register_extent(
        &mut self,
        id: RecordId,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> QuadtreeResult<()> {
        let current = self
            .records
            .get(id)
            .ok_or(QuadtreeError::UnknownRecord { id })?
            .cell;
        let index = self.placement_for(id, left, top, right, bottom)?;
        match current {
            Some(cell) if cell as usize == index => return Ok(()),
            Some(cell) => {
                return Err(QuadtreeError::RecordAttached {
                    id,
                    cell: cell as usize,
                })
            }
            None => {}
        }
        self.create_cell_chain(index);
        self.attach(id.index, index);
        trace!(%id, cell = index, "registered record");
        Ok(())
    }

    /// Detaches the record from its node. Unknown and detached records are
    /// ignored.
    pub fn remove(&mut self, id: RecordId) {
        if self.is_registered(id) {
            self.detach(id.index);
            trace!(%id, "removed record");
        }
    }

    pub fn relocate(&mut self, id: RecordId, bounds: &Rectangle) -> QuadtreeResult<()> {
        self.relocate_extent(id, bounds.left, bounds.top, bounds.right, bounds.bottom)
    }

    /// Moves the record to the node matching its new box, registering it if
    /// it was detached. On error the record stays where it was.
    pub fn relocate_extent(
        &mut self,
        id: RecordId,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> QuadtreeResult<()> {
        let current = self
            .records
            .get(id)
            .ok_or(QuadtreeError::UnknownRecord { id })?
            .cell;
        let index = self.placement_for(id, left, top, right, bottom)?;
        if current == Some(index as u32) {
            return Ok(());
        }
        self.detach(id.index);
        self.create_cell_chain(index);
        self.attach(id.index, index);
        trace!(%id, from = ?current, to = index, "relocated record");
        Ok(())
    }

    fn placement_for(
        &self,
        id: RecordId,
        left: f32,
        top: f32,
        right: f32,
        bottom: f32,
    ) -> QuadtreeResult<usize> {
        self.region
            .placement_index(left, top, right, bottom)
            .inspect_err(|err| debug!(%id, %err, "placement rejected"))
    }

    #[inline(always)]
    pub(crate) fn members(&self, head: Option<u32>) -> CellMembers<'_, T> {
        CellMembers {
            index: self,
            cursor: head,
        }
    }

    /// Pushes the record at the head of node `index`'s list.
    fn attach(&mut self, slot: u32, index: usize) {
        let cell = self.cells[index]
            .as_mut()
            .expect("cell chain created before attach");
        let old_head = cell.head.replace(slot);
        cell.len += 1;
        if let Some(head) = old_head {
            self.records.slot_mut(head).prev = Some(slot);
        }
        let record = self.records.slot_mut(slot);
        debug_assert!(record.cell.is_none(), "attaching an attached record");
        record.prev = None;
        record.next = old_head;
        record.cell = Some(index as u32);
    }

    /// Splices the record out of its node's list. O(1).
    fn detach(&mut self, slot: u32) {
        let record = self.records.slot_mut(slot);
        let Some(index) = record.cell.take() else {
            return;
        };
        let prev = record.prev.take();
        let next = record.next.take();
        if let Some(prev) = prev {
            self.records.slot_mut(prev).next = next;
        }
        if let Some(next) = next {
            self.records.slot_mut(next).prev = prev;
        }
        let cell = self.cells[index as usize]
            .as_mut()
            .expect("record attached to a missing cell");
        if cell.head == Some(slot) {
            cell.head = next;
        }
        cell.len -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quadtree::Config;

    fn index() -> SpatialIndex<&'static str> {
        SpatialIndex::new_with_config(
            Rectangle::new(0.0, 0.0, 100.0, 100.0),
            Config {
                level: 3,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn list(index: &SpatialIndex<&'static str>, cell: usize) -> Vec<&'static str> {
        let head = index.cells[cell].and_then(|cell| cell.head);
        index
            .members(head)
            .map(|slot| index.records.slot(slot).payload)
            .collect()
    }

    #[test]
    fn register_prepends_to_node_list() {
        let mut index = index();
        let a = index.add_record("a");
        let b = index.add_record("b");
        let c = index.add_record("c");
        for id in [a, b, c] {
            index.register_extent(id, 98.0, 98.0, 99.0, 99.0).unwrap();
        }
        assert_eq!(list(&index, 84), vec!["c", "b", "a"]);
        assert_eq!(index.cell_population(84), Some(3));
    }

    #[test]
    fn remove_splices_head_middle_and_tail() {
        let mut index = index();
        let ids: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|name| index.add_record(name))
            .collect();
        for id in &ids {
            index.register_extent(*id, 1.0, 1.0, 2.0, 2.0).unwrap();
        }
        let cell = index.cell_of(ids[0]).unwrap();
        assert_eq!(list(&index, cell), vec!["d", "c", "b", "a"]);

        index.remove(ids[2]);
        assert_eq!(list(&index, cell), vec!["d", "b", "a"]);
        index.remove(ids[3]);
        assert_eq!(list(&index, cell), vec!["b", "a"]);
        index.remove(ids[0]);
        assert_eq!(list(&index, cell), vec!["b"]);
        index.remove(ids[1]);
        assert!(list(&index, cell).is_empty());
        assert_eq!(index.cell_population(cell), Some(0));
        // Node stays materialised.
        assert!(index.has_cell(cell));

        let record = index.records.slot(ids[1].index);
        assert!(record.prev.is_none() && record.next.is_none() && record.cell.is_none());
    }

    #[test]
    fn register_twice_in_same_node_is_idempotent() {
        let mut index = index();
        let a = index.add_record("a");
        index.register_extent(a, 10.0, 10.0, 20.0, 20.0).unwrap();
        index.register_extent(a, 10.0, 10.0, 20.0, 20.0).unwrap();
        // Different box, same node.
        index.register_extent(a, 11.0, 11.0, 19.0, 19.0).unwrap();
        let cell = index.cell_of(a).unwrap();
        assert_eq!(list(&index, cell), vec!["a"]);
    }

    #[test]
    fn register_in_other_node_requires_remove() {
        let mut index = index();
        let a = index.add_record("a");
        index.register_extent(a, 98.0, 98.0, 99.0, 99.0).unwrap();
        assert_eq!(
            index.register_extent(a, 0.0, 0.0, 99.0, 99.0),
            Err(QuadtreeError::RecordAttached { id: a, cell: 84 })
        );
        index.remove(a);
        index.register_extent(a, 0.0, 0.0, 99.0, 99.0).unwrap();
        assert_eq!(index.cell_of(a), Some(0));
    }

    #[test]
    fn relocate_moves_between_nodes() {
        let mut index = index();
        let a = index.add_record("a");
        let b = index.add_record("b");
        index.relocate_extent(a, 98.0, 98.0, 99.0, 99.0).unwrap();
        index.register_extent(b, 98.0, 98.0, 99.0, 99.0).unwrap();
        assert_eq!(index.cell_of(a), Some(84));

        index.relocate_extent(a, 51.0, 0.0, 99.0, 48.0).unwrap();
        assert_eq!(index.cell_of(a), Some(2));
        assert_eq!(list(&index, 84), vec!["b"]);

        // Rejected move leaves the record in place.
        assert!(index.relocate_extent(a, 150.0, 0.0, 160.0, 10.0).is_err());
        assert_eq!(index.cell_of(a), Some(2));
    }

    #[test]
    fn take_record_detaches_and_invalidates() {
        let mut index = index();
        let a = index.add_record("a");
        let b = index.add_record("b");
        index.register_extent(a, 1.0, 1.0, 2.0, 2.0).unwrap();
        index.register_extent(b, 1.0, 1.0, 2.0, 2.0).unwrap();
        let cell = index.cell_of(a).unwrap();

        assert_eq!(index.take_record(a), Some("a"));
        assert_eq!(index.take_record(a), None);
        assert_eq!(list(&index, cell), vec!["b"]);
        assert_eq!(
            index.register_extent(a, 1.0, 1.0, 2.0, 2.0),
            Err(QuadtreeError::UnknownRecord { id: a })
        );
        index.remove(a);
        assert_eq!(index.len(), 1);
    }
}
