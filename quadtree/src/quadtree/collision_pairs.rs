use super::placement::{child_index, parent_index};
use super::stack::AncestorStack;
use super::{CollisionPair, RecordId, SpatialIndex};

impl<T> SpatialIndex<T> {
    /// Calls `f` once for every candidate pair: records sharing a node, and
    /// records whose nodes are ancestor and descendant of each other. The
    /// first handle is the one at the deeper (or same) node.
    pub fn for_each_collision_pair<F>(&self, mut f: F)
    where
        F: FnMut(RecordId, RecordId),
    {
        let records = &self.records;
        self.for_each_slot_pair(&mut |a, b| f(records.id_of(a), records.id_of(b)));
    }

    pub fn collision_pairs(&self) -> Vec<CollisionPair> {
        let mut pairs = Vec::new();
        self.for_each_collision_pair(|a, b| pairs.push(CollisionPair { a, b }));
        pairs
    }

    /// Candidate pairs as payload references.
    pub fn all_pairs(&self) -> Vec<(&T, &T)> {
        let records = &self.records;
        let mut pairs = Vec::new();
        self.for_each_slot_pair(&mut |a, b| {
            pairs.push((&records.slot(a).payload, &records.slot(b).payload))
        });
        pairs
    }

    /// Calls `f` with every record that forms a candidate pair with `id`:
    /// members of its own node, of every ancestor node and of every node in
    /// its subtree. Detached and unknown records have no pairs.
    pub fn for_each_pair_with<F>(&self, id: RecordId, mut f: F)
    where
        F: FnMut(RecordId),
    {
        let Some(index) = self.cell_of(id) else {
            return;
        };
        let records = &self.records;
        let mut emit = |slot: u32| f(records.id_of(slot));

        let mut ancestor = parent_index(index);
        while let Some(node) = ancestor {
            if let Some(cell) = self.cells[node] {
                self.members(cell.head).for_each(&mut emit);
            }
            ancestor = parent_index(node);
        }

        if let Some(cell) = self.cells[index] {
            self.members(cell.head)
                .filter(|slot| *slot != id.index)
                .for_each(&mut emit);
        }

        for quadrant in 0..4 {
            self.visit_subtree(child_index(index, quadrant), &mut emit);
        }
    }

    /// Payloads of every record paired with `id`.
    pub fn pairs_for(&self, id: RecordId) -> Vec<&T> {
        let records = &self.records;
        let mut out = Vec::new();
        self.for_each_pair_with(id, |other| {
            out.push(&records.slot(other.index).payload);
        });
        out
    }

    fn for_each_slot_pair<F>(&self, emit: &mut F)
    where
        F: FnMut(u32, u32),
    {
        if !self.has_cell(0) {
            return;
        }
        let depth = self.region.level() as usize + 1;
        let mut stack = AncestorStack::with_capacity(depth * 4);
        self.visit(0, &mut stack, emit);
        debug_assert!(stack.is_empty(), "ancestor stack not unwound");
    }

    fn visit<F>(&self, node: usize, stack: &mut AncestorStack, emit: &mut F)
    where
        F: FnMut(u32, u32),
    {
        let Some(cell) = self.cells[node] else {
            return;
        };

        for a in self.members(cell.head) {
            for b in self.members(self.records.slot(a).next) {
                emit(a, b);
            }
            for &b in stack.as_slice() {
                emit(a, b);
            }
        }

        let entry_depth = stack.len();
        let mut pushed = 0usize;
        let mut descended = false;
        for quadrant in 0..4 {
            let child = child_index(node, quadrant);
            if !self.has_cell(child) {
                continue;
            }
            if !descended {
                descended = true;
                for member in self.members(cell.head) {
                    stack.push(member);
                    pushed += 1;
                }
            }
            self.visit(child, stack, emit);
        }
        stack.pop_n(pushed);
        debug_assert_eq!(stack.len(), entry_depth);
    }

    fn visit_subtree<F>(&self, node: usize, emit: &mut F)
    where
        F: FnMut(u32),
    {
        let Some(cell) = self.cells.get(node).copied().flatten() else {
            return;
        };
        self.members(cell.head).for_each(&mut *emit);
        for quadrant in 0..4 {
            self.visit_subtree(child_index(node, quadrant), emit);
        }
    }
}
