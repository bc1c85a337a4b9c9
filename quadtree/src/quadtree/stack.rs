use smallvec::SmallVec;

/// Members of the nodes above the one being visited, as arena slot indices.
///
/// Pushes and pops mirror the traversal's descent and return, so the depth
/// stays bounded by tree level times node population along one path.
#[derive(Debug, Default, Clone)]
pub(crate) struct AncestorStack {
    entries: SmallVec<[u32; 64]>,
}

impl AncestorStack {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, slot: u32) {
        self.entries.push(slot);
    }

    #[inline(always)]
    pub(crate) fn pop(&mut self) -> Option<u32> {
        self.entries.pop()
    }

    /// Pops `count` entries, fewer if the stack runs out.
    pub(crate) fn pop_n(&mut self, count: usize) {
        for _ in 0..count {
            if self.pop().is_none() {
                break;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn peek(&self) -> Option<u32> {
        self.entries.last().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline(always)]
    pub(crate) fn as_slice(&self) -> &[u32] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::AncestorStack;

    #[test]
    fn push_pop_peek() {
        let mut stack = AncestorStack::default();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.peek(), None);

        stack.push(3);
        stack.push(7);
        assert_eq!(stack.peek(), Some(7));
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.as_slice(), &[3, 7]);
        assert_eq!(stack.pop(), Some(7));
        assert_eq!(stack.peek(), Some(3));
    }

    #[test]
    fn pop_n_restores_previous_depth() {
        let mut stack = AncestorStack::with_capacity(4);
        stack.push(1);
        let depth = stack.len();
        for slot in 10..110 {
            stack.push(slot);
        }
        stack.pop_n(100);
        assert_eq!(stack.len(), depth);
        stack.pop_n(5);
        assert!(stack.is_empty());
    }
}
