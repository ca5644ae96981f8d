//! Chain: doubly-linked list over a generational node arena, with a cursor
//! that can remove the node it points at.

use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key naming one node of a `Chain`.
    pub(crate) struct NodeKey;
}

#[derive(Clone, Debug)]
struct Node<T> {
    payload: T,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

/// An ordered sequence of owned payloads with O(1) insertion and removal at
/// both ends.
///
/// Nodes live in a per-chain slot map and link to each other by key, so a
/// chain never hands out pointers into itself. `len() == 0` exactly when
/// there is neither a head nor a tail.
#[derive(Clone)]
pub struct Chain<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    head: Option<NodeKey>,
    tail: Option<NodeKey>,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Insert `payload` in front of the current head.
    pub fn push(&mut self, payload: T) {
        let old_head = self.head;
        let k = self.nodes.insert(Node {
            payload,
            prev: None,
            next: old_head,
        });
        match old_head {
            Some(h) => self.nodes[h].prev = Some(k),
            None => self.tail = Some(k),
        }
        self.head = Some(k);
    }

    /// Remove and return the head payload, or `None` if the chain is empty.
    pub fn pop(&mut self) -> Option<T> {
        let k = self.head?;
        self.unlink(k)
    }

    /// Insert `payload` after the current tail.
    pub fn append(&mut self, payload: T) {
        let old_tail = self.tail;
        let k = self.nodes.insert(Node {
            payload,
            prev: old_tail,
            next: None,
        });
        match old_tail {
            Some(t) => self.nodes[t].next = Some(k),
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    /// Remove and return the tail payload, or `None` if the chain is empty.
    pub fn slice(&mut self) -> Option<T> {
        let k = self.tail?;
        self.unlink(k)
    }

    pub fn front(&self) -> Option<&T> {
        self.head.map(|k| &self.nodes[k].payload)
    }

    pub fn back(&self) -> Option<&T> {
        self.tail.map(|k| &self.nodes[k].payload)
    }

    /// Tear the chain down, handing every remaining payload to `dispose`
    /// exactly once, head first.
    ///
    /// Pass `|_| {}` to release only the structure; dropping the chain
    /// instead drops each payload in place.
    pub fn destroy<F>(mut self, mut dispose: F)
    where
        F: FnMut(T),
    {
        while let Some(payload) = self.pop() {
            dispose(payload);
        }
        debug_assert!(self.head.is_none() && self.tail.is_none());
    }

    /// Head-to-tail iterator over shared payloads.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            at: self.head,
            remaining: self.len(),
        }
    }

    /// Iterator over mutable payloads. Visit order is unspecified.
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            it: self.nodes.iter_mut(),
        }
    }

    /// Cursor positioned at the head, or invalid if the chain is empty.
    pub fn cursor(&mut self) -> ChainCursor<'_, T> {
        let at = self.head;
        ChainCursor { chain: self, at }
    }

    pub(crate) fn head_key(&self) -> Option<NodeKey> {
        self.head
    }

    pub(crate) fn next_key(&self, k: NodeKey) -> Option<NodeKey> {
        self.nodes.get(k).and_then(|n| n.next)
    }

    #[cfg(test)]
    pub(crate) fn prev_key(&self, k: NodeKey) -> Option<NodeKey> {
        self.nodes.get(k).and_then(|n| n.prev)
    }

    pub(crate) fn get(&self, k: NodeKey) -> Option<&T> {
        self.nodes.get(k).map(|n| &n.payload)
    }

    pub(crate) fn get_mut(&mut self, k: NodeKey) -> Option<&mut T> {
        self.nodes.get_mut(k).map(|n| &mut n.payload)
    }

    /// Swap the payload stored at `k`, keeping the node and its links.
    pub(crate) fn replace(&mut self, k: NodeKey, payload: T) -> T {
        mem::replace(&mut self.nodes[k].payload, payload)
    }

    /// First node, scanning from the head, whose payload satisfies `pred`.
    pub(crate) fn position<P>(&self, mut pred: P) -> Option<NodeKey>
    where
        P: FnMut(&T) -> bool,
    {
        let mut at = self.head;
        while let Some(k) = at {
            let node = &self.nodes[k];
            if pred(&node.payload) {
                return Some(k);
            }
            at = node.next;
        }
        None
    }

    /// Detach node `k`, splicing its neighbours together.
    pub(crate) fn unlink(&mut self, k: NodeKey) -> Option<T> {
        let node = self.nodes.remove(k)?;
        match node.prev {
            Some(p) => self.nodes[p].next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(n) => self.nodes[n].prev = node.prev,
            None => self.tail = node.prev,
        }
        Some(node.payload)
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Chain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Extend<T> for Chain<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for payload in iter {
            self.append(payload);
        }
    }
}

impl<T> FromIterator<T> for Chain<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut chain = Chain::new();
        chain.extend(iter);
        chain
    }
}

impl<'a, T> IntoIterator for &'a Chain<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Chain<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Head-to-tail iterator over a `Chain`.
pub struct Iter<'a, T> {
    chain: &'a Chain<T>,
    at: Option<NodeKey>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.at?;
        let chain = self.chain;
        let node = &chain.nodes[k];
        self.at = node.next;
        self.remaining -= 1;
        Some(&node.payload)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over mutable payloads of a `Chain`, in arena order.
pub struct IterMut<'a, T> {
    it: slotmap::basic::IterMut<'a, NodeKey, Node<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, n)| &mut n.payload)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// A position inside a `Chain` that can read, step forward and remove.
///
/// The cursor holds the chain mutably, so the chain cannot be changed
/// behind its back. Once it walks past the tail it stays invalid until
/// `rewind`.
pub struct ChainCursor<'a, T> {
    chain: &'a mut Chain<T>,
    at: Option<NodeKey>,
}

impl<'a, T> ChainCursor<'a, T> {
    pub fn is_valid(&self) -> bool {
        self.at.is_some()
    }

    /// Step to the successor. Returns whether the cursor still points at a
    /// node afterwards.
    pub fn advance(&mut self) -> bool {
        let Some(k) = self.at else {
            return false;
        };
        self.at = self.chain.next_key(k);
        self.at.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.at.and_then(|k| self.chain.get(k))
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        let k = self.at?;
        self.chain.get_mut(k)
    }

    /// Detach the current node and return its payload.
    ///
    /// The cursor moves to the successor if there is one, else to the
    /// predecessor (the new tail), else it becomes invalid because the
    /// chain is now empty.
    pub fn take(&mut self) -> Option<T> {
        let k = self.at?;
        let (prev, next) = {
            let node = &self.chain.nodes[k];
            (node.prev, node.next)
        };
        let payload = self.chain.unlink(k)?;
        self.at = next.or(prev);
        Some(payload)
    }

    /// Like [`take`](Self::take) but hands the payload to `dispose`.
    /// Returns true iff the chain still has elements. An invalid cursor
    /// removes nothing and returns false.
    pub fn remove<F>(&mut self, dispose: F) -> bool
    where
        F: FnOnce(T),
    {
        match self.take() {
            Some(payload) => {
                dispose(payload);
                !self.chain.is_empty()
            }
            None => false,
        }
    }

    pub fn rewind(&mut self) {
        self.at = self.chain.head;
    }

    #[cfg(test)]
    fn position(&self) -> Option<NodeKey> {
        self.at
    }
}
