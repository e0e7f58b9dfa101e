/*!
Occurrence lists of clause watchers, indexed by literal.

A [Watcher] pairs the watching clause with a blocker literal: some other
literal of the clause whose truth lets propagation skip the clause without
touching the arena.

Detaching a clause is lazy by default: the lists holding its watchers are
[smudged](OccLists::smudge) and stale entries are purged on the next
[clean](OccLists::clean_all). Cleaning is idempotent, so a clause may be
freed long before its watchers are swept.

Three instances are kept by the solver: binary clauses, long clauses, and
the single-watch purgatory for imported clauses.
*/

use crate::db::arena::{CRef, ClauseAllocator};
use crate::structures::literal::Literal;

/// A clause watching a literal, with a blocker hint.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Watcher {
    pub clause: CRef,
    pub blocker: Literal,
}

impl Watcher {
    pub fn new(clause: CRef, blocker: Literal) -> Self {
        Watcher { clause, blocker }
    }
}

/// Per-literal watcher lists with lazy removal.
#[derive(Default)]
pub struct OccLists {
    lists: Vec<Vec<Watcher>>,
    dirty: Vec<bool>,
    dirties: Vec<Literal>,
}

impl OccLists {
    /// Make room for both literals of a fresh atom.
    pub fn init_atom(&mut self) {
        self.lists.push(Vec::new());
        self.lists.push(Vec::new());
        self.dirty.push(false);
        self.dirty.push(false);
    }

    /// The watchers of `literal`.
    pub fn occs(&self, literal: Literal) -> &[Watcher] {
        &self.lists[literal.index()]
    }

    /// The watchers of `literal`, mutably.
    pub fn occs_mut(&mut self, literal: Literal) -> &mut Vec<Watcher> {
        &mut self.lists[literal.index()]
    }

    /// Detach the list of `literal` for in-place rewriting.
    ///
    /// Propagation iterates a list while moving watchers to *other* lists;
    /// taking the list out makes the disjointness plain. The (possibly
    /// filtered) list must be returned with [put_back](OccLists::put_back).
    pub fn take(&mut self, literal: Literal) -> Vec<Watcher> {
        std::mem::take(&mut self.lists[literal.index()])
    }

    /// Return a list detached by [take](OccLists::take).
    pub fn put_back(&mut self, literal: Literal, list: Vec<Watcher>) {
        debug_assert!(self.lists[literal.index()].is_empty());
        self.lists[literal.index()] = list;
    }

    /// Remove the watcher of `clause` from the list of `literal`, now.
    pub fn remove(&mut self, literal: Literal, clause: CRef) {
        let list = &mut self.lists[literal.index()];
        if let Some(at) = list.iter().position(|w| w.clause == clause) {
            list.remove(at);
        }
    }

    /// Note that the list of `literal` holds watchers of removed clauses.
    pub fn smudge(&mut self, literal: Literal) {
        if !self.dirty[literal.index()] {
            self.dirty[literal.index()] = true;
            self.dirties.push(literal);
        }
    }

    /// Purge watchers of removed clauses from every smudged list.
    pub fn clean_all(&mut self, arena: &ClauseAllocator) {
        let dirties = std::mem::take(&mut self.dirties);
        for literal in dirties {
            // A list may have been cleaned through an explicit remove.
            if self.dirty[literal.index()] {
                self.lists[literal.index()].retain(|w| !arena.removed(w.clause));
                self.dirty[literal.index()] = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::clause::ClauseSource;

    fn setup(atoms: usize) -> OccLists {
        let mut occs = OccLists::default();
        for _ in 0..atoms {
            occs.init_atom();
        }
        occs
    }

    #[test]
    fn push_and_remove() {
        let mut occs = setup(2);
        let p = Literal::new(0, true);
        let mut arena = ClauseAllocator::default();
        let c = arena.alloc(&[p, Literal::new(1, false)], ClauseSource::Original);

        occs.occs_mut(p).push(Watcher::new(c, Literal::new(1, false)));
        assert_eq!(occs.occs(p).len(), 1);

        occs.remove(p, c);
        assert!(occs.occs(p).is_empty());
    }

    #[test]
    fn smudge_then_clean_is_idempotent() {
        let mut occs = setup(2);
        let p = Literal::new(0, true);
        let mut arena = ClauseAllocator::default();
        let dead = arena.alloc(&[p, Literal::new(1, true)], ClauseSource::Original);
        let live = arena.alloc(&[p, Literal::new(1, false)], ClauseSource::Original);

        occs.occs_mut(p).push(Watcher::new(dead, Literal::new(1, true)));
        occs.occs_mut(p).push(Watcher::new(live, Literal::new(1, false)));
        arena.free(dead);

        occs.smudge(p);
        occs.smudge(p);
        occs.clean_all(&arena);
        assert_eq!(occs.occs(p).len(), 1);
        assert_eq!(occs.occs(p)[0].clause, live);

        occs.clean_all(&arena);
        assert_eq!(occs.occs(p).len(), 1);
    }
}
