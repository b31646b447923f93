use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Kind of graphics resource the ledger tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Context,
    Geometry,
    Material,
}

/// Handle to a tracked graphics resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId {
    kind: ResourceKind,
    index: u64,
}

impl ResourceId {
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn index(&self) -> u64 {
        self.index
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.index)
    }
}

/// Live counts per resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveCounts {
    pub contexts: usize,
    pub geometries: usize,
    pub materials: usize,
}

impl LiveCounts {
    pub fn total(&self) -> usize {
        self.contexts + self.geometries + self.materials
    }
}

/// Records every allocation and release so teardown can be checked for leaks
/// and double frees. Releasing a handle twice is ignored and reported.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    next_index: u64,
    live: HashSet<ResourceId>,
    allocated: u64,
    released: u64,
    rejected: u64,
}

pub type SharedLedger = Rc<RefCell<ResourceLedger>>;

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedLedger {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn allocate(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId {
            kind,
            index: self.next_index,
        };
        self.next_index += 1;
        self.allocated += 1;
        self.live.insert(id);
        id
    }

    /// Returns false if the handle was never allocated or already released
    pub fn release(&mut self, id: ResourceId) -> bool {
        if self.live.remove(&id) {
            self.released += 1;
            true
        } else {
            self.rejected += 1;
            log::warn!("Ignoring release of {} (not live)", id);
            false
        }
    }

    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains(&id)
    }

    pub fn counts(&self) -> LiveCounts {
        let mut counts = LiveCounts::default();
        for id in &self.live {
            match id.kind {
                ResourceKind::Context => counts.contexts += 1,
                ResourceKind::Geometry => counts.geometries += 1,
                ResourceKind::Material => counts.materials += 1,
            }
        }
        counts
    }

    pub fn live_total(&self) -> usize {
        self.live.len()
    }

    pub fn allocated_total(&self) -> u64 {
        self.allocated
    }

    pub fn released_total(&self) -> u64 {
        self.released
    }

    /// Releases that were refused because the handle was not live
    pub fn rejected_total(&self) -> u64 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_then_release_returns_to_zero() {
        let mut ledger = ResourceLedger::new();
        let ctx = ledger.allocate(ResourceKind::Context);
        let geo = ledger.allocate(ResourceKind::Geometry);
        let mat = ledger.allocate(ResourceKind::Material);

        assert_eq!(
            ledger.counts(),
            LiveCounts {
                contexts: 1,
                geometries: 1,
                materials: 1
            }
        );

        assert!(ledger.release(geo));
        assert!(ledger.release(mat));
        assert!(ledger.release(ctx));
        assert_eq!(ledger.live_total(), 0);
        assert_eq!(ledger.allocated_total(), ledger.released_total());
    }

    #[test]
    fn double_release_is_rejected() {
        let mut ledger = ResourceLedger::new();
        let geo = ledger.allocate(ResourceKind::Geometry);
        assert!(ledger.release(geo));
        assert!(!ledger.release(geo));
        assert_eq!(ledger.released_total(), 1);
        assert_eq!(ledger.rejected_total(), 1);
    }

    #[test]
    fn handles_are_unique() {
        let mut ledger = ResourceLedger::new();
        let a = ledger.allocate(ResourceKind::Geometry);
        let b = ledger.allocate(ResourceKind::Geometry);
        assert_ne!(a, b);
        assert_eq!(a.kind(), ResourceKind::Geometry);
        assert_eq!(format!("{}", a), "Geometry#0");
    }
}
