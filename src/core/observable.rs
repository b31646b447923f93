use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug)]
struct Slot<T: Copy> {
    value: Cell<T>,
    version: Cell<u64>,
}

/// Single-writer value shared with any number of readers on the event-loop thread.
///
/// The [`Publisher`] half is not `Clone`, so exactly one owner can write.
/// Readers hold a [`Watch`] and observe the latest value plus a version counter
/// that bumps on every change.
pub fn observable<T: Copy + PartialEq>(initial: T) -> (Publisher<T>, Watch<T>) {
    let slot = Rc::new(Slot {
        value: Cell::new(initial),
        version: Cell::new(0),
    });
    (Publisher { slot: slot.clone() }, Watch { slot })
}

#[derive(Debug)]
pub struct Publisher<T: Copy> {
    slot: Rc<Slot<T>>,
}

impl<T: Copy + PartialEq> Publisher<T> {
    /// Store a new value. Returns true when it differs from the previous one.
    pub fn publish(&self, value: T) -> bool {
        if self.slot.value.get() == value {
            return false;
        }
        self.slot.value.set(value);
        self.slot.version.set(self.slot.version.get() + 1);
        true
    }

    pub fn get(&self) -> T {
        self.slot.value.get()
    }

    pub fn watch(&self) -> Watch<T> {
        Watch {
            slot: self.slot.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Watch<T: Copy> {
    slot: Rc<Slot<T>>,
}

impl<T: Copy> Watch<T> {
    pub fn get(&self) -> T {
        self.slot.value.get()
    }

    pub fn version(&self) -> u64 {
        self.slot.version.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readers_see_published_value() {
        let (tx, rx) = observable(0.0f32);
        let rx2 = rx.clone();
        assert!(tx.publish(0.25));
        assert_eq!(rx.get(), 0.25);
        assert_eq!(rx2.get(), 0.25);
    }

    #[test]
    fn version_only_moves_on_change() {
        let (tx, rx) = observable(1u32);
        assert_eq!(rx.version(), 0);
        assert!(!tx.publish(1));
        assert_eq!(rx.version(), 0);
        assert!(tx.publish(2));
        assert_eq!(rx.version(), 1);
    }

    #[test]
    fn watch_from_publisher_shares_slot() {
        let (tx, _rx) = observable(false);
        let late = tx.watch();
        tx.publish(true);
        assert!(late.get());
    }
}
