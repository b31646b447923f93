use crate::traits::MotionPreference;

/// Token returned by [`ReducedMotion::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(bool)>;

/// Reduced-motion flag, seeded from preference sources and updated when the
/// preference changes. Listeners run only on an actual change.
pub struct ReducedMotion {
    reduced: bool,
    /// Last value the sources agreed on; a manual override stays until this changes
    sourced: bool,
    next_id: u64,
    listeners: Vec<(Subscription, Listener)>,
}

impl ReducedMotion {
    pub fn new(reduced: bool) -> Self {
        Self {
            reduced,
            sourced: reduced,
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// First source with an opinion wins; no opinion means full motion
    pub fn from_sources(sources: &[&dyn MotionPreference]) -> Self {
        Self::new(Self::resolve(sources))
    }

    fn resolve(sources: &[&dyn MotionPreference]) -> bool {
        for source in sources {
            if let Some(reduced) = source.prefers_reduced_motion() {
                log::info!("Reduced motion {} (from {})", if reduced { "on" } else { "off" }, source.name());
                return reduced;
            }
        }
        false
    }

    pub fn is_reduced(&self) -> bool {
        self.reduced
    }

    /// Store a new value; returns true and notifies listeners if it changed
    pub fn set(&mut self, reduced: bool) -> bool {
        if reduced == self.reduced {
            return false;
        }
        self.reduced = reduced;
        for (_, listener) in self.listeners.iter_mut() {
            listener(reduced);
        }
        true
    }

    pub fn toggle(&mut self) -> bool {
        self.set(!self.reduced)
    }

    /// Query the sources again, e.g. when the window regains focus.
    /// Returns the new value only if the sources changed their answer, so a
    /// manual toggle survives a re-check that finds nothing new.
    pub fn poll_sources(&mut self, sources: &[&dyn MotionPreference]) -> Option<bool> {
        let resolved = Self::resolve(sources);
        if resolved == self.sourced {
            return None;
        }
        self.sourced = resolved;
        Some(resolved)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(bool) + 'static) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already removed
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for ReducedMotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReducedMotion")
            .field("reduced", &self.reduced)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FixedPreference;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn first_opinion_wins() {
        let silent = FixedPreference { name: "config", value: None };
        let cli = FixedPreference { name: "cli", value: Some(true) };
        let env = FixedPreference { name: "env", value: Some(false) };
        let detector = ReducedMotion::from_sources(&[&silent, &cli, &env]);
        assert!(detector.is_reduced());
    }

    #[test]
    fn no_opinion_means_full_motion() {
        let silent = FixedPreference { name: "config", value: None };
        assert!(!ReducedMotion::from_sources(&[&silent]).is_reduced());
        assert!(!ReducedMotion::from_sources(&[]).is_reduced());
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut detector = ReducedMotion::new(false);
        let log = seen.clone();
        detector.subscribe(move |v| log.borrow_mut().push(v));

        assert!(!detector.set(false));
        assert!(detector.set(true));
        assert!(detector.toggle());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let hits = Rc::new(RefCell::new(0));
        let mut detector = ReducedMotion::new(false);
        let counter = hits.clone();
        let sub = detector.subscribe(move |_| *counter.borrow_mut() += 1);

        detector.toggle();
        assert!(detector.unsubscribe(sub));
        assert!(!detector.unsubscribe(sub));
        detector.toggle();

        assert_eq!(*hits.borrow(), 1);
        assert_eq!(detector.listener_count(), 0);
    }

    #[test]
    fn poll_sources_reports_only_changes() {
        let mut detector = ReducedMotion::new(false);
        let silent = FixedPreference { name: "env", value: None };
        let now_reduced = FixedPreference { name: "env", value: Some(true) };

        assert_eq!(detector.poll_sources(&[&silent]), None);
        assert_eq!(detector.poll_sources(&[&now_reduced]), Some(true));
        assert_eq!(detector.poll_sources(&[&now_reduced]), None);
        // polling never writes the flag itself
        assert!(!detector.is_reduced());
    }

    #[test]
    fn manual_toggle_survives_unchanged_sources() {
        let silent = FixedPreference { name: "env", value: None };
        let mut detector = ReducedMotion::from_sources(&[&silent]);
        detector.toggle();
        assert_eq!(detector.poll_sources(&[&silent]), None);
        assert!(detector.is_reduced());
    }
}
