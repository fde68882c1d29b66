//! Graph-level events with one-tick deferred delivery.
//!
//! Events raised during tick N are appended to a pending list. At the start of
//! tick N+1 the pending list becomes the active list (and the old active list
//! is discarded), so every event is observable for exactly one tick, one tick
//! after it was raised.

/// Double-buffered event lists plus the reference-counted set of event names
/// the graph listens for.
#[derive(Debug, Default)]
pub struct GraphEvents {
    registered: Vec<(String, u32)>,
    pending: Vec<String>,
    active: Vec<String>,
}

impl GraphEvents {
    /// Creates empty lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `name` for the next tick. Raising the same name twice before the
    /// next tick queues it once.
    pub fn trigger(&mut self, name: &str) {
        if !self.pending.iter().any(|e| e == name) {
            self.pending.push(name.to_string());
        }
    }

    /// Promotes the pending list to active. Called once at the start of a tick.
    pub fn advance(&mut self) {
        self.active.clear();
        core::mem::swap(&mut self.active, &mut self.pending);
    }

    /// Returns true if `name` is in the active list.
    pub fn is_active(&self, name: &str) -> bool {
        self.active.iter().any(|e| e == name)
    }

    /// The active list.
    pub fn active(&self) -> &[String] {
        &self.active
    }

    /// The pending list.
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Registers interest in `name`. Returns the new reference count.
    pub fn register(&mut self, name: &str) -> u32 {
        match self.registered.binary_search_by(|(n, _)| n.as_str().cmp(name)) {
            Ok(idx) => {
                self.registered[idx].1 += 1;
                self.registered[idx].1
            }
            Err(idx) => {
                self.registered.insert(idx, (name.to_string(), 1));
                1
            }
        }
    }

    /// Drops one reference to `name`. Returns the remaining count, or `None`
    /// if the name is not registered.
    pub fn unregister(&mut self, name: &str) -> Option<u32> {
        let idx = self
            .registered
            .binary_search_by(|(n, _)| n.as_str().cmp(name))
            .ok()?;
        self.registered[idx].1 -= 1;
        let remaining = self.registered[idx].1;
        if remaining == 0 {
            self.registered.remove(idx);
        }
        Some(remaining)
    }

    /// Registered event names, sorted.
    pub fn registered(&self) -> impl Iterator<Item = &str> {
        self.registered.iter().map(|(n, _)| n.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_is_active_for_one_tick_after_raise() {
        let mut events = GraphEvents::new();

        events.advance(); // start of tick 1
        events.trigger("bounce");
        assert!(!events.is_active("bounce"));

        events.advance(); // start of tick 2
        assert!(events.is_active("bounce"));
        assert_eq!(events.active().len(), 1);

        events.advance(); // start of tick 3
        assert!(!events.is_active("bounce"));
    }

    #[test]
    fn duplicate_raise_is_delivered_once() {
        let mut events = GraphEvents::new();
        events.trigger("a");
        events.trigger("a");
        events.trigger("b");
        events.advance();
        assert_eq!(events.active(), ["a".to_string(), "b".to_string()]);
        assert!(events.pending().is_empty());
    }

    #[test]
    fn registration_is_counted() {
        let mut events = GraphEvents::new();
        assert_eq!(events.register("sing"), 1);
        assert_eq!(events.register("sing"), 2);
        assert_eq!(events.unregister("sing"), Some(1));
        assert_eq!(events.unregister("sing"), Some(0));
        assert_eq!(events.unregister("sing"), None);
        assert_eq!(events.registered().count(), 0);
    }
}
