//! # Registration Registry
//!
//! In-memory table of live workflows keyed by a random id.
//!
//! Entries are volatile: nothing survives a restart, and an entry is
//! removed as soon as its workflow is submitted or abandoned. A client that
//! navigates away never says so, so entries idle for longer than the TTL
//! are dropped as well.

use enroll_core::{EnrollError, Workflow};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Idle time after which an untouched registration is dropped.
pub const DEFAULT_REGISTRATION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry {
    workflow: Workflow,
    touched: Instant,
}

/// Live registrations.
#[derive(Debug)]
pub struct Registry {
    workflows: BTreeMap<Uuid, Entry>,
    /// `None` keeps entries until they are discarded explicitly.
    ttl: Option<Duration>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_ttl(Some(DEFAULT_REGISTRATION_TTL))
    }
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        Self {
            workflows: BTreeMap::new(),
            ttl,
        }
    }

    /// Start a new workflow and return its id. Idle entries are swept first.
    pub fn start(&mut self) -> Uuid {
        let now = Instant::now();
        self.expire_idle(now);

        let id = Uuid::new_v4();
        self.workflows.insert(
            id,
            Entry {
                workflow: Workflow::new(),
                touched: now,
            },
        );
        id
    }

    pub fn get(&self, id: &Uuid) -> Result<&Workflow, EnrollError> {
        let now = Instant::now();
        self.workflows
            .get(id)
            .filter(|entry| !self.is_idle(entry, now))
            .map(|entry| &entry.workflow)
            .ok_or_else(|| not_found(id))
    }

    /// Mutable access. Counts as activity and refreshes the entry.
    pub fn get_mut(&mut self, id: &Uuid) -> Result<&mut Workflow, EnrollError> {
        let now = Instant::now();
        let idle = self
            .workflows
            .get(id)
            .is_some_and(|entry| self.is_idle(entry, now));
        if idle {
            self.workflows.remove(id);
        }

        let entry = self.workflows.get_mut(id).ok_or_else(|| not_found(id))?;
        entry.touched = now;
        Ok(&mut entry.workflow)
    }

    /// Remove a workflow, returning it.
    pub fn discard(&mut self, id: &Uuid) -> Result<Workflow, EnrollError> {
        self.workflows
            .remove(id)
            .map(|entry| entry.workflow)
            .ok_or_else(|| not_found(id))
    }

    /// Drop every entry idle for longer than the TTL as of `now`. Returns
    /// how many were dropped.
    pub fn expire_idle(&mut self, now: Instant) -> usize {
        let Some(ttl) = self.ttl else {
            return 0;
        };
        let before = self.workflows.len();
        self.workflows
            .retain(|_, entry| now.saturating_duration_since(entry.touched) <= ttl);
        before - self.workflows.len()
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }

    fn is_idle(&self, entry: &Entry, now: Instant) -> bool {
        self.ttl
            .is_some_and(|ttl| now.saturating_duration_since(entry.touched) > ttl)
    }
}

fn not_found(id: &Uuid) -> EnrollError {
    EnrollError::SessionNotFound(id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use enroll_core::Stage;

    #[test]
    fn start_get_discard() {
        let mut registry = Registry::new();
        let id = registry.start();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&id).expect("get").stage(),
            Stage::Identification
        );

        registry.discard(&id).expect("discard");
        assert!(registry.is_empty());
        assert_eq!(
            registry.get(&id).map(|_| ()),
            Err(EnrollError::SessionNotFound(id.to_string()))
        );
    }

    #[test]
    fn ids_are_distinct() {
        let mut registry = Registry::new();
        let a = registry.start();
        let b = registry.start();
        assert_ne!(a, b);
    }

    #[test]
    fn idle_entries_expire() {
        let ttl = Duration::from_secs(60);
        let mut registry = Registry::with_ttl(Some(ttl));
        let id = registry.start();

        assert_eq!(registry.expire_idle(Instant::now()), 0);
        assert_eq!(registry.len(), 1);

        let later = Instant::now() + ttl + Duration::from_secs(1);
        assert_eq!(registry.expire_idle(later), 1);
        assert!(registry.is_empty());
        assert!(registry.get(&id).is_err());
    }

    #[test]
    fn abandoned_starts_do_not_accumulate() {
        let mut registry = Registry::with_ttl(Some(Duration::ZERO));
        for _ in 0..1_000 {
            registry.start();
            std::thread::sleep(Duration::from_micros(1));
        }
        // Each start sweeps everything before it once the clock has moved.
        assert!(registry.len() < 1_000);
    }

    #[test]
    fn activity_refreshes_entry() {
        let ttl = Duration::from_secs(60);
        let mut registry = Registry::with_ttl(Some(ttl));
        let started = Instant::now();
        let id = registry.start();

        std::thread::sleep(Duration::from_millis(50));
        registry.get_mut(&id).expect("still live");

        // Past the TTL measured from the start, within it from the edit.
        let check = started + ttl + Duration::from_millis(10);
        assert_eq!(registry.expire_idle(check), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn no_ttl_keeps_entries() {
        let mut registry = Registry::with_ttl(None);
        let id = registry.start();

        let far = Instant::now() + Duration::from_secs(24 * 60 * 60);
        assert_eq!(registry.expire_idle(far), 0);
        assert!(registry.get(&id).is_ok());
    }
}
