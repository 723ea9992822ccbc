//! In-flight load tracking.
//!
//! Every layer or point-series load is keyed by `(LoadKind, dataset_id)`.
//! Starting a load for a key cancels whatever load was running for it, and a
//! result may only be committed while its ticket is still the current one.
//! This is what keeps a slow response for an old selection from overwriting
//! the state of a newer one.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// The kind of per-dataset load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadKind {
    Layer,
    PointSeries,
}

impl LoadKind {
    pub const ALL: [LoadKind; 2] = [LoadKind::Layer, LoadKind::PointSeries];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadKind::Layer => "layer",
            LoadKind::PointSeries => "point_series",
        }
    }
}

impl fmt::Display for LoadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle given to a running load.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    kind: LoadKind,
    dataset_id: String,
    generation: u64,
    cancel: CancellationToken,
}

impl LoadTicket {
    pub fn kind(&self) -> LoadKind {
        self.kind
    }

    pub fn dataset_id(&self) -> &str {
        &self.dataset_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Token cancelled when the load is superseded or its dataset deselected.
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct Entry {
    generation: u64,
    cancel: CancellationToken,
}

/// Loads currently running, one per `(kind, dataset_id)`.
#[derive(Default)]
pub struct InFlightLoads {
    next_generation: u64,
    entries: HashMap<(LoadKind, String), Entry>,
}

impl InFlightLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new load, cancelling the previous one for the same key.
    pub fn start(&mut self, kind: LoadKind, dataset_id: &str) -> LoadTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        let cancel = CancellationToken::new();

        let previous = self.entries.insert(
            (kind, dataset_id.to_string()),
            Entry {
                generation,
                cancel: cancel.clone(),
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(
                kind = %kind,
                dataset_id = %dataset_id,
                superseded = previous.generation,
                "Superseding in-flight load"
            );
            previous.cancel.cancel();
        }

        LoadTicket {
            kind,
            dataset_id: dataset_id.to_string(),
            generation,
            cancel,
        }
    }

    /// Whether the ticket is still the live load for its key.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        !ticket.is_cancelled()
            && self
                .entries
                .get(&(ticket.kind, ticket.dataset_id.clone()))
                .map(|e| e.generation == ticket.generation)
                .unwrap_or(false)
    }

    /// Retire a ticket. Returns `true` if it was current, meaning its result
    /// may be committed.
    pub fn finish(&mut self, ticket: &LoadTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.entries
            .remove(&(ticket.kind, ticket.dataset_id.clone()));
        true
    }

    /// Cancel the load running for one key.
    pub fn cancel(&mut self, kind: LoadKind, dataset_id: &str) -> bool {
        match self.entries.remove(&(kind, dataset_id.to_string())) {
            Some(entry) => {
                entry.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancel every load running for a dataset. Returns how many were cancelled.
    pub fn cancel_dataset(&mut self, dataset_id: &str) -> usize {
        LoadKind::ALL
            .iter()
            .filter(|kind| self.cancel(**kind, dataset_id))
            .count()
    }

    pub fn cancel_all(&mut self) {
        for (_, entry) in self.entries.drain() {
            entry.cancel.cancel();
        }
    }

    pub fn contains(&self, kind: LoadKind, dataset_id: &str) -> bool {
        self.entries.contains_key(&(kind, dataset_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_load_supersedes_previous() {
        let mut loads = InFlightLoads::new();
        let first = loads.start(LoadKind::Layer, "waterlevel");
        let second = loads.start(LoadKind::Layer, "waterlevel");

        assert!(first.is_cancelled());
        assert!(!loads.is_current(&first));
        assert!(loads.is_current(&second));
        assert_eq!(loads.len(), 1);

        assert!(!loads.finish(&first));
        assert!(loads.finish(&second));
        assert!(loads.is_empty());
    }

    #[test]
    fn test_kinds_are_tracked_separately() {
        let mut loads = InFlightLoads::new();
        let layer = loads.start(LoadKind::Layer, "waterlevel");
        let series = loads.start(LoadKind::PointSeries, "waterlevel");

        assert!(loads.is_current(&layer));
        assert!(loads.is_current(&series));
        assert_eq!(loads.cancel_dataset("waterlevel"), 2);
        assert!(layer.is_cancelled());
        assert!(series.is_cancelled());
        assert!(!loads.finish(&layer));
    }

    #[test]
    fn test_finished_ticket_cannot_commit_twice() {
        let mut loads = InFlightLoads::new();
        let ticket = loads.start(LoadKind::PointSeries, "discharge");
        assert!(loads.finish(&ticket));
        assert!(!loads.finish(&ticket));
        assert!(!loads.contains(LoadKind::PointSeries, "discharge"));
    }

    #[test]
    fn test_cancel_all() {
        let mut loads = InFlightLoads::new();
        let a = loads.start(LoadKind::Layer, "a");
        let b = loads.start(LoadKind::Layer, "b");
        loads.cancel_all();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert!(loads.is_empty());
    }
}
