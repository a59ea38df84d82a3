//! In-memory assignment ledger and the per-request claim guard.
//!
//! The ledger mirrors the durable store plus the transient state of requests
//! that are still running: which agents have a request in flight and which
//! tasks those requests have reserved. It is only ever touched under the
//! coordinator's mutex, and never while awaiting or doing I/O.

use crate::error::{Result, TackError};
use crate::model::Assignment;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
pub(crate) struct Ledger {
    /// Live assignments keyed by agent id.
    assignments: BTreeMap<String, Assignment>,
    /// Task ids of live assignments.
    assigned: BTreeSet<String>,
    /// Reserved task id -> requesting agent id.
    reserved: BTreeMap<String, String>,
    /// Agents with a request in flight.
    in_flight: BTreeSet<String>,
}

impl Ledger {
    /// Rebuild from durable records. Two records for one task is corrupt
    /// state and refuses to load.
    pub(crate) fn restore(records: Vec<Assignment>) -> Result<Self> {
        let mut ledger = Ledger::default();
        for record in records {
            if !ledger.assigned.insert(record.task_id.clone()) {
                return Err(TackError::Store(format!(
                    "task '{}' is assigned to more than one agent in the assignment store",
                    record.task_id
                )));
            }
            ledger.assignments.insert(record.agent_id.clone(), record);
        }
        Ok(ledger)
    }

    pub(crate) fn assignment_for(&self, agent_id: &str) -> Option<&Assignment> {
        self.assignments.get(agent_id)
    }

    pub(crate) fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.values()
    }

    /// Task the agent holds or has reserved.
    pub(crate) fn current_task(&self, agent_id: &str) -> Option<&str> {
        if let Some(assignment) = self.assignments.get(agent_id) {
            return Some(&assignment.task_id);
        }
        self.reserved
            .iter()
            .find(|(_, agent)| agent.as_str() == agent_id)
            .map(|(task, _)| task.as_str())
    }

    /// Whether a task is assigned or reserved.
    pub(crate) fn is_taken(&self, task_id: &str) -> bool {
        self.assigned.contains(task_id) || self.reserved.contains_key(task_id)
    }

    /// Assigned and reserved task ids.
    pub(crate) fn taken(&self) -> BTreeSet<String> {
        self.assigned
            .iter()
            .chain(self.reserved.keys())
            .cloned()
            .collect()
    }

    pub(crate) fn reservation_count(&self) -> usize {
        self.reserved.len()
    }

    pub(crate) fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Remove the live assignment of `agent_id` if it is for `task_id`.
    pub(crate) fn release(&mut self, agent_id: &str, task_id: &str) -> Option<Assignment> {
        match self.assignments.get(agent_id) {
            Some(current) if current.task_id == task_id => {}
            _ => return None,
        }
        let assignment = self.assignments.remove(agent_id)?;
        self.assigned.remove(&assignment.task_id);
        Some(assignment)
    }
}

/// Shared handle to the ledger.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedLedger(Arc<Mutex<Ledger>>);

impl SharedLedger {
    pub(crate) fn new(ledger: Ledger) -> Self {
        Self(Arc::new(Mutex::new(ledger)))
    }

    /// Enter the exclusive section.
    ///
    /// The ledger has no invariants a panicking holder could break halfway,
    /// so a poisoned lock is recovered.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.0.lock().unwrap_or_else(|poison| poison.into_inner())
    }

    /// Register a request for `agent_id`. Fails if one is already running.
    ///
    /// Must be called with the ledger already locked, passed in as `ledger`.
    pub(crate) fn begin_request(
        &self,
        ledger: &mut Ledger,
        agent_id: &str,
    ) -> Result<RequestGuard> {
        if !ledger.in_flight.insert(agent_id.to_string()) {
            return Err(TackError::AgentBusy(agent_id.to_string()));
        }
        Ok(RequestGuard {
            ledger: self.clone(),
            agent_id: agent_id.to_string(),
            reserved: None,
            committed: false,
        })
    }
}

/// One in-flight request.
///
/// Dropping the guard clears the agent's in-flight marker and any
/// reservation that was not committed, whether the request failed or the
/// caller stopped polling it.
#[derive(Debug)]
pub(crate) struct RequestGuard {
    ledger: SharedLedger,
    agent_id: String,
    reserved: Option<String>,
    committed: bool,
}

impl RequestGuard {
    /// Reserve `task_id` for this request. The caller holds the lock.
    pub(crate) fn reserve(&mut self, ledger: &mut Ledger, task_id: &str) {
        ledger
            .reserved
            .insert(task_id.to_string(), self.agent_id.clone());
        self.reserved = Some(task_id.to_string());
    }

    /// Turn the reservation into a live assignment.
    pub(crate) fn commit(&mut self, assignment: Assignment) {
        let mut ledger = self.ledger.lock();
        ledger.reserved.remove(&assignment.task_id);
        ledger.assigned.insert(assignment.task_id.clone());
        ledger
            .assignments
            .insert(assignment.agent_id.clone(), assignment);
        self.committed = true;
    }
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        let mut ledger = self.ledger.lock();
        ledger.in_flight.remove(&self.agent_id);
        if !self.committed
            && let Some(task_id) = self.reserved.take()
        {
            ledger.reserved.remove(&task_id);
        }
    }
}
