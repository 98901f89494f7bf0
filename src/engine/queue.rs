// src/engine/queue.rs

use std::collections::{HashSet, VecDeque};

use tracing::{debug, warn};

use crate::job::JobId;

/// Jobs waiting for an execution slot, plus the set currently holding one.
///
/// Semantics:
/// - Waiting jobs leave the queue in FIFO (enqueue) order.
/// - At most `max_running` jobs hold a slot at once. With `max_running = 1`
///   the next job is only handed out after the previous one has reported
///   completion, i.e. engine processes never overlap.
/// - A slot is released by [`DispatchQueue::finish`] when the job's outcome
///   has been applied.
#[derive(Debug)]
pub struct DispatchQueue {
    max_running: usize,
    waiting: VecDeque<JobId>,
    running: HashSet<JobId>,
}

impl DispatchQueue {
    /// `max_running` is clamped to at least 1; zero slots would starve
    /// every job.
    pub fn new(max_running: usize) -> Self {
        Self {
            max_running: max_running.max(1),
            waiting: VecDeque::new(),
            running: HashSet::new(),
        }
    }

    pub fn max_running(&self) -> usize {
        self.max_running
    }

    pub fn push(&mut self, id: JobId) {
        debug!(job_id = %id, waiting = self.waiting.len() + 1, "job waiting for a slot");
        self.waiting.push_back(id);
    }

    /// Hand out the oldest waiting job if a slot is free.
    pub fn next_ready(&mut self) -> Option<JobId> {
        if self.running.len() >= self.max_running {
            return None;
        }
        let id = self.waiting.pop_front()?;
        self.running.insert(id);
        Some(id)
    }

    /// Release the slot held by `id`. Returns false if it held none.
    pub fn finish(&mut self, id: JobId) -> bool {
        let released = self.running.remove(&id);
        if !released {
            warn!(job_id = %id, "completion for a job that holds no slot");
        }
        released
    }

    pub fn running_count(&self) -> usize {
        self.running.len()
    }

    pub fn waiting_count(&self) -> usize {
        self.waiting.len()
    }

    /// No job waiting and none running.
    pub fn is_idle(&self) -> bool {
        self.waiting.is_empty() && self.running.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_slot_serializes() {
        let mut q = DispatchQueue::new(1);
        let (a, b) = (JobId::new(), JobId::new());
        q.push(a);
        q.push(b);

        assert_eq!(q.next_ready(), Some(a));
        assert_eq!(q.next_ready(), None);

        assert!(q.finish(a));
        assert_eq!(q.next_ready(), Some(b));
        assert!(q.finish(b));
        assert!(q.is_idle());
    }

    #[test]
    fn bounded_slots_hand_out_fifo() {
        let mut q = DispatchQueue::new(2);
        let ids: Vec<JobId> = (0..3).map(|_| JobId::new()).collect();
        for id in &ids {
            q.push(*id);
        }

        assert_eq!(q.next_ready(), Some(ids[0]));
        assert_eq!(q.next_ready(), Some(ids[1]));
        assert_eq!(q.next_ready(), None);
        assert_eq!(q.running_count(), 2);
        assert_eq!(q.waiting_count(), 1);
    }

    #[test]
    fn zero_is_clamped() {
        assert_eq!(DispatchQueue::new(0).max_running(), 1);
    }

    #[test]
    fn unknown_finish_is_ignored() {
        let mut q = DispatchQueue::new(1);
        assert!(!q.finish(JobId::new()));
    }
}
