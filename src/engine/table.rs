// src/engine/table.rs

//! Ordered, id-keyed job collection owned by the registry.

use std::collections::{HashMap, VecDeque};

use crate::job::{Job, JobId};

/// Jobs keyed by id, displayed newest first.
///
/// Positions shift whenever a job is added at the front, so every update
/// goes through the id, never an index.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: HashMap<JobId, Job>,
    order: VecDeque<JobId>,
}

impl JobTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front. Returns false if the id is already present.
    pub fn insert_front(&mut self, job: Job) -> bool {
        let id = job.id();
        if self.jobs.contains_key(&id) {
            return false;
        }
        self.jobs.insert(id, job);
        self.order.push_front(id);
        true
    }

    pub fn get(&self, id: &JobId) -> Option<&Job> {
        self.jobs.get(id)
    }

    pub fn get_mut(&mut self, id: &JobId) -> Option<&mut Job> {
        self.jobs.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Copies of all jobs, newest first.
    pub fn snapshot(&self) -> Vec<Job> {
        self.order
            .iter()
            .filter_map(|id| self.jobs.get(id).cloned())
            .collect()
    }
}
