//! Detail-view state machine for the single task under close inspection.
//!
//! The tracker is either [`DetailState::Idle`] or tracking one task id
//! under an *epoch*. Every call to [`DetailTracker::track`] or
//! [`DetailTracker::clear`] moves to a fresh epoch, so a fetch issued
//! under an older epoch can be recognised as stale when its response
//! arrives and dropped instead of overwriting newer state.

use crate::task::Task;
use crate::types::TaskId;

/// Activation counter for detail subscriptions.
pub type Epoch = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DetailState {
    #[default]
    Idle,
    Tracking {
        task_id: TaskId,
        epoch: Epoch,
        /// `None` until the first response for this epoch is applied.
        task: Option<Task>,
    },
}

/// What the fetch chain should do after a response has been offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Applied; the task is still active, fetch again after the delay.
    Repoll,
    /// Applied; the task reached a terminal status, the chain ends.
    Settled,
    /// Dropped; the response belongs to an abandoned activation.
    Stale,
}

#[derive(Debug, Default)]
pub struct DetailTracker {
    state: DetailState,
    last_epoch: Epoch,
}

impl DetailTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `task_id`, abandoning whatever was tracked before.
    pub fn track(&mut self, task_id: impl Into<TaskId>) -> Epoch {
        self.last_epoch += 1;
        self.state = DetailState::Tracking {
            task_id: task_id.into(),
            epoch: self.last_epoch,
            task: None,
        };
        self.last_epoch
    }

    /// Close the detail view. Any in-flight response becomes stale.
    pub fn clear(&mut self) {
        self.last_epoch += 1;
        self.state = DetailState::Idle;
    }

    pub fn is_current(&self, epoch: Epoch) -> bool {
        matches!(&self.state, DetailState::Tracking { epoch: e, .. } if *e == epoch)
    }

    /// Offer a fetched record obtained under `epoch`.
    pub fn apply(&mut self, epoch: Epoch, fetched: Task) -> ApplyOutcome {
        let DetailState::Tracking {
            task_id,
            epoch: current,
            task,
        } = &mut self.state
        else {
            return ApplyOutcome::Stale;
        };

        if *current != epoch || *task_id != fetched.id {
            return ApplyOutcome::Stale;
        }

        let active = fetched.is_active();
        match task {
            Some(held) => {
                held.merge_fetched(fetched);
            }
            None => *task = Some(fetched),
        }

        if active {
            ApplyOutcome::Repoll
        } else {
            ApplyOutcome::Settled
        }
    }

    pub fn state(&self) -> &DetailState {
        &self.state
    }

    pub fn task_id(&self) -> Option<&TaskId> {
        match &self.state {
            DetailState::Tracking { task_id, .. } => Some(task_id),
            DetailState::Idle => None,
        }
    }

    /// The detail record, once the first response has been applied.
    pub fn task(&self) -> Option<&Task> {
        match &self.state {
            DetailState::Tracking { task, .. } => task.as_ref(),
            DetailState::Idle => None,
        }
    }
}
