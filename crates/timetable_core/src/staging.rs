//! Staged assignments held by a client before they are committed.
//!
//! Staging never bypasses validation: [`StagingBuffer::commit`] replays every
//! draft through [`assign_slot`] in the order it was staged.

use tracing::info;
use uuid::Uuid;

use crate::assignment::{assign_slot, AssignSlotRequest};
use crate::conflict::ConflictInfo;
use crate::domain::{Day, TimetableEntry};
use crate::error::TimetableError;
use crate::ports::DatabaseService;

/// A draft that `commit` could not save. It stays in the buffer.
#[derive(Debug, Clone)]
pub struct RejectedEntry {
    pub request: AssignSlotRequest,
    pub reason: String,
    pub conflict: Option<ConflictInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct CommitReport {
    pub committed: Vec<TimetableEntry>,
    pub rejected: Vec<RejectedEntry>,
}

/// Pending assignments keyed by their (section, day, period) cell.
#[derive(Debug, Clone, Default)]
pub struct StagingBuffer {
    entries: Vec<AssignSlotRequest>,
}

impl StagingBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a draft, replacing any earlier draft for the same cell.
    pub fn stage(&mut self, request: AssignSlotRequest) {
        self.unstage(request.section_id, request.day, request.time_period_id);
        self.entries.push(request);
    }

    /// Drops the draft for a cell. Returns whether one existed.
    pub fn unstage(&mut self, section_id: Uuid, day: Day, time_period_id: Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| {
            !(e.section_id == section_id && e.day == day && e.time_period_id == time_period_id)
        });
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[AssignSlotRequest] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Saves every draft through the normal assignment path. Accepted drafts
    /// leave the buffer; rejected ones remain for the caller to fix.
    pub async fn commit(&mut self, db: &dyn DatabaseService) -> CommitReport {
        let mut report = CommitReport::default();
        let mut kept = Vec::new();

        for request in std::mem::take(&mut self.entries) {
            match assign_slot(db, request.clone()).await {
                Ok(entry) => report.committed.push(entry),
                Err(err) => {
                    let conflict = match &err {
                        TimetableError::Conflict(info) => Some(info.clone()),
                        _ => None,
                    };
                    report.rejected.push(RejectedEntry {
                        request: request.clone(),
                        reason: err.to_string(),
                        conflict,
                    });
                    kept.push(request);
                }
            }
        }

        self.entries = kept;
        info!(
            committed = report.committed.len(),
            rejected = report.rejected.len(),
            "Staged entries committed"
        );
        report
    }
}
