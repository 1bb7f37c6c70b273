//! Dashboard analytics.
//!
//! Provides per-status complaint counts for the dashboard header.

use crate::types::{Complaint, ComplaintStatus};

/// Complaint counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl StatusCounts {
    /// Count complaints by status.
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        complaints.iter().fold(Self::default(), |mut counts, c| {
            counts.total += 1;
            match c.status {
                ComplaintStatus::Pending => counts.pending += 1,
                ComplaintStatus::InProgress => counts.in_progress += 1,
                ComplaintStatus::Resolved => counts.resolved += 1,
                ComplaintStatus::Closed => counts.closed += 1,
            }
            counts
        })
    }

    /// Count for a single status.
    pub fn get(&self, status: ComplaintStatus) -> usize {
        match status {
            ComplaintStatus::Pending => self.pending,
            ComplaintStatus::InProgress => self.in_progress,
            ComplaintStatus::Resolved => self.resolved,
            ComplaintStatus::Closed => self.closed,
        }
    }

    /// Share of complaints that are resolved or closed, 0.0 when empty.
    pub fn completion_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.resolved + self.closed) as f64 / self.total as f64
    }
}
