//! Transfer state machine.

/// Phase of a download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    Probing,
    Partitioning,
    Fetching,
    /// Merge strategy only.
    Merging,
    Complete,
    Failed,
}

impl TransferState {
    /// Whether `next` may follow `self`.
    pub fn can_advance_to(self, next: TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Probing, Partitioning)
                | (Partitioning, Fetching)
                | (Fetching, Merging)
                | (Fetching, Complete)
                | (Merging, Complete)
                | (Probing | Partitioning | Fetching | Merging, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Complete | TransferState::Failed)
    }

    pub(crate) fn advance(&mut self, next: TransferState) {
        debug_assert!(
            self.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self,
            next
        );
        tracing::debug!(from = ?*self, to = ?next, "transfer state");
        *self = next;
    }
}
