use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::RequestError;
use crate::models::{MentorRequest, RequestKind, RequestStatus};

pub fn open_request(
    requested_by: &str,
    requested_to: &str,
    kind: RequestKind,
    message: &str,
    now: NaiveDateTime,
) -> Result<MentorRequest, RequestError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(RequestError::EmptyMessage);
    }

    Ok(MentorRequest {
        id: Uuid::new_v4(),
        requested_by: requested_by.trim().to_string(),
        requested_to: requested_to.trim().to_string(),
        kind,
        message: message.to_string(),
        status: RequestStatus::Pending,
        created_at: now,
        updated_at: now,
    })
}

impl MentorRequest {
    /// Accepts or declines a pending request. A request is answered once.
    pub fn respond(&mut self, decision: RequestStatus, now: NaiveDateTime) -> Result<(), RequestError> {
        if decision == RequestStatus::Pending {
            return Err(RequestError::InvalidDecision(decision));
        }
        if self.status != RequestStatus::Pending {
            return Err(RequestError::AlreadyResolved(self.status));
        }

        self.status = decision;
        self.updated_at = now;
        info!(request = %self.id, kind = %self.kind, status = %decision, "request answered");
        Ok(())
    }
}
