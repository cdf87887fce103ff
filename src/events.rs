use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::error::EventError;
use crate::models::{Event, EventStatus};

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub funding_goal: i64,
}

impl EventStatus {
    pub fn at(start: NaiveDateTime, end: Option<NaiveDateTime>, now: NaiveDateTime) -> Self {
        if now < start {
            Self::Upcoming
        } else if end.map_or(true, |end| now <= end) {
            Self::Ongoing
        } else {
            Self::Past
        }
    }
}

pub fn create_event(draft: NewEvent, now: NaiveDateTime) -> Result<Event, EventError> {
    let title = draft.title.trim().to_string();
    if title.is_empty() {
        return Err(EventError::MissingTitle);
    }
    if draft.end_time.is_some_and(|end| end < draft.start_time) {
        return Err(EventError::EndsBeforeStart);
    }
    if draft.funding_goal < 0 {
        return Err(EventError::NegativeGoal(draft.funding_goal));
    }

    Ok(Event {
        id: Uuid::new_v4(),
        title,
        description: draft.description.trim().to_string(),
        start_time: draft.start_time,
        end_time: draft.end_time,
        status: EventStatus::at(draft.start_time, draft.end_time, now),
        funding_goal: draft.funding_goal,
        current_funding: 0,
        donors_count: 0,
    })
}

impl Event {
    /// Rounded share of the goal raised so far; may exceed 100.
    pub fn funding_percent(&self) -> i64 {
        if self.funding_goal <= 0 {
            return 0;
        }
        (self.current_funding as f64 / self.funding_goal as f64 * 100.0).round() as i64
    }

    /// Width of the progress bar, capped at 100.
    pub fn progress_percent(&self) -> i64 {
        self.funding_percent().min(100)
    }

    pub fn record_donation(&mut self, amount: i64) -> Result<(), EventError> {
        if amount <= 0 {
            return Err(EventError::NonPositiveDonation(amount));
        }
        let (Some(funding), Some(donors)) = (
            self.current_funding.checked_add(amount),
            self.donors_count.checked_add(1),
        ) else {
            return Err(EventError::FundingOverflow(amount));
        };
        self.current_funding = funding;
        self.donors_count = donors;
        info!(event = %self.id, amount, total = self.current_funding, "donation recorded");
        Ok(())
    }

    pub fn refresh_status(&mut self, now: NaiveDateTime) {
        self.status = EventStatus::at(self.start_time, self.end_time, now);
    }
}
