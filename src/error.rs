use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("input contains no header row")]
    Empty,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV writer: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV output was not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EventError {
    #[error("event title must not be empty")]
    MissingTitle,
    #[error("event ends before it starts")]
    EndsBeforeStart,
    #[error("funding goal must not be negative (got {0})")]
    NegativeGoal(i64),
    #[error("donation amount must be positive (got {0})")]
    NonPositiveDonation(i64),
    #[error("donation of {0} would overflow the event's funding total")]
    FundingOverflow(i64),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request message must not be empty")]
    EmptyMessage,
    #[error("request has already been {0}")]
    AlreadyResolved(crate::models::RequestStatus),
    #[error("a request cannot be answered with {0}")]
    InvalidDecision(crate::models::RequestStatus),
    #[error("unknown request kind {0:?}")]
    UnknownKind(String),
    #[error("unknown request status {0:?}")]
    UnknownStatus(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("notification subject must not be empty")]
    MissingSubject,
    #[error("notification body must not be empty")]
    MissingBody,
    #[error("no valid recipients")]
    NoRecipients,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event status {0:?}")]
pub struct UnknownEventStatus(pub String);
