use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::filter::conflicts;
use crate::limits::*;
use crate::model::*;

/// A booking the user is about to submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub room_id: RoomId,
    pub span: Span,
    pub owner: String,
    pub department: Option<String>,
    pub title: Option<String>,
    /// The user confirmed they hold the sign-off the room requires.
    #[serde(default)]
    pub sign_off_acknowledged: bool,
}

pub fn validate_span(span: &Span) -> Result<(), BoardError> {
    if span.is_empty() {
        return Err(BoardError::InvalidWindow("start must be before end"));
    }
    if span.start < MIN_VALID_TIMESTAMP_MS || span.end > MAX_VALID_TIMESTAMP_MS {
        return Err(BoardError::LimitExceeded("timestamp out of range"));
    }
    if span.duration_ms() > MAX_BOOKING_DURATION_MS {
        return Err(BoardError::LimitExceeded("booking too long"));
    }
    Ok(())
}

/// First active booking overlapping `span` is reported as the conflict.
pub fn check_no_conflict(bookings: &[Booking], span: &Span) -> Result<(), BoardError> {
    match conflicts(bookings, span).next() {
        Some(existing) => Err(BoardError::Conflict(existing.id)),
        None => Ok(()),
    }
}

/// Check a draft booking against the room's current schedule before it is
/// sent to the room service.
pub fn validate_request(entry: &RoomWithSchedule, req: &BookingRequest, now: Ms) -> Result<(), BoardError> {
    if entry.room.id != req.room_id {
        return Err(BoardError::NotFound(req.room_id));
    }
    validate_span(&req.span)?;
    if req.span.end <= now {
        return Err(BoardError::InvalidWindow("booking ends in the past"));
    }
    let bookings = match &entry.schedule {
        ScheduleOutcome::Loaded(bookings) => bookings,
        ScheduleOutcome::Failed(reason) => {
            return Err(BoardError::Directory(format!(
                "schedule for room {} unavailable: {reason}",
                req.room_id
            )));
        }
    };
    check_no_conflict(bookings, &req.span)?;
    if entry.room.policy.needs_sign_off(req.department.as_deref()) && !req.sign_off_acknowledged {
        return Err(BoardError::SignOffRequired(req.room_id));
    }
    Ok(())
}

/// Check that `requester` may cancel `booking`.
pub fn check_cancellable(booking: &Booking, requester: &str, now: Ms) -> Result<(), BoardError> {
    if booking.is_cancelled() {
        return Err(BoardError::AlreadyCancelled(booking.id));
    }
    if booking.owner != requester {
        return Err(BoardError::NotOwner(booking.id));
    }
    if booking.span.end <= now {
        return Err(BoardError::InvalidWindow("booking already ended"));
    }
    Ok(())
}
