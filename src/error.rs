use crate::model::{BookingId, RoomId};

#[derive(Debug)]
pub enum BoardError {
    NotFound(RoomId),
    Conflict(BookingId),
    InvalidWindow(&'static str),
    LimitExceeded(&'static str),
    SignOffRequired(RoomId),
    AlreadyCancelled(BookingId),
    NotOwner(BookingId),
    Directory(String),
    Timeout(RoomId),
    Session(String),
    Parse(String),
    Io(std::io::Error),
}

impl std::fmt::Display for BoardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardError::NotFound(id) => write!(f, "room not found: {id}"),
            BoardError::Conflict(id) => write!(f, "conflict with booking: {id}"),
            BoardError::InvalidWindow(msg) => write!(f, "invalid time window: {msg}"),
            BoardError::LimitExceeded(msg) => write!(f, "limit exceeded: {msg}"),
            BoardError::SignOffRequired(id) => {
                write!(f, "room {id} requires sign-off for this department")
            }
            BoardError::AlreadyCancelled(id) => write!(f, "booking {id} is already cancelled"),
            BoardError::NotOwner(id) => write!(f, "booking {id} belongs to another user"),
            BoardError::Directory(e) => write!(f, "room directory error: {e}"),
            BoardError::Timeout(id) => write!(f, "schedule fetch timed out for room {id}"),
            BoardError::Session(e) => write!(f, "session error: {e}"),
            BoardError::Parse(e) => write!(f, "parse error: {e}"),
            BoardError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for BoardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BoardError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BoardError {
    fn from(e: std::io::Error) -> Self {
        BoardError::Io(e)
    }
}

impl From<serde_json::Error> for BoardError {
    fn from(e: serde_json::Error) -> Self {
        BoardError::Parse(e.to_string())
    }
}
