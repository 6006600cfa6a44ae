use serde::{Deserialize, Serialize};

/// Unix milliseconds — the only time type.
pub type Ms = i64;

/// Room identity as issued by the room service (`ID_Room`).
pub type RoomId = i64;

/// Booking identity as issued by the room service (`ID_Schedule`).
pub type BookingId = i64;

/// Half-open intersection test: `[a_start, a_end)` and `[b_start, b_end)`
/// share at least one instant. Touching endpoints do not overlap, and an
/// empty or inverted interval never overlaps anything.
pub fn overlaps(a_start: Ms, a_end: Ms, b_start: Ms, b_end: Ms) -> bool {
    a_start < b_end && a_end > b_start
}

/// Half-open interval `[start, end)`.
///
/// Unlike a booking span, an evaluation window is allowed to be empty or
/// inverted; such a window simply never overlaps anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        Self { start, end }
    }

    /// True for zero-length and inverted spans.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_ms(&self) -> Ms {
        (self.end - self.start).max(0)
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// Booking policy attached to a room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPolicy {
    /// Bookings need a special sign-off from the room owner.
    pub requires_sign_off: bool,
    /// Departments that may book without sign-off.
    pub exempt_departments: Vec<String>,
}

impl RoomPolicy {
    /// Whether a booker from `department` must obtain sign-off.
    /// Exemption matching ignores ASCII case and surrounding whitespace.
    pub fn needs_sign_off(&self, department: Option<&str>) -> bool {
        if !self.requires_sign_off {
            return false;
        }
        let Some(dept) = department.map(str::trim).filter(|d| !d.is_empty()) else {
            return true;
        };
        !self
            .exempt_departments
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(dept))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub area: String,
    pub floor: Option<i32>,
    pub capacity: u32,
    pub image: Option<String>,
    pub policy: RoomPolicy,
}

/// A booking on a room (the service calls these schedules).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub room_id: RoomId,
    pub span: Span,
    pub owner: String,
    pub department: Option<String>,
    pub title: Option<String>,
    /// Set once the booking was cancelled. Cancelled bookings never occupy a room.
    pub cancelled_at: Option<Ms>,
}

impl Booking {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        !self.is_cancelled()
    }
}

/// Result of fetching one room's schedule. A failed fetch is kept as a
/// tagged value so it never aborts evaluation of the other rooms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Loaded(Vec<Booking>),
    Failed(String),
}

impl ScheduleOutcome {
    /// Bookings of a loaded schedule; empty for a failed one.
    pub fn bookings(&self) -> &[Booking] {
        match self {
            ScheduleOutcome::Loaded(bookings) => bookings,
            ScheduleOutcome::Failed(_) => &[],
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScheduleOutcome::Failed(_))
    }
}

/// A room together with the outcome of its schedule fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomWithSchedule {
    pub room: Room,
    pub schedule: ScheduleOutcome,
}

impl RoomWithSchedule {
    pub fn loaded(room: Room, bookings: Vec<Booking>) -> Self {
        Self {
            room,
            schedule: ScheduleOutcome::Loaded(bookings),
        }
    }
}

/// Occupancy of a room for an evaluation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Available,
    Occupied,
    /// The room's schedule could not be loaded.
    Unknown,
}

impl RoomStatus {
    pub fn label(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Unknown => "unknown",
        }
    }
}
