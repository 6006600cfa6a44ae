use crate::model::*;

/// One user's bookings, split for the history view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    /// Active bookings not yet ended, soonest first.
    pub upcoming: Vec<Booking>,
    /// Active bookings already ended, most recent first.
    pub past: Vec<Booking>,
    /// Cancelled bookings, most recent first.
    pub cancelled: Vec<Booking>,
}

impl History {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len() + self.cancelled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn history_for<'a>(owner: &str, bookings: impl IntoIterator<Item = &'a Booking>, now: Ms) -> History {
    let mut history = History::default();
    for booking in bookings.into_iter().filter(|b| b.owner == owner) {
        if booking.is_cancelled() {
            history.cancelled.push(booking.clone());
        } else if booking.span.end > now {
            history.upcoming.push(booking.clone());
        } else {
            history.past.push(booking.clone());
        }
    }
    history.upcoming.sort_by_key(|b| (b.span.start, b.id));
    history.past.sort_by_key(|b| std::cmp::Reverse((b.span.start, b.id)));
    history.cancelled.sort_by_key(|b| std::cmp::Reverse((b.span.start, b.id)));
    history
}

/// History across every room on the board.
pub fn history_across<'a>(
    owner: &str,
    rooms: impl IntoIterator<Item = &'a RoomWithSchedule>,
    now: Ms,
) -> History {
    history_for(owner, rooms.into_iter().flat_map(|e| e.schedule.bookings()), now)
}
