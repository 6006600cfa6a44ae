use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, Local, NaiveDate};
use tracing::info;

use crate::api::SnapshotDto;
use crate::error::BoardError;
use crate::limits::*;
use crate::model::*;
use crate::time::day_span;

/// The remote room/schedule service.
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Rooms of a factory, in service order. An empty factory means every room.
    async fn get_all_rooms(&self, factory: &str) -> Result<Vec<Room>, BoardError>;

    /// Bookings of a room, optionally only those touching a local day.
    async fn get_schedule(&self, room_id: RoomId, date: Option<NaiveDate>) -> Result<Vec<Booking>, BoardError>;
}

/// Directory served from memory, loadable from a JSON snapshot of the service.
pub struct SnapshotDirectory {
    rooms: Vec<(String, Room)>,
    schedules: HashMap<RoomId, Vec<Booking>>,
    failing: HashSet<RoomId>,
    delay: Option<Duration>,
    offset: FixedOffset,
}

impl SnapshotDirectory {
    /// Empty directory whose day boundaries use the local offset.
    pub fn new() -> Self {
        Self::with_offset(*Local::now().offset())
    }

    pub fn with_offset(offset: FixedOffset) -> Self {
        Self {
            rooms: Vec::new(),
            schedules: HashMap::new(),
            failing: HashSet::new(),
            delay: None,
            offset,
        }
    }

    /// Load a `{ "rooms": [...], "schedules": [...] }` snapshot file.
    pub fn load(path: &Path, offset: FixedOffset) -> Result<Self, BoardError> {
        let raw = std::fs::read_to_string(path)?;
        let snapshot: SnapshotDto = serde_json::from_str(&raw)?;
        let dir = Self::from_snapshot(snapshot, offset)?;
        info!(
            "loaded snapshot {}: {} rooms, {} bookings",
            path.display(),
            dir.rooms.len(),
            dir.schedules.values().map(Vec::len).sum::<usize>()
        );
        Ok(dir)
    }

    pub fn from_snapshot(snapshot: SnapshotDto, offset: FixedOffset) -> Result<Self, BoardError> {
        let mut dir = Self::with_offset(offset);
        for dto in snapshot.rooms {
            let (factory, room) = dto.into_room();
            dir = dir.with_room(&factory, room, Vec::new());
        }
        for dto in snapshot.schedules {
            let booking = dto.into_booking(&offset)?;
            dir.schedules.entry(booking.room_id).or_default().push(booking);
        }
        Ok(dir)
    }

    pub fn with_room(mut self, factory: &str, room: Room, bookings: Vec<Booking>) -> Self {
        self.schedules.entry(room.id).or_default().extend(bookings);
        self.rooms.push((factory.to_string(), room));
        self
    }

    /// Make every schedule fetch for `room_id` fail.
    pub fn failing(mut self, room_id: RoomId) -> Self {
        self.failing.insert(room_id);
        self
    }

    /// Delay every schedule fetch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl Default for SnapshotDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomDirectory for SnapshotDirectory {
    async fn get_all_rooms(&self, factory: &str) -> Result<Vec<Room>, BoardError> {
        let rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|(f, _)| factory.is_empty() || f == factory)
            .map(|(_, room)| room.clone())
            .collect();
        if rooms.len() > MAX_ROOMS {
            return Err(BoardError::LimitExceeded("too many rooms"));
        }
        Ok(rooms)
    }

    async fn get_schedule(&self, room_id: RoomId, date: Option<NaiveDate>) -> Result<Vec<Booking>, BoardError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&room_id) {
            return Err(BoardError::Directory(format!("schedule service unavailable for room {room_id}")));
        }
        if !self.rooms.iter().any(|(_, r)| r.id == room_id) {
            return Err(BoardError::NotFound(room_id));
        }
        let bookings = self.schedules.get(&room_id).map(Vec::as_slice).unwrap_or_default();
        if bookings.len() > MAX_BOOKINGS_PER_ROOM {
            return Err(BoardError::LimitExceeded("too many bookings for room"));
        }
        let day = date.map(|d| day_span(d, &self.offset));
        Ok(bookings
            .iter()
            .filter(|b| day.is_none_or(|day| b.span.overlaps(&day)))
            .cloned()
            .collect())
    }
}
