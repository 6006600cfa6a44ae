//! Wire shapes of the room service and of the CLI output.
//!
//! Field names follow the service's JSON (`ID_Room`, `StartTime`, ...).
//! Conversion into the model happens here so nothing downstream sees strings
//! where instants belong.

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::model::*;
use crate::time::parse_instant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDto {
    #[serde(rename = "ID_Room")]
    pub id: RoomId,
    #[serde(rename = "RoomName")]
    pub name: String,
    #[serde(rename = "Area", default)]
    pub area: String,
    #[serde(rename = "Floor", default)]
    pub floor: Option<i32>,
    #[serde(rename = "Capacity", default)]
    pub capacity: u32,
    #[serde(rename = "Image", default)]
    pub image: Option<String>,
    #[serde(rename = "Factory", default)]
    pub factory: String,
    #[serde(rename = "RequireSignOff", default)]
    pub require_sign_off: bool,
    #[serde(rename = "ExemptDepartments", default)]
    pub exempt_departments: Vec<String>,
}

impl RoomDto {
    pub fn into_room(self) -> (String, Room) {
        let room = Room {
            id: self.id,
            name: self.name,
            area: self.area,
            floor: self.floor,
            capacity: self.capacity,
            image: self.image,
            policy: RoomPolicy {
                requires_sign_off: self.require_sign_off,
                exempt_departments: self.exempt_departments,
            },
        };
        (self.factory, room)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDto {
    #[serde(rename = "ID_Schedule")]
    pub id: BookingId,
    #[serde(rename = "ID_Room")]
    pub room_id: RoomId,
    #[serde(rename = "StartTime")]
    pub start: String,
    #[serde(rename = "EndTime")]
    pub end: String,
    #[serde(rename = "Owner", default)]
    pub owner: String,
    #[serde(rename = "Department", default)]
    pub department: Option<String>,
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "CancelledAt", default)]
    pub cancelled_at: Option<String>,
}

impl BookingDto {
    /// Naive timestamps are read as wall clock in `tz`.
    pub fn into_booking<Tz: TimeZone>(self, tz: &Tz) -> Result<Booking, BoardError> {
        let start = parse_instant(&self.start, tz)
            .ok_or_else(|| BoardError::Parse(format!("booking {}: bad StartTime {:?}", self.id, self.start)))?;
        let end = parse_instant(&self.end, tz)
            .ok_or_else(|| BoardError::Parse(format!("booking {}: bad EndTime {:?}", self.id, self.end)))?;
        // A cancellation marker that is present but unparseable still cancels.
        let cancelled_at = self
            .cancelled_at
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_instant(raw, tz).unwrap_or(start));
        Ok(Booking {
            id: self.id,
            room_id: self.room_id,
            span: Span::new(start, end),
            owner: self.owner,
            department: self.department,
            title: self.title,
            cancelled_at,
        })
    }
}

/// Everything the room service would return, captured in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotDto {
    pub rooms: Vec<RoomDto>,
    pub schedules: Vec<BookingDto>,
}

/// One line of CLI output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomSummary<'a> {
    pub id: RoomId,
    pub name: &'a str,
    pub area: &'a str,
    pub floor: Option<i32>,
    pub capacity: u32,
    pub status: RoomStatus,
    pub requires_sign_off: bool,
}

impl<'a> From<crate::filter::RoomView<'a>> for RoomSummary<'a> {
    fn from(view: crate::filter::RoomView<'a>) -> Self {
        let room = &view.entry.room;
        RoomSummary {
            id: room.id,
            name: &room.name,
            area: &room.area,
            floor: room.floor,
            capacity: room.capacity,
            status: view.status,
            requires_sign_off: room.policy.requires_sign_off,
        }
    }
}
