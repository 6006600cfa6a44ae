use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::limits::CAPACITY_BUCKET_WIDTH;
use crate::model::*;
use crate::window::{resolve_window, WindowMode};

/// Status the user wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    Available,
    Occupied,
}

/// Transient filter state, rebuilt each session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Selected areas. Empty means every area.
    pub areas: BTreeSet<String>,
    /// Selected capacity buckets; `cap` selects `[cap, cap + 10)`. Empty means every capacity.
    pub capacities: BTreeSet<u32>,
    pub room_status: Option<StatusFilter>,
    pub time_mode: WindowMode,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
}

/// A room that survived filtering, with its status for the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomView<'a> {
    pub entry: &'a RoomWithSchedule,
    pub status: RoomStatus,
}

pub fn area_selected(area: &str, areas: &BTreeSet<String>) -> bool {
    areas.is_empty() || areas.contains(area)
}

pub fn capacity_selected(capacity: u32, buckets: &BTreeSet<u32>) -> bool {
    buckets.is_empty()
        || buckets
            .iter()
            .any(|&cap| capacity >= cap && capacity < cap.saturating_add(CAPACITY_BUCKET_WIDTH))
}

/// Active bookings overlapping `window`.
pub fn conflicts<'a>(bookings: &'a [Booking], window: &'a Span) -> impl Iterator<Item = &'a Booking> {
    bookings
        .iter()
        .filter(move |b| b.is_active() && b.span.overlaps(window))
}

pub fn has_conflict(bookings: &[Booking], window: &Span) -> bool {
    conflicts(bookings, window).next().is_some()
}

pub fn classify(entry: &RoomWithSchedule, window: &Span) -> RoomStatus {
    match &entry.schedule {
        ScheduleOutcome::Failed(_) => RoomStatus::Unknown,
        ScheduleOutcome::Loaded(bookings) if has_conflict(bookings, window) => RoomStatus::Occupied,
        ScheduleOutcome::Loaded(_) => RoomStatus::Available,
    }
}

/// True only when the schedule is known and nothing active overlaps `window`.
pub fn is_available(entry: &RoomWithSchedule, window: &Span) -> bool {
    classify(entry, window) == RoomStatus::Available
}

fn status_selected(status: RoomStatus, wanted: Option<StatusFilter>) -> bool {
    match wanted {
        None => true,
        Some(StatusFilter::Available) => status == RoomStatus::Available,
        Some(StatusFilter::Occupied) => status == RoomStatus::Occupied,
    }
}

/// Filter rooms against an already-resolved window. Input order is preserved.
///
/// Rooms with an unknown status (failed schedule) are kept only when no
/// status filter is set.
pub fn filter_rooms_in<'a>(
    rooms: &'a [RoomWithSchedule],
    filter: &FilterState,
    window: &Span,
) -> Vec<RoomView<'a>> {
    rooms
        .iter()
        .filter(|e| area_selected(&e.room.area, &filter.areas))
        .filter(|e| capacity_selected(e.room.capacity, &filter.capacities))
        .map(|entry| {
            let status = classify(entry, window);
            crate::observability::record_status(status);
            RoomView { entry, status }
        })
        .filter(|view| status_selected(view.status, filter.room_status))
        .collect()
}

/// Filter rooms, resolving the window from `filter` against the local clock.
pub fn filter_rooms<'a>(rooms: &'a [RoomWithSchedule], filter: &FilterState) -> Vec<RoomView<'a>> {
    let window = resolve_window(filter);
    let views = filter_rooms_in(rooms, filter, &window.span);
    tracing::debug!(
        total = rooms.len(),
        kept = views.len(),
        "filtered rooms for window [{}, {})",
        window.span.start,
        window.span.end
    );
    views
}
