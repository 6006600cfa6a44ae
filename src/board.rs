use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::{RwLock, Semaphore};
use tracing::{debug, info, warn};

use crate::conflict::{validate_request, BookingRequest};
use crate::directory::RoomDirectory;
use crate::error::BoardError;
use crate::limits::*;
use crate::model::*;
use crate::observability::*;

#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// Schedule fetches allowed in flight at once, capped at
    /// [`MAX_CONCURRENT_FETCHES`].
    pub max_concurrent_fetches: usize,
    /// Per-room schedule fetch deadline.
    pub fetch_timeout: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed { generation: u64, rooms: usize, failed: usize },
    /// A newer refresh committed first; this result was dropped.
    Stale { generation: u64 },
}

struct Committed {
    generation: u64,
    rooms: Vec<Room>,
    /// Day scope of the committed refresh, reused by single-room refreshes.
    date: Option<NaiveDate>,
}

/// Schedule of one room and the generation of the refresh that fetched it.
struct Slot {
    generation: u64,
    outcome: ScheduleOutcome,
}

/// Room list plus one schedule slot per room, refreshed from a [`RoomDirectory`].
///
/// Every refresh, full or single-room, takes a generation number when it
/// starts. A full refresh is dropped if a later full refresh committed first,
/// and a slot is only overwritten by a refresh that started after the one
/// that wrote it.
pub struct RoomBoard {
    directory: Arc<dyn RoomDirectory>,
    config: BoardConfig,
    /// Latest generation handed out.
    issued: AtomicU64,
    committed: RwLock<Committed>,
    /// Schedule slot per room id. Written only while holding `committed`.
    schedules: DashMap<RoomId, Slot>,
}

impl RoomBoard {
    pub fn new(directory: Arc<dyn RoomDirectory>, config: BoardConfig) -> Self {
        Self {
            directory,
            config,
            issued: AtomicU64::new(0),
            committed: RwLock::new(Committed {
                generation: 0,
                rooms: Vec::new(),
                date: None,
            }),
            schedules: DashMap::new(),
        }
    }

    /// Generation of the last committed full refresh (0 before the first).
    pub async fn generation(&self) -> u64 {
        self.committed.read().await.generation
    }

    /// Reload the room list and every room's schedule.
    ///
    /// Schedule fetches fan out concurrently (bounded by
    /// `max_concurrent_fetches`); a failing or timed-out fetch marks only its
    /// own room as failed. Only a failure to list rooms is an error.
    pub async fn refresh(&self, factory: &str, date: Option<NaiveDate>) -> Result<RefreshOutcome, BoardError> {
        let generation = self.next_generation();
        let rooms = self.directory.get_all_rooms(factory).await?;
        if rooms.len() > MAX_ROOMS {
            return Err(BoardError::LimitExceeded("too many rooms"));
        }

        let outcomes = self.fetch_schedules(&rooms, date).await;
        let failed = outcomes.iter().filter(|o| o.is_failed()).count();

        let mut committed = self.committed.write().await;
        if generation < committed.generation {
            debug!(
                "dropping refresh {generation}: generation {} already committed",
                committed.generation
            );
            metrics::counter!(REFRESHES_TOTAL, "outcome" => "stale").increment(1);
            return Ok(RefreshOutcome::Stale { generation });
        }

        let listed: HashSet<RoomId> = rooms.iter().map(|r| r.id).collect();
        self.schedules.retain(|id, _| listed.contains(id));
        let mut kept = 0;
        for (room, outcome) in rooms.iter().zip(outcomes) {
            if !self.store(room.id, generation, outcome) {
                kept += 1;
            }
        }
        if kept > 0 {
            debug!("refresh {generation}: kept {kept} newer room schedules");
        }
        let count = rooms.len();
        *committed = Committed {
            generation,
            rooms,
            date,
        };

        metrics::counter!(REFRESHES_TOTAL, "outcome" => "committed").increment(1);
        metrics::gauge!(ROOMS_LOADED).set(count as f64);
        info!("refresh {generation} committed: {count} rooms, {failed} schedules failed");
        Ok(RefreshOutcome::Committed {
            generation,
            rooms: count,
            failed,
        })
    }

    /// Reload one room's schedule, e.g. after a booking was made or cancelled.
    ///
    /// Uses the day scope of the last committed refresh. The result is dropped
    /// if a refresh that started later has already written the room's slot,
    /// or if the room is no longer listed.
    pub async fn refresh_room(&self, room_id: RoomId) -> Result<RefreshOutcome, BoardError> {
        let generation = self.next_generation();
        let date = {
            let committed = self.committed.read().await;
            if !committed.rooms.iter().any(|r| r.id == room_id) {
                return Err(BoardError::NotFound(room_id));
            }
            committed.date
        };

        let outcome = self.fetch_one(room_id, date).await;
        let failed = usize::from(outcome.is_failed());

        let committed = self.committed.read().await;
        if !committed.rooms.iter().any(|r| r.id == room_id) || !self.store(room_id, generation, outcome) {
            debug!("dropping schedule {generation} of room {room_id}: a newer refresh already wrote it");
            metrics::counter!(REFRESHES_TOTAL, "outcome" => "stale").increment(1);
            return Ok(RefreshOutcome::Stale { generation });
        }
        Ok(RefreshOutcome::Committed {
            generation,
            rooms: 1,
            failed,
        })
    }

    /// Rooms with their schedules, in service order.
    pub async fn snapshot(&self) -> Vec<RoomWithSchedule> {
        let committed = self.committed.read().await;
        committed
            .rooms
            .iter()
            .map(|room| RoomWithSchedule {
                room: room.clone(),
                schedule: self.slot(room.id),
            })
            .collect()
    }

    pub async fn entry(&self, room_id: RoomId) -> Option<RoomWithSchedule> {
        let committed = self.committed.read().await;
        committed
            .rooms
            .iter()
            .find(|r| r.id == room_id)
            .map(|room| RoomWithSchedule {
                room: room.clone(),
                schedule: self.slot(room_id),
            })
    }

    /// Validate a draft booking against the board's view of its room.
    pub async fn check_booking(&self, req: &BookingRequest, now: Ms) -> Result<(), BoardError> {
        let entry = self
            .entry(req.room_id)
            .await
            .ok_or(BoardError::NotFound(req.room_id))?;
        validate_request(&entry, req, now)
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn slot(&self, room_id: RoomId) -> ScheduleOutcome {
        self.schedules
            .get(&room_id)
            .map(|s| s.outcome.clone())
            .unwrap_or_else(|| ScheduleOutcome::Failed("schedule not loaded".into()))
    }

    /// Write a slot unless a later refresh already wrote it. Returns whether
    /// the slot was written.
    fn store(&self, room_id: RoomId, generation: u64, outcome: ScheduleOutcome) -> bool {
        match self.schedules.entry(room_id) {
            Entry::Occupied(slot) if slot.get().generation > generation => false,
            entry => {
                entry.insert(Slot { generation, outcome });
                true
            }
        }
    }

    async fn fetch_schedules(&self, rooms: &[Room], date: Option<NaiveDate>) -> Vec<ScheduleOutcome> {
        let permits = Semaphore::new(self.config.max_concurrent_fetches.clamp(1, MAX_CONCURRENT_FETCHES));
        let permits = &permits;
        let fetches = rooms.iter().map(|room| async move {
            let _permit = match permits.acquire().await {
                Ok(permit) => permit,
                Err(e) => return ScheduleOutcome::Failed(e.to_string()),
            };
            self.fetch_one(room.id, date).await
        });
        join_all(fetches).await
    }

    async fn fetch_one(&self, room_id: RoomId, date: Option<NaiveDate>) -> ScheduleOutcome {
        let started = Instant::now();
        let result = tokio::time::timeout(self.config.fetch_timeout, self.directory.get_schedule(room_id, date)).await;
        metrics::histogram!(SCHEDULE_FETCH_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

        match result {
            Ok(Ok(bookings)) => {
                metrics::counter!(SCHEDULE_FETCHES_TOTAL, "status" => "ok").increment(1);
                ScheduleOutcome::Loaded(bookings)
            }
            Ok(Err(e)) => {
                warn!("schedule fetch failed for room {room_id}: {e}");
                metrics::counter!(SCHEDULE_FETCHES_TOTAL, "status" => "failed").increment(1);
                ScheduleOutcome::Failed(e.to_string())
            }
            Err(_) => {
                let e = BoardError::Timeout(room_id);
                warn!("{e}");
                metrics::counter!(SCHEDULE_FETCHES_TOTAL, "status" => "timeout").increment(1);
                ScheduleOutcome::Failed(e.to_string())
            }
        }
    }
}
