use crate::model::Ms;

const HOUR_MS: Ms = 3_600_000;

/// Width of a capacity bucket: bucket `cap` covers `[cap, cap + 10)`.
pub const CAPACITY_BUCKET_WIDTH: u32 = 10;

/// Rooms accepted from a single `get_all_rooms` call.
pub const MAX_ROOMS: usize = 10_000;

/// Bookings accepted for a single room schedule.
pub const MAX_BOOKINGS_PER_ROOM: usize = 50_000;

/// Longest booking a client may request.
pub const MAX_BOOKING_DURATION_MS: Ms = 7 * 24 * HOUR_MS;

/// 1970-01-01T00:00:00Z
pub const MIN_VALID_TIMESTAMP_MS: Ms = 0;

/// 9999-12-31T23:59:59.999Z
pub const MAX_VALID_TIMESTAMP_MS: Ms = 253_402_300_799_999;

pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 16;

/// Upper bound for `max_concurrent_fetches`; larger settings are rejected
/// by config and capped by the board.
pub const MAX_CONCURRENT_FETCHES: usize = 1024;

pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;
