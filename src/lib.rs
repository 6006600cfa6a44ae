pub mod api;
pub mod board;
pub mod config;
pub mod conflict;
pub mod directory;
pub mod error;
pub mod filter;
pub mod history;
pub mod limits;
pub mod model;
pub mod observability;
pub mod session;
pub mod time;
pub mod window;

pub use board::{BoardConfig, RefreshOutcome, RoomBoard};
pub use error::BoardError;
pub use filter::{filter_rooms, filter_rooms_in, is_available, FilterState, RoomView, StatusFilter};
pub use model::{overlaps, Booking, Room, RoomStatus, RoomWithSchedule, ScheduleOutcome, Span};
pub use window::{resolve_window, resolve_window_at, ResolvedWindow, WindowMode, WindowSource};
