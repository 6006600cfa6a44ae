use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;

use crate::board::BoardConfig;
use crate::error::BoardError;
use crate::filter::{FilterState, StatusFilter};
use crate::limits::*;
use crate::window::WindowMode;

/// Runtime configuration, read from `ROOMBOARD_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot: PathBuf,
    pub factory: String,
    /// Scope schedule fetches to this local day.
    pub date: Option<NaiveDate>,
    pub session_file: PathBuf,
    pub metrics_port: Option<u16>,
    pub board: BoardConfig,
    pub filter: FilterState,
}

impl Config {
    pub fn from_env() -> Result<Self, BoardError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, BoardError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_concurrent_fetches: usize = parse_or(get("ROOMBOARD_MAX_FETCHES"), DEFAULT_MAX_CONCURRENT_FETCHES)?;
        if max_concurrent_fetches > MAX_CONCURRENT_FETCHES {
            return Err(BoardError::LimitExceeded("ROOMBOARD_MAX_FETCHES above 1024"));
        }
        let timeout_ms: u64 = parse_or(get("ROOMBOARD_FETCH_TIMEOUT_MS"), DEFAULT_FETCH_TIMEOUT_MS)?;
        let metrics_port: Option<u16> = get("ROOMBOARD_METRICS_PORT").map(|p| parse(&p)).transpose()?;
        let date = get("ROOMBOARD_DATE")
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| BoardError::Parse(format!("ROOMBOARD_DATE={d}: {e}")))
            })
            .transpose()?;

        Ok(Self {
            snapshot: PathBuf::from(get("ROOMBOARD_SNAPSHOT").unwrap_or_else(|| "./rooms.json".into())),
            factory: get("ROOMBOARD_FACTORY").unwrap_or_default(),
            date,
            session_file: PathBuf::from(get("ROOMBOARD_SESSION_FILE").unwrap_or_else(|| "./session.json".into())),
            metrics_port,
            board: BoardConfig {
                max_concurrent_fetches,
                fetch_timeout: Duration::from_millis(timeout_ms),
            },
            filter: filter_from(&get)?,
        })
    }
}

fn filter_from(get: &impl Fn(&str) -> Option<String>) -> Result<FilterState, BoardError> {
    let areas: BTreeSet<String> = get("ROOMBOARD_AREAS")
        .map(|raw| list(&raw).map(String::from).collect())
        .unwrap_or_default();
    let capacities: BTreeSet<u32> = get("ROOMBOARD_CAPACITIES")
        .map(|raw| list(&raw).map(parse::<u32>).collect::<Result<_, _>>())
        .transpose()?
        .unwrap_or_default();
    let room_status = match get("ROOMBOARD_STATUS").map(|s| s.to_ascii_lowercase()).as_deref() {
        None => None,
        Some("available") => Some(StatusFilter::Available),
        Some("occupied") => Some(StatusFilter::Occupied),
        Some(other) => return Err(BoardError::Parse(format!("ROOMBOARD_STATUS={other}"))),
    };
    let start_date_time = get("ROOMBOARD_START");
    let end_date_time = get("ROOMBOARD_END");
    let time_mode = if start_date_time.is_some() || end_date_time.is_some() {
        WindowMode::Range
    } else {
        WindowMode::AllDay
    };
    Ok(FilterState {
        areas,
        capacities,
        room_status,
        time_mode,
        start_date_time,
        end_date_time,
    })
}

fn list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn parse<T: std::str::FromStr>(raw: &str) -> Result<T, BoardError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| BoardError::Parse(format!("{raw:?}: {e}")))
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> Result<T, BoardError>
where
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |r| parse(&r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, BoardError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]).unwrap();
        assert_eq!(c.snapshot, PathBuf::from("./rooms.json"));
        assert!(c.factory.is_empty());
        assert_eq!(c.metrics_port, None);
        assert_eq!(c.board.max_concurrent_fetches, DEFAULT_MAX_CONCURRENT_FETCHES);
        assert_eq!(c.filter, FilterState::default());
    }

    #[test]
    fn filter_variables() {
        let c = config(&[
            ("ROOMBOARD_AREAS", "North, South,,"),
            ("ROOMBOARD_CAPACITIES", "10,20"),
            ("ROOMBOARD_STATUS", "Occupied"),
            ("ROOMBOARD_START", "2024-01-01T09:00"),
        ])
        .unwrap();
        assert_eq!(c.filter.areas.len(), 2);
        assert!(c.filter.areas.contains("South"));
        assert_eq!(c.filter.capacities, BTreeSet::from([10, 20]));
        assert_eq!(c.filter.room_status, Some(StatusFilter::Occupied));
        assert_eq!(c.filter.time_mode, WindowMode::Range);
        assert_eq!(c.filter.end_date_time, None);
    }

    #[test]
    fn blank_values_are_unset() {
        let c = config(&[("ROOMBOARD_STATUS", "  "), ("ROOMBOARD_METRICS_PORT", "")]).unwrap();
        assert_eq!(c.filter.room_status, None);
        assert_eq!(c.metrics_port, None);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(config(&[("ROOMBOARD_STATUS", "busy")]), Err(BoardError::Parse(_))));
        assert!(matches!(config(&[("ROOMBOARD_CAPACITIES", "ten")]), Err(BoardError::Parse(_))));
        assert!(matches!(config(&[("ROOMBOARD_METRICS_PORT", "99999")]), Err(BoardError::Parse(_))));
        assert!(matches!(config(&[("ROOMBOARD_DATE", "01/02/2024")]), Err(BoardError::Parse(_))));
    }

    #[test]
    fn board_settings() {
        let c = config(&[
            ("ROOMBOARD_MAX_FETCHES", "4"),
            ("ROOMBOARD_FETCH_TIMEOUT_MS", "250"),
            ("ROOMBOARD_DATE", "2024-01-01"),
        ])
        .unwrap();
        assert_eq!(c.board.max_concurrent_fetches, 4);
        assert_eq!(c.board.fetch_timeout, Duration::from_millis(250));
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn fetch_limit_is_bounded() {
        let c = config(&[("ROOMBOARD_MAX_FETCHES", "1024")]).unwrap();
        assert_eq!(c.board.max_concurrent_fetches, MAX_CONCURRENT_FETCHES);
        assert!(matches!(
            config(&[("ROOMBOARD_MAX_FETCHES", "1025")]),
            Err(BoardError::LimitExceeded(_))
        ));
        assert!(matches!(
            config(&[("ROOMBOARD_MAX_FETCHES", "18446744073709551615")]),
            Err(BoardError::LimitExceeded(_))
        ));
    }
}
