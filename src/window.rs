use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::filter::FilterState;
use crate::model::Span;
use crate::time::{day_span, parse_instant};

/// How the user picked the evaluation window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowMode {
    #[default]
    AllDay,
    Range,
}

/// Where a resolved window came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSource {
    AllDay,
    Range,
    /// Range mode was selected but a bound was missing or unparseable,
    /// so the all-day window was used instead.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedWindow {
    pub span: Span,
    pub source: WindowSource,
}

/// Resolve the evaluation window against the local clock.
pub fn resolve_window(filter: &FilterState) -> ResolvedWindow {
    resolve_window_at(filter, &Local::now())
}

/// Resolve the evaluation window as of `now`.
///
/// All-day is local `00:00:00.000..23:59:59.999` of `now`'s date. A range is
/// used verbatim, including an inverted one: such a window overlaps no
/// booking, so the resolver does not reject it.
pub fn resolve_window_at<Tz: TimeZone>(filter: &FilterState, now: &DateTime<Tz>) -> ResolvedWindow {
    let tz = now.timezone();
    let all_day = day_span(now.date_naive(), &tz);

    if filter.time_mode == WindowMode::AllDay {
        return ResolvedWindow {
            span: all_day,
            source: WindowSource::AllDay,
        };
    }

    let start = filter
        .start_date_time
        .as_deref()
        .and_then(|raw| parse_instant(raw, &tz));
    let end = filter
        .end_date_time
        .as_deref()
        .and_then(|raw| parse_instant(raw, &tz));

    match (start, end) {
        (Some(start), Some(end)) => ResolvedWindow {
            span: Span::new(start, end),
            source: WindowSource::Range,
        },
        _ => {
            warn!(
                start = ?filter.start_date_time,
                end = ?filter.end_date_time,
                "range filter incomplete, falling back to all-day window"
            );
            metrics::counter!(crate::observability::WINDOW_FALLBACKS_TOTAL).increment(1);
            ResolvedWindow {
                span: all_day,
                source: WindowSource::Fallback,
            }
        }
    }
}
