use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::FixedOffset;

use roomboard::directory::SnapshotDirectory;
use roomboard::model::*;
use roomboard::{filter_rooms_in, BoardConfig, FilterState, RoomBoard, StatusFilter};

const HOUR: Ms = 3_600_000; // 1 hour in ms
const DAY_START: Ms = 1_704_067_200_000;
const ROOMS: i64 = 2_000;
const BOOKINGS_PER_ROOM: i64 = 12;
const ITERATIONS: usize = 200;

fn percentile(sorted: &[Duration], p: f64) -> Duration {
    if sorted.is_empty() {
        return Duration::ZERO;
    }
    let idx = ((sorted.len() as f64) * p / 100.0) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn print_latency(label: &str, latencies: &mut [Duration]) {
    latencies.sort();
    let total: Duration = latencies.iter().sum();
    let avg = total / latencies.len() as u32;
    let max = latencies.last().copied().unwrap_or_default();
    println!("  {label}:");
    println!(
        "    n={}, avg={:.3}ms, p50={:.3}ms, p95={:.3}ms, p99={:.3}ms, max={:.3}ms",
        latencies.len(),
        avg.as_secs_f64() * 1000.0,
        percentile(latencies, 50.0).as_secs_f64() * 1000.0,
        percentile(latencies, 95.0).as_secs_f64() * 1000.0,
        percentile(latencies, 99.0).as_secs_f64() * 1000.0,
        max.as_secs_f64() * 1000.0,
    );
}

fn directory() -> SnapshotDirectory {
    let areas = ["North", "South", "East", "West"];
    let mut dir = SnapshotDirectory::with_offset(FixedOffset::east_opt(0).unwrap());
    for id in 0..ROOMS {
        let room = Room {
            id,
            name: format!("Room {id}"),
            area: areas[(id % 4) as usize].to_string(),
            floor: Some((id % 12) as i32),
            capacity: (id % 40) as u32 + 2,
            image: None,
            policy: RoomPolicy::default(),
        };
        let bookings = (0..BOOKINGS_PER_ROOM)
            .map(|n| {
                // Stagger so roughly half the rooms are busy at any hour.
                let start = DAY_START + (n * 2 + id % 2) * HOUR;
                Booking {
                    id: id * BOOKINGS_PER_ROOM + n,
                    room_id: id,
                    span: Span::new(start, start + HOUR),
                    owner: format!("user{}", n % 7),
                    department: None,
                    title: None,
                    cancelled_at: (n % 5 == 0).then_some(start - HOUR),
                }
            })
            .collect();
        dir = dir.with_room("F1", room, bookings);
    }
    dir
}

#[tokio::main]
async fn main() {
    println!("roomboard stress: {ROOMS} rooms x {BOOKINGS_PER_ROOM} bookings");

    let board = RoomBoard::new(Arc::new(directory()), BoardConfig::default());
    let started = Instant::now();
    if let Err(e) = board.refresh("F1", None).await {
        eprintln!("refresh failed: {e}");
        return;
    }
    println!("  refresh: {:.2}ms", started.elapsed().as_secs_f64() * 1000.0);

    let rooms = board.snapshot().await;
    let filters = [
        FilterState::default(),
        FilterState {
            room_status: Some(StatusFilter::Available),
            ..FilterState::default()
        },
        FilterState {
            areas: ["North".to_string(), "East".to_string()].into(),
            capacities: [10, 20].into(),
            room_status: Some(StatusFilter::Occupied),
            ..FilterState::default()
        },
    ];

    for (i, filter) in filters.iter().enumerate() {
        let mut latencies = Vec::with_capacity(ITERATIONS);
        let mut kept = 0;
        for n in 0..ITERATIONS {
            let start = DAY_START + (n as Ms % 24) * HOUR;
            let window = Span::new(start, start + HOUR / 2);
            let t = Instant::now();
            kept = filter_rooms_in(&rooms, filter, &window).len();
            latencies.push(t.elapsed());
        }
        print_latency(&format!("filter #{i} (last kept {kept})"), &mut latencies);
    }
}
