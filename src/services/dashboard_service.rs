//! Agregación del dashboard
//!
//! Contadores por estado, visión general de los próximos siete días y los
//! viajes en andamento. Las fechas de los buckets se calculan en el offset
//! de negocio configurado (`BUSINESS_UTC_OFFSET_HOURS`).

use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc, Weekday};
use tracing::debug;

use crate::dto::dashboard_dto::{
    DashboardCounts, DashboardResponse, OverviewDay, TripEndpoint, TripInProgress,
};
use crate::models::trip::{Trip, TripStatus};
use crate::repositories::trip_repository::{InProgressTrip, TripRepository};
use crate::state::AppState;
use crate::utils::errors::{ActionKind, AppResult};
use crate::utils::validation::format_state;

pub const OVERVIEW_DAYS: i64 = 7;
pub const IN_PROGRESS_LIMIT: i64 = 5;

pub struct DashboardService {
    trips: Arc<dyn TripRepository>,
    offset: FixedOffset,
}

impl DashboardService {
    pub fn new(state: &AppState) -> Self {
        Self {
            trips: state.repositories.trips.clone(),
            offset: state.config.business_offset(),
        }
    }

    pub async fn load(&self, now: DateTime<Utc>) -> AppResult<DashboardResponse> {
        self.try_load(now)
            .await
            .map_err(|e| e.for_action(ActionKind::Load))
    }

    async fn try_load(&self, now: DateTime<Utc>) -> AppResult<DashboardResponse> {
        let window_end = now + Duration::days(OVERVIEW_DAYS);
        let (counts, upcoming, in_progress) = futures::try_join!(
            self.trips.dashboard_counts(now),
            self.trips.scheduled_between(now, window_end),
            self.trips.in_progress(IN_PROGRESS_LIMIT),
        )?;

        debug!(
            "📊 Dashboard: {} programadas, {} em andamento, {} próximas",
            counts.scheduled,
            counts.in_progress,
            upcoming.len()
        );

        Ok(DashboardResponse {
            counts,
            overview: weekly_overview(&upcoming, now, self.offset),
            in_progress: in_progress.into_iter().map(TripInProgress::from).collect(),
        })
    }
}

/// Contadores sobre los viajes creados hasta `now`.
///
/// Los no-rascunho se reparten entre programadas, em andamento y
/// finalizadas; los rascunhos se cuentan aparte.
pub fn tally_counts<'a>(
    trips: impl IntoIterator<Item = &'a Trip>,
    now: DateTime<Utc>,
) -> DashboardCounts {
    let mut counts = DashboardCounts::default();
    for trip in trips.into_iter().filter(|t| t.created_at <= now) {
        if trip.draft {
            counts.drafts += 1;
            continue;
        }
        match trip.status {
            TripStatus::Scheduled => counts.scheduled += 1,
            TripStatus::Finished => counts.finished += 1,
            _ => counts.in_progress += 1,
        }
    }
    counts
}

/// Siete buckets desde hoy (hora local de negocio). Cada salida o llegada
/// dentro de `[now, now + 7 días)` cae en el bucket de su día de la semana.
pub fn weekly_overview<'a>(
    trips: impl IntoIterator<Item = &'a Trip>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Vec<OverviewDay> {
    let today = now.with_timezone(&offset).date_naive();
    let mut days: Vec<OverviewDay> = (0..OVERVIEW_DAYS)
        .map(|i| {
            let date = today + Duration::days(i);
            OverviewDay {
                weekday: weekday_label(date),
                date,
                departures: 0,
                arrivals: 0,
            }
        })
        .collect();

    let window_end = now + Duration::days(OVERVIEW_DAYS);
    let bucket = |at: Option<DateTime<Utc>>| -> Option<usize> {
        let at = at.filter(|at| *at >= now && *at < window_end)?;
        let weekday = at.with_timezone(&offset).weekday();
        Some(
            (weekday.num_days_from_monday() as usize + 7
                - today.weekday().num_days_from_monday() as usize)
                % 7,
        )
    };

    for trip in trips.into_iter().filter(|t| !t.draft) {
        if let Some(i) = bucket(trip.departed_at) {
            days[i].departures += 1;
        }
        if let Some(i) = bucket(trip.arrived_at) {
            days[i].arrivals += 1;
        }
    }

    days
}

/// "seg. 19/10"
pub fn weekday_label(date: NaiveDate) -> String {
    let weekday = match date.weekday() {
        Weekday::Mon => "seg.",
        Weekday::Tue => "ter.",
        Weekday::Wed => "qua.",
        Weekday::Thu => "qui.",
        Weekday::Fri => "sex.",
        Weekday::Sat => "sáb.",
        Weekday::Sun => "dom.",
    };
    format!("{} {}", weekday, date.format("%d/%m"))
}

/// "CURITIBA, PR"
fn location(city: Option<String>, state: Option<String>) -> Option<String> {
    match (city, format_state(state.as_deref())) {
        (Some(city), Some(uf)) => Some(format!("{}, {}", city, uf)),
        (Some(city), None) => Some(city),
        (None, uf) => uf,
    }
}

impl From<InProgressTrip> for TripInProgress {
    fn from(trip: InProgressTrip) -> Self {
        Self {
            id: trip.id,
            status: trip.status,
            truck_plate: trip.truck_plate,
            trailer_plates: trip.trailer_plates,
            origin: TripEndpoint {
                name: trip.origin_name,
                location: location(trip.origin_city, trip.origin_state),
            },
            destination: TripEndpoint {
                name: trip.destination_name,
                location: location(trip.destination_city, trip.destination_state),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::models::trip::TripFields;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn trip(status: TripStatus, draft: bool, created_at: DateTime<Utc>) -> Trip {
        let fields = TripFields {
            status,
            draft,
            ..TripFields::default()
        };
        Trip::from_fields(Uuid::new_v4(), &fields, created_at)
    }

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_counts_partition_non_draft_trips() {
        let now = at("2026-10-19T12:00:00Z");
        let before = now - Duration::days(1);
        let trips: Vec<Trip> = TripStatus::ALL
            .into_iter()
            .map(|status| trip(status, false, before))
            .chain([
                trip(TripStatus::Scheduled, true, before),
                trip(TripStatus::Loaded, true, before),
                trip(TripStatus::Scheduled, false, now + Duration::hours(1)),
            ])
            .collect();

        let counts = tally_counts(&trips, now);
        assert_eq!(counts.scheduled, 1);
        assert_eq!(counts.in_progress, 4);
        assert_eq!(counts.finished, 1);
        assert_eq!(counts.drafts, 2);
        assert_eq!(
            counts.scheduled + counts.in_progress + counts.finished,
            TripStatus::ALL.len() as i64
        );
    }

    #[test]
    fn test_weekday_labels() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(weekday_label(date), "seg. 19/10");
        assert_eq!(weekday_label(date + Duration::days(5)), "sáb. 24/10");
        assert_eq!(weekday_label(date + Duration::days(6)), "dom. 25/10");
    }

    #[test]
    fn test_overview_starts_today_in_business_offset() {
        // 01:00 UTC ainda é domingo em -03:00
        let now = at("2026-10-19T01:00:00Z");
        let overview = weekly_overview(std::iter::empty(), now, brt());
        assert_eq!(overview.len(), 7);
        assert_eq!(overview[0].weekday, "dom. 18/10");
        assert_eq!(overview[6].weekday, "sáb. 24/10");
    }

    #[test]
    fn test_overview_buckets_by_local_weekday() {
        let now = at("2026-10-19T12:00:00Z");
        let mut upcoming = trip(TripStatus::Scheduled, false, now);
        // 23:00 local de segunda
        upcoming.departed_at = Some(at("2026-10-20T02:00:00Z"));
        // segunda seguinte, ainda dentro da janela de 7 dias
        upcoming.arrived_at = Some(at("2026-10-26T11:00:00Z"));

        let mut draft = trip(TripStatus::Scheduled, true, now);
        draft.departed_at = Some(at("2026-10-21T12:00:00Z"));

        let mut past = trip(TripStatus::Loaded, false, now);
        past.departed_at = Some(now - Duration::hours(1));
        past.arrived_at = Some(at("2026-10-22T15:00:00Z"));

        let overview = weekly_overview([&upcoming, &draft, &past], now, brt());
        assert_eq!(overview[0].departures, 1);
        assert_eq!(overview[0].arrivals, 1);
        assert_eq!(overview[3].arrivals, 1);

        let departures: i64 = overview.iter().map(|d| d.departures).sum();
        let arrivals: i64 = overview.iter().map(|d| d.arrivals).sum();
        assert_eq!(departures, 1);
        assert_eq!(arrivals, 2);
    }

    #[test]
    fn test_in_progress_location() {
        let trip = InProgressTrip {
            id: Uuid::new_v4(),
            status: TripStatus::Departure,
            truck_plate: Some("ABC-1234".into()),
            trailer_plates: Some("OPQ-5678 | RST-9012".into()),
            origin_name: Some("CIMENTOS SUL".into()),
            origin_city: Some("CURITIBA".into()),
            origin_state: Some("PARANÁ".into()),
            destination_name: None,
            destination_city: None,
            destination_state: Some("sc".into()),
        };

        let summary = TripInProgress::from(trip);
        assert_eq!(summary.origin.location.as_deref(), Some("CURITIBA, PR"));
        assert_eq!(summary.destination.location.as_deref(), Some("SC"));
    }

    #[tokio::test]
    async fn test_load_from_memory_state() {
        let state = AppState::in_memory();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        let dashboard = DashboardService::new(&state).load(now).await.unwrap();
        assert_eq!(dashboard.counts, DashboardCounts::default());
        assert_eq!(dashboard.overview.len(), 7);
        assert_eq!(dashboard.overview[0].weekday, "seg. 19/10");
        assert!(dashboard.in_progress.is_empty());
    }
}
