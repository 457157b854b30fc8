use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Search criteria for one calendar day on a route. Timestamps are stored
/// in UTC; `offset` is the display zone's UTC offset for that day and
/// drives both the day window and the formatted local times.
#[derive(Debug, Clone)]
pub struct FlightSearch {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub cabin: Option<String>,
    pub offset: FixedOffset,
}

impl FlightSearch {
    /// UTC half-open window [start, end) covering the local calendar day.
    pub fn utc_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let local_midnight = self.date.and_time(NaiveTime::MIN);
        let start = local_midnight - Duration::seconds(self.offset.local_minus_utc() as i64);
        (start, start + Duration::days(1))
    }
}

/// Rolling-window availability criteria: `days` consecutive days from `from`.
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    pub origin: String,
    pub destination: String,
    pub from: NaiveDate,
    pub days: u32,
    pub offset: FixedOffset,
}

impl AvailabilityQuery {
    pub fn utc_window(&self) -> (NaiveDateTime, NaiveDateTime) {
        let local_midnight = self.from.and_time(NaiveTime::MIN);
        let start = local_midnight - Duration::seconds(self.offset.local_minus_utc() as i64);
        (start, start + Duration::days(self.days as i64))
    }
}

/// One joined row of trip × trip-fare, as read from storage. A trip with
/// no priced fares yields a single row with the fare columns unset.
#[derive(Debug, Clone)]
pub struct TripFareRow {
    pub trip_id: i64,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub status: String,
    pub origin_code: String,
    pub origin_city: String,
    pub origin_name: String,
    pub dest_code: String,
    pub dest_city: String,
    pub dest_name: String,
    pub operator: String,
    pub operator_logo: Option<String>,
    pub aircraft_model: Option<String>,
    pub registration: Option<String>,
    pub fare_id: Option<i64>,
    pub price: Option<i64>,
    pub quota: Option<i64>,
}

/// One element of the search response, aggregated per trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSummary {
    #[serde(rename = "idViaje")]
    pub trip_id: i64,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "horaSalida")]
    pub departure_time: String,
    #[serde(rename = "horaLlegada")]
    pub arrival_time: String,
    #[serde(rename = "duracion")]
    pub duration_min: i64,
    #[serde(rename = "origenCodigo")]
    pub origin_code: String,
    #[serde(rename = "origenCiudad")]
    pub origin_city: String,
    #[serde(rename = "origenNombre")]
    pub origin_name: String,
    #[serde(rename = "destinoCodigo")]
    pub dest_code: String,
    #[serde(rename = "destinoCiudad")]
    pub dest_city: String,
    #[serde(rename = "destinoNombre")]
    pub dest_name: String,
    #[serde(rename = "empresa")]
    pub operator: String,
    #[serde(rename = "empresaLogo")]
    pub operator_logo: Option<String>,
    #[serde(rename = "modelo")]
    pub aircraft_model: Option<String>,
    #[serde(rename = "matricula")]
    pub registration: Option<String>,
    #[serde(rename = "precio")]
    pub min_price: Option<i64>,
    #[serde(rename = "tarifasDisponibles")]
    pub fare_count: i64,
    #[serde(rename = "asientosDisponibles")]
    pub seat_quota: Option<i64>,
    #[serde(rename = "estado")]
    pub status: String,
}

/// Aggregate joined rows into one summary per trip: minimum fare price,
/// count of distinct fares, total remaining quota. Trips without priced
/// fares keep null price/quota. Ordering: minimum price ascending with
/// unpriced trips first, trip id as tie-break.
pub fn summarize_search(rows: Vec<TripFareRow>, offset: FixedOffset) -> Vec<FlightSummary> {
    struct Acc {
        head: TripFareRow,
        fares: BTreeSet<i64>,
        min_price: Option<i64>,
        quota: Option<i64>,
    }

    let mut trips: BTreeMap<i64, Acc> = BTreeMap::new();
    for row in rows {
        let acc = trips.entry(row.trip_id).or_insert_with(|| Acc {
            head: row.clone(),
            fares: BTreeSet::new(),
            min_price: None,
            quota: None,
        });
        if let Some(fare_id) = row.fare_id {
            acc.fares.insert(fare_id);
        }
        if let Some(price) = row.price {
            acc.min_price = Some(acc.min_price.map_or(price, |p| p.min(price)));
        }
        if let Some(quota) = row.quota {
            acc.quota = Some(acc.quota.unwrap_or(0) + quota);
        }
    }

    let mut out: Vec<FlightSummary> = trips
        .into_values()
        .map(|acc| {
            let local_dep = acc.head.departure + Duration::seconds(offset.local_minus_utc() as i64);
            let local_arr = acc.head.arrival + Duration::seconds(offset.local_minus_utc() as i64);
            FlightSummary {
                trip_id: acc.head.trip_id,
                date: local_dep.format("%Y-%m-%d").to_string(),
                departure_time: local_dep.format("%H:%M").to_string(),
                arrival_time: local_arr.format("%H:%M").to_string(),
                duration_min: (acc.head.arrival - acc.head.departure).num_minutes(),
                origin_code: acc.head.origin_code,
                origin_city: acc.head.origin_city,
                origin_name: acc.head.origin_name,
                dest_code: acc.head.dest_code,
                dest_city: acc.head.dest_city,
                dest_name: acc.head.dest_name,
                operator: acc.head.operator,
                operator_logo: acc.head.operator_logo,
                aircraft_model: acc.head.aircraft_model,
                registration: acc.head.registration,
                min_price: acc.min_price,
                fare_count: acc.fares.len() as i64,
                seat_quota: acc.quota,
                status: acc.head.status,
            }
        })
        .collect();

    out.sort_by(|a, b| match (a.min_price, b.min_price) {
        (None, None) => a.trip_id.cmp(&b.trip_id),
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y).then(a.trip_id.cmp(&b.trip_id)),
    });
    out
}

/// Input row for the day-granularity availability fold.
#[derive(Debug, Clone)]
pub struct AvailabilityRow {
    pub trip_id: i64,
    pub departure: NaiveDateTime,
    pub price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayAvailability {
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "vuelos")]
    pub flights: i64,
    #[serde(rename = "minPrecio")]
    pub min_price: Option<i64>,
}

/// Per local calendar day: distinct trip count and minimum fare price,
/// ordered by date ascending. Days without trips are omitted.
pub fn summarize_availability(rows: Vec<AvailabilityRow>, offset: FixedOffset) -> Vec<DayAvailability> {
    let mut days: BTreeMap<NaiveDate, (BTreeSet<i64>, Option<i64>)> = BTreeMap::new();
    for row in rows {
        let local = row.departure + Duration::seconds(offset.local_minus_utc() as i64);
        let entry = days.entry(local.date()).or_default();
        entry.0.insert(row.trip_id);
        if let Some(price) = row.price {
            entry.1 = Some(entry.1.map_or(price, |p| p.min(price)));
        }
    }

    days.into_iter()
        .map(|(date, (trips, min_price))| DayAvailability {
            date: date.format("%Y-%m-%d").to_string(),
            flights: trips.len() as i64,
            min_price,
        })
        .collect()
}

/// Detail header for a single trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripInfo {
    #[serde(rename = "idViaje")]
    pub trip_id: i64,
    #[serde(rename = "salida")]
    pub departure: NaiveDateTime,
    #[serde(rename = "llegada")]
    pub arrival: NaiveDateTime,
    #[serde(rename = "estado")]
    pub status: String,
    #[serde(rename = "origenCodigo")]
    pub origin_code: String,
    #[serde(rename = "origenCiudad")]
    pub origin_city: String,
    #[serde(rename = "origenNombre")]
    pub origin_name: String,
    #[serde(rename = "destinoCodigo")]
    pub dest_code: String,
    #[serde(rename = "destinoCiudad")]
    pub dest_city: String,
    #[serde(rename = "destinoNombre")]
    pub dest_name: String,
    #[serde(rename = "empresa")]
    pub operator: String,
    #[serde(rename = "empresaLogo")]
    pub operator_logo: Option<String>,
    #[serde(rename = "modelo")]
    pub aircraft_model: Option<String>,
    #[serde(rename = "capacidad")]
    pub capacity: Option<i64>,
    #[serde(rename = "distanciaKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "duracionEstimadaMin")]
    pub est_duration_min: Option<i64>,
}

/// Active terminal as listed by the destinations endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    #[serde(rename = "idTerminal")]
    pub terminal_id: i64,
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "nombreTerminal")]
    pub name: String,
    #[serde(rename = "imagen")]
    pub image: Option<String>,
    #[serde(rename = "tipo")]
    pub kind: String,
}

/// City-to-code resolution result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalRef {
    #[serde(rename = "codigo")]
    pub code: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "nombreTerminal")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn row(trip_id: i64, fare_id: Option<i64>, price: Option<i64>, quota: Option<i64>) -> TripFareRow {
        TripFareRow {
            trip_id,
            departure: dt("2025-11-03 10:00:00"),
            arrival: dt("2025-11-03 12:15:00"),
            status: "programado".to_string(),
            origin_code: "SCL".to_string(),
            origin_city: "Santiago".to_string(),
            origin_name: "Arturo Merino Benítez".to_string(),
            dest_code: "LIM".to_string(),
            dest_city: "Lima".to_string(),
            dest_name: "Jorge Chávez".to_string(),
            operator: "AirLink".to_string(),
            operator_logo: None,
            aircraft_model: Some("A320".to_string()),
            registration: Some("CC-BAA".to_string()),
            fare_id,
            price,
            quota,
        }
    }

    #[test]
    fn one_trip_two_fares_aggregates_min_price_and_fare_count() {
        let rows = vec![
            row(7, Some(1), Some(59900), Some(40)),
            row(7, Some(2), Some(74900), Some(12)),
        ];
        let out = summarize_search(rows, utc());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].min_price, Some(59900));
        assert_eq!(out[0].fare_count, 2);
        assert_eq!(out[0].seat_quota, Some(52));
        assert_eq!(out[0].departure_time, "10:00");
        assert_eq!(out[0].duration_min, 135);
    }

    #[test]
    fn unpriced_trip_keeps_null_aggregates_and_sorts_first() {
        let rows = vec![
            row(2, Some(9), Some(45000), Some(10)),
            row(3, None, None, None),
        ];
        let out = summarize_search(rows, utc());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].trip_id, 3);
        assert_eq!(out[0].min_price, None);
        assert_eq!(out[0].fare_count, 0);
        assert_eq!(out[0].seat_quota, None);
        assert_eq!(out[1].trip_id, 2);
    }

    #[test]
    fn price_ties_break_by_trip_id() {
        let rows = vec![
            row(12, Some(1), Some(30000), Some(5)),
            row(4, Some(2), Some(30000), Some(5)),
        ];
        let out = summarize_search(rows, utc());
        assert_eq!(out[0].trip_id, 4);
        assert_eq!(out[1].trip_id, 12);
    }

    #[test]
    fn local_times_follow_the_offset() {
        let rows = vec![row(1, Some(1), Some(1000), Some(1))];
        let minus_three = FixedOffset::west_opt(3 * 3600).unwrap();
        let out = summarize_search(rows, minus_three);
        assert_eq!(out[0].departure_time, "07:00");
        assert_eq!(out[0].date, "2025-11-03");
    }

    #[test]
    fn availability_groups_by_local_day() {
        let rows = vec![
            AvailabilityRow { trip_id: 1, departure: dt("2025-11-03 09:00:00"), price: Some(87990) },
            AvailabilityRow { trip_id: 1, departure: dt("2025-11-03 09:00:00"), price: Some(99990) },
            AvailabilityRow { trip_id: 2, departure: dt("2025-11-03 18:00:00"), price: Some(91000) },
            AvailabilityRow { trip_id: 3, departure: dt("2025-11-04 08:00:00"), price: None },
        ];
        let out = summarize_availability(rows, utc());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, "2025-11-03");
        assert_eq!(out[0].flights, 2);
        assert_eq!(out[0].min_price, Some(87990));
        assert_eq!(out[1].date, "2025-11-04");
        assert_eq!(out[1].flights, 1);
        assert_eq!(out[1].min_price, None);
    }

    #[test]
    fn utc_window_covers_the_local_day() {
        let search = FlightSearch {
            origin: "SCL".to_string(),
            destination: "LIM".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 11, 3).unwrap(),
            cabin: None,
            offset: FixedOffset::west_opt(3 * 3600).unwrap(),
        };
        let (start, end) = search.utc_window();
        assert_eq!(start, dt("2025-11-03 03:00:00"));
        assert_eq!(end, dt("2025-11-04 03:00:00"));
    }
}
