use async_trait::async_trait;

use crate::booking::{CheckinCode, ReservationDetail, ReservationRecord, SeatCharge};
use crate::coupon::Coupon;
use crate::fare::FareOffer;
use crate::flight::{
    AvailabilityQuery, DayAvailability, Destination, FlightSearch, FlightSummary, TerminalRef,
    TripInfo,
};
use crate::seat::{SeatPick, SeatRecord};
use crate::seatmap::PlannedSeat;

/// Failure surface of the storage and upstream layers. Route handlers
/// map these onto the HTTP error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("{0}")]
    ReservationFailed(String),
}

#[async_trait]
pub trait FlightRepository: Send + Sync {
    async fn search(&self, search: &FlightSearch) -> Result<Vec<FlightSummary>, StoreError>;

    async fn daily_availability(
        &self,
        query: &AvailabilityQuery,
    ) -> Result<Vec<DayAvailability>, StoreError>;

    async fn trip_detail(&self, trip_id: i64) -> Result<Option<TripInfo>, StoreError>;

    async fn list_destinations(&self) -> Result<Vec<Destination>, StoreError>;

    /// First terminal whose city matches the query as a case-insensitive
    /// substring, the canonical destination-resolution step.
    async fn terminal_by_city(&self, city: &str) -> Result<Option<TerminalRef>, StoreError>;
}

#[async_trait]
pub trait FareRepository: Send + Sync {
    /// Active fares sold on a trip, ordered by ascending price.
    async fn fares_for_trip(&self, trip_id: i64) -> Result<Vec<FareOffer>, StoreError>;
}

#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn seats_for_trip(&self, trip_id: i64) -> Result<Vec<SeatRecord>, StoreError>;

    /// Equipment capacity for a trip; `None` when the trip is absent.
    async fn trip_capacity(&self, trip_id: i64) -> Result<Option<i64>, StoreError>;

    /// Persist a generated layout. Idempotent under the unique
    /// (trip, seat number) key; returns the number of rows inserted.
    async fn insert_layout(&self, trip_id: i64, seats: &[PlannedSeat]) -> Result<u64, StoreError>;

    /// Reserve the given seats for a passenger inside one transaction:
    /// all seats flip to unavailable and get linked, or none do.
    async fn reserve(&self, passenger_id: i64, picks: &[SeatPick]) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn detail(&self, reservation_id: i64) -> Result<Option<ReservationDetail>, StoreError>;

    async fn for_user(&self, user_id: i64) -> Result<Vec<ReservationRecord>, StoreError>;

    async fn find_for_checkin(
        &self,
        code: &CheckinCode,
        last_name: &str,
    ) -> Result<Option<(ReservationRecord, Vec<SeatCharge>)>, StoreError>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    async fn by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Coupon>, StoreError>;
}
