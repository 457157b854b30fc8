use std::sync::Arc;

use airlink_core::repository::{
    CouponRepository, FareRepository, FlightRepository, ReservationRepository, SeatRepository,
};
use airlink_core::seatmap::SeatPlanner;
use airlink_store::{AirportsClient, CountriesClient, DpaClient, GeocodingClient};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

#[derive(Clone)]
pub struct SearchConfig {
    pub default_origin: String,
    pub availability_days: u32,
}

#[derive(Clone)]
pub struct BookingConfig {
    pub min_total_after_discount: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<dyn FlightRepository>,
    pub fares: Arc<dyn FareRepository>,
    pub seats: Arc<dyn SeatRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub planner: Arc<dyn SeatPlanner>,
    pub dpa: Arc<DpaClient>,
    pub airports: Arc<AirportsClient>,
    pub countries: Arc<CountriesClient>,
    pub geocoding: Arc<GeocodingClient>,
    pub auth: AuthConfig,
    pub search: SearchConfig,
    pub booking: BookingConfig,
}
