pub mod app_config;
pub mod cache;
pub mod coupon_repo;
pub mod database;
pub mod fare_repo;
pub mod flight_repo;
pub mod geo;
pub mod reservation_repo;
pub mod seat_repo;

pub use cache::TtlCache;
pub use coupon_repo::MySqlCouponRepository;
pub use database::DbClient;
pub use fare_repo::MySqlFareRepository;
pub use flight_repo::MySqlFlightRepository;
pub use geo::{AirportsClient, CountriesClient, DpaClient, GeocodingClient};
pub use reservation_repo::MySqlReservationRepository;
pub use seat_repo::MySqlSeatRepository;
