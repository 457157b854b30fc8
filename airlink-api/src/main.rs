use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use airlink_api::{app, state::{AppState, AuthConfig, BookingConfig, SearchConfig}};
use airlink_core::seatmap::RowBlockPlanner;
use airlink_store::{
    AirportsClient, CountriesClient, DbClient, DpaClient, GeocodingClient, MySqlCouponRepository,
    MySqlFareRepository, MySqlFlightRepository, MySqlReservationRepository, MySqlSeatRepository,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airlink_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = airlink_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting AirLink API on port {}", config.server.port);

    // MySQL Connection
    let db = DbClient::new(&config.database)
        .await
        .expect("Failed to connect to MySQL");
    db.migrate().await.expect("Failed to run migrations");

    // Upstream HTTP client
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.upstream.http_timeout_seconds))
        .build()
        .expect("Failed to build HTTP client");
    let cache_ttl = Duration::from_secs(config.upstream.cache_ttl_seconds);

    let app_state = AppState {
        flights: Arc::new(MySqlFlightRepository::new(db.pool.clone())),
        fares: Arc::new(MySqlFareRepository::new(db.pool.clone())),
        seats: Arc::new(MySqlSeatRepository::new(db.pool.clone())),
        reservations: Arc::new(MySqlReservationRepository::new(db.pool.clone())),
        coupons: Arc::new(MySqlCouponRepository::new(db.pool.clone())),
        planner: Arc::new(RowBlockPlanner),
        dpa: Arc::new(DpaClient::new(http.clone(), config.upstream.dpa_base.clone(), cache_ttl)),
        airports: Arc::new(AirportsClient::new(
            http.clone(),
            config.upstream.airports_csv.clone(),
            cache_ttl,
        )),
        countries: Arc::new(CountriesClient::new(http.clone(), config.upstream.countries_base.clone())),
        geocoding: Arc::new(GeocodingClient::new(http, config.upstream.geocoding_base.clone())),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
        search: SearchConfig {
            default_origin: config.search.default_origin.clone(),
            availability_days: config.search.availability_days,
        },
        booking: BookingConfig {
            min_total_after_discount: config.booking.min_total_after_discount,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
