/// Application state and router builder
///
/// Public routes (health, auth, hotel and room browsing) are served as-is.
/// Everything else passes through [`jwt_auth_layer`], which puts an
/// `AuthContext` into the request extensions. Admin checks happen in the
/// handlers.

use crate::{
    config::{Config, PaymentProvider},
    error::ApiError,
    middleware::security::SecurityHeadersLayer,
    routes::{auth, health, hotels, payments, reservations, rooms, users},
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post, put},
    Router,
};
use bookify_payments::{MockGateway, PayPalConfig, PayPalGateway, PaymentGateway};
use bookify_shared::auth::middleware::authenticate_bearer;
use bookify_shared::booking::BookingService;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub bookings: BookingService,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, payments: Arc<dyn PaymentGateway>) -> Self {
        Self {
            bookings: BookingService::new(db.clone()),
            db,
            config: Arc::new(config),
            payments,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Currency used for gateway orders
    pub fn currency(&self) -> &str {
        &self.config.payments.currency
    }

    /// Current calendar date (UTC) for booking rules
    pub fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Builds the payment gateway selected by configuration
pub fn build_gateway(config: &Config) -> anyhow::Result<Arc<dyn PaymentGateway>> {
    let gateway: Arc<dyn PaymentGateway> = match config.payments.provider {
        PaymentProvider::PayPal => Arc::new(PayPalGateway::new(PayPalConfig {
            client_id: config.payments.paypal_client_id.clone(),
            client_secret: config.payments.paypal_client_secret.clone(),
            base_url: config.payments.paypal_base_url.clone(),
        })?),
        PaymentProvider::Mock => Arc::new(MockGateway::new()),
    };

    info!(provider = gateway.name(), "Payment gateway configured");
    Ok(gateway)
}

/// Builds the application router
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/hotels", get(hotels::list_hotels))
        .route("/hotels/:id", get(hotels::get_hotel))
        .route("/rooms", get(rooms::list_rooms))
        .route("/rooms/:id", get(rooms::get_room))
        .route("/rooms/hotel/:hotel_id", get(rooms::list_rooms_by_hotel))
        .route("/rooms/:id/availability", get(rooms::check_availability));

    let protected_routes = Router::new()
        // Hotels (admin)
        .route("/hotels", post(hotels::create_hotel))
        .route(
            "/hotels/:id",
            put(hotels::update_hotel).delete(hotels::delete_hotel),
        )
        // Rooms (admin)
        .route("/rooms", post(rooms::create_room))
        .route("/rooms/:id", put(rooms::update_room).delete(rooms::delete_room))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/consult/:email", get(users::consult_user))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Reservations
        .route(
            "/reservations",
            get(reservations::list_reservations).post(reservations::create_reservation),
        )
        .route("/reservations/:id", get(reservations::get_reservation))
        .route("/reservations/:id/status", put(reservations::update_status))
        // Payments
        .route(
            "/payments",
            get(payments::list_payments).post(payments::record_payment),
        )
        .route("/api/payment/create-order", post(payments::create_order))
        .route("/api/payment/capture-order", post(payments::capture_order))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allows_any() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware
///
/// Validates the `Authorization: Bearer <access token>` header and inserts
/// the resulting `AuthContext` into the request extensions.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let auth = authenticate_bearer(authorization, state.jwt_secret())?;
    request.extensions_mut().insert(auth);

    Ok(next.run(request).await)
}
