use crate::{
    types::{AppError, AvailabilityResponse, Booking, BookingRequest, BookingResponse, Result},
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    /// `YYYY-MM-DD`
    pub date: String,
}

/// Book a one-hour consultation
#[utoipa::path(
    post,
    path = "/api/v1/booking/appointment",
    request_body = BookingRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = BookingResponse),
        (status = 400, description = "Invalid request or slot not available")
    ),
    tag = "booking"
)]
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(payload): Json<BookingRequest>,
) -> Result<Json<BookingResponse>> {
    Ok(Json(state.bookings.book(&payload).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/booking/appointments/{email}",
    params(("email" = String, Path, description = "Email used when booking")),
    responses((status = 200, description = "Bookings for the email", body = [Booking])),
    tag = "booking"
)]
pub async fn list_appointments(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Vec<Booking>>> {
    Ok(Json(state.bookings.bookings_for(&email).await?))
}

/// Free business-hour slots on a date
#[utoipa::path(
    get,
    path = "/api/v1/booking/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots", body = AvailabilityResponse),
        (status = 400, description = "Malformed date")
    ),
    tag = "booking"
)]
pub async fn availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>> {
    let date = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput("date must be YYYY-MM-DD".to_string()))?;
    let available_slots = state.bookings.availability(date).await?;
    Ok(Json(AvailabilityResponse {
        date,
        available_slots,
    }))
}
