//! Consultation bookings.
//!
//! Consultations are one hour long and start on the hour, Monday to Friday,
//! within `[business].hours_start..hours_end`. A slot holds one confirmed
//! booking.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use tracing::info;
use uuid::Uuid;

use crate::db::TursoClient;
use crate::types::{AppError, Booking, BookingRequest, BookingResponse, Result};
use crate::utils::toml_config::{BusinessConfig, ConfigManager};

pub const STATUS_CONFIRMED: &str = "confirmed";

/// Start times of every business-hour slot, formatted `HH:MM`.
pub fn business_slots(hours_start: u32, hours_end: u32) -> Vec<String> {
    (hours_start..hours_end.min(24))
        .map(|hour| format!("{:02}:00", hour))
        .collect()
}

/// Parse an `HH:MM` start time that falls on the hour.
pub fn parse_slot(value: &str) -> Result<NaiveTime> {
    let time = NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| AppError::InvalidInput(format!("Invalid time '{}', expected HH:MM", value)))?;
    if time.minute() != 0 {
        return Err(AppError::InvalidInput(
            "Consultations start on the hour".to_string(),
        ));
    }
    Ok(time)
}

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Free slots on `date` given the bookings already made that day.
pub fn free_slots(date: NaiveDate, booked: &[Booking], hours_start: u32, hours_end: u32) -> Vec<String> {
    if !is_business_day(date) {
        return Vec::new();
    }
    let taken: Vec<String> = booked
        .iter()
        .filter(|b| b.status == STATUS_CONFIRMED && b.scheduled_at.date_naive() == date)
        .map(|b| b.scheduled_at.format("%H:%M").to_string())
        .collect();
    business_slots(hours_start, hours_end)
        .into_iter()
        .filter(|slot| !taken.contains(slot))
        .collect()
}

/// Books consultations against the store, using the business hours of the
/// live configuration.
pub struct BookingService {
    db: Arc<TursoClient>,
    config: Arc<ConfigManager>,
}

impl BookingService {
    pub fn new(db: Arc<TursoClient>, config: Arc<ConfigManager>) -> Self {
        Self { db, config }
    }

    fn hours(&self) -> BusinessConfig {
        self.config.config().business.clone()
    }

    pub async fn availability(&self, date: NaiveDate) -> Result<Vec<String>> {
        let hours = self.hours();
        let booked = self.db.get_bookings_on(date).await?;
        Ok(free_slots(date, &booked, hours.hours_start, hours.hours_end))
    }

    pub async fn book(&self, request: &BookingRequest) -> Result<BookingResponse> {
        self.validate(request)?;
        let time = parse_slot(&request.preferred_time)?;
        let slot = format!("{:02}:00", time.hour());
        let unavailable = || {
            AppError::InvalidInput(format!(
                "The {} slot on {} is not available",
                slot, request.preferred_date
            ))
        };

        if !self.availability(request.preferred_date).await?.contains(&slot) {
            return Err(unavailable());
        }

        let scheduled_at = request.preferred_date.and_time(time).and_utc();
        let booking = Booking {
            id: format!("BOOK-{}", &Uuid::new_v4().simple().to_string()[..8].to_uppercase()),
            user_name: request.user_name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            course_name: request.course_name.trim().to_string(),
            scheduled_at,
            status: STATUS_CONFIRMED.to_string(),
            message: request.message.clone(),
            created_at: Utc::now(),
        };
        // A concurrent request may have taken the slot since the check above
        if !self.db.create_booking(&booking).await? {
            return Err(unavailable());
        }
        info!(booking_id = %booking.id, scheduled_at = %scheduled_at, "Consultation booked");

        Ok(BookingResponse {
            booking_id: booking.id,
            status: booking.status,
            scheduled_date: scheduled_at,
            message: "Appointment booked successfully".to_string(),
        })
    }

    pub async fn bookings_for(&self, email: &str) -> Result<Vec<Booking>> {
        self.db.get_bookings_by_email(email.trim()).await
    }

    fn validate(&self, request: &BookingRequest) -> Result<()> {
        if request.user_name.trim().is_empty() || request.course_name.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "user_name and course_name are required".to_string(),
            ));
        }
        if !request.email.contains('@') {
            return Err(AppError::InvalidInput("A valid email is required".to_string()));
        }
        if request.preferred_date < Utc::now().date_naive() {
            return Err(AppError::InvalidInput(
                "preferred_date is in the past".to_string(),
            ));
        }
        if !is_business_day(request.preferred_date) {
            return Err(AppError::InvalidInput(
                "Consultations are available Monday to Friday".to_string(),
            ));
        }
        let hour = parse_slot(&request.preferred_time)?.hour();
        let hours = self.hours();
        if hour < hours.hours_start || hour >= hours.hours_end {
            return Err(AppError::InvalidInput(format!(
                "Consultations run between {:02}:00 and {:02}:00",
                hours.hours_start, hours.hours_end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::ChatbotxConfig;
    use chrono::Duration;

    fn next_weekday() -> NaiveDate {
        let mut date = Utc::now().date_naive() + Duration::days(1);
        while !is_business_day(date) {
            date += Duration::days(1);
        }
        date
    }

    fn request(date: NaiveDate, time: &str) -> BookingRequest {
        BookingRequest {
            user_name: "Ada".to_string(),
            email: "Ada@Example.com".to_string(),
            course_name: "Introduction to Programming".to_string(),
            preferred_date: date,
            preferred_time: time.to_string(),
            message: None,
        }
    }

    async fn service_with(config: Arc<ConfigManager>) -> BookingService {
        let db = TursoClient::new_memory().await.expect("in-memory db");
        BookingService::new(Arc::new(db), config)
    }

    async fn service() -> BookingService {
        service_with(Arc::new(ConfigManager::from_config(ChatbotxConfig::default()))).await
    }

    #[test]
    fn test_business_slots() {
        let slots = business_slots(9, 17);
        assert_eq!(slots.len(), 8);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("16:00"));
    }

    #[test]
    fn test_parse_slot() {
        assert_eq!(parse_slot("10:00").unwrap().hour(), 10);
        assert!(parse_slot("10:30").is_err());
        assert!(parse_slot("ten").is_err());
    }

    #[test]
    fn test_weekend_has_no_slots() {
        // 2026-10-17 is a Saturday
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert!(free_slots(saturday, &[], 9, 17).is_empty());
    }

    #[tokio::test]
    async fn test_booking_takes_the_slot() {
        let service = service().await;
        let date = next_weekday();

        let response = service.book(&request(date, "10:00")).await.unwrap();
        assert!(response.booking_id.starts_with("BOOK-"));
        assert_eq!(response.status, "confirmed");

        let slots = service.availability(date).await.unwrap();
        assert_eq!(slots.len(), 7);
        assert!(!slots.contains(&"10:00".to_string()));

        let again = service.book(&request(date, "10:00")).await;
        assert!(matches!(again, Err(AppError::InvalidInput(_))));

        let mine = service.bookings_for("ada@example.com").await.unwrap();
        assert_eq!(mine.len(), 1);
    }

    #[tokio::test]
    async fn test_rejects_out_of_hours_and_past() {
        let service = service().await;
        let date = next_weekday();

        assert!(service.book(&request(date, "08:00")).await.is_err());
        assert!(service.book(&request(date, "17:00")).await.is_err());

        let past = NaiveDate::from_ymd_opt(2020, 1, 6).unwrap();
        assert!(service.book(&request(past, "10:00")).await.is_err());

        let mut bad_email = request(date, "11:00");
        bad_email.email = "nope".to_string();
        assert!(service.book(&bad_email).await.is_err());
    }

    #[tokio::test]
    async fn test_business_hours_follow_config() {
        let manager = Arc::new(ConfigManager::from_config(ChatbotxConfig::default()));
        let service = service_with(manager.clone()).await;
        let date = next_weekday();
        assert_eq!(service.availability(date).await.unwrap().len(), 8);

        let mut config = ChatbotxConfig::default();
        config.business.hours_start = 8;
        config.business.hours_end = 12;
        manager.replace(config).unwrap();

        let slots = service.availability(date).await.unwrap();
        assert_eq!(slots, vec!["08:00", "09:00", "10:00", "11:00"]);
        assert!(service.book(&request(date, "08:00")).await.is_ok());
        assert!(service.book(&request(date, "14:00")).await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_requests_get_one_slot() {
        let service = Arc::new(service().await);
        let date = next_weekday();

        let attempts = (0..8).map(|_| {
            let service = service.clone();
            async move { service.book(&request(date, "13:00")).await }
        });
        let results = futures::future::join_all(attempts).await;

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(service.bookings_for("ada@example.com").await.unwrap().len(), 1);
    }
}
