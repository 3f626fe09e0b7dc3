// libs/appointment-cell/src/services/validation.rs
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{BookingField, BookingForm, FieldErrors, ServiceKind, TimeSlot, ValidatedBooking};

pub const NAME_REQUIRED: &str = "Please enter your name";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PHONE_INVALID: &str = "Please enter a valid phone number";
pub const SERVICE_REQUIRED: &str = "Please select a service";
pub const TIME_SLOT_REQUIRED: &str = "Please select a time slot";
pub const DATE_REQUIRED: &str = "Please select a date";
pub const DATE_INVALID: &str = "Please select a valid date";
pub const DATE_IN_PAST: &str = "Appointment date cannot be in the past";

const MIN_NAME_CHARS: usize = 2;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9]{7,15}$").expect("phone pattern compiles")
});

/// Strips the separators people type into phone numbers.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect()
}

pub fn validate_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    match trimmed.chars().count() {
        0 => Err(NAME_REQUIRED),
        n if n < MIN_NAME_CHARS => Err(NAME_TOO_SHORT),
        _ => Ok(trimmed.to_string()),
    }
}

pub fn validate_email(email: &str) -> Result<String, &'static str> {
    let trimmed = email.trim();
    if EMAIL_REGEX.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(EMAIL_INVALID)
    }
}

pub fn validate_phone(phone: &str) -> Result<String, &'static str> {
    let normalized = normalize_phone(phone);
    if PHONE_REGEX.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(PHONE_INVALID)
    }
}

pub fn validate_service(service: &str) -> Result<ServiceKind, &'static str> {
    ServiceKind::from_name(service.trim()).ok_or(SERVICE_REQUIRED)
}

pub fn validate_time_slot(slot: &str) -> Result<TimeSlot, &'static str> {
    TimeSlot::from_label(slot.trim()).ok_or(TIME_SLOT_REQUIRED)
}

/// `today` is the start of the current day; earlier dates are rejected.
pub fn validate_date(date: &str, today: NaiveDate) -> Result<NaiveDate, &'static str> {
    let trimmed = date.trim();
    if trimmed.is_empty() {
        return Err(DATE_REQUIRED);
    }

    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| DATE_INVALID)?;
    if parsed < today {
        return Err(DATE_IN_PAST);
    }

    Ok(parsed)
}

/// Runs every rule and reports all failures at once.
pub fn validate_booking_form(form: &BookingForm, today: NaiveDate) -> Result<ValidatedBooking, FieldErrors> {
    let mut errors = FieldErrors::new();

    let mut check = |field: BookingField, result: Result<(), &'static str>| {
        if let Err(message) = result {
            errors.insert(field, message.to_string());
        }
    };

    let name = validate_name(&form.name);
    check(BookingField::Name, name.as_ref().map(|_| ()).map_err(|e| *e));
    let email = validate_email(&form.email);
    check(BookingField::Email, email.as_ref().map(|_| ()).map_err(|e| *e));
    let phone = validate_phone(&form.phone);
    check(BookingField::Phone, phone.as_ref().map(|_| ()).map_err(|e| *e));
    let service = validate_service(&form.service);
    check(BookingField::Service, service.map(|_| ()));
    let date = validate_date(&form.date, today);
    check(BookingField::Date, date.map(|_| ()));
    let time_slot = validate_time_slot(&form.time_slot);
    check(BookingField::TimeSlot, time_slot.map(|_| ()));

    match (name, email, phone, service, date, time_slot) {
        (Ok(name), Ok(email), Ok(phone), Ok(service), Ok(date), Ok(time_slot)) => {
            let message = Some(form.message.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string);

            Ok(ValidatedBooking {
                name,
                email,
                phone,
                service,
                date,
                time_slot,
                is_new_patient: form.is_new_patient,
                message,
            })
        }
        _ => Err(errors),
    }
}
