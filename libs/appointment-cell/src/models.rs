// libs/appointment-cell/src/models.rs
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use meeting_cell::MeetingId;
use shared_models::notification::Notification;

// ==============================================================================
// CATALOG
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    #[serde(rename = "Manual Therapy")]
    ManualTherapy,
    #[serde(rename = "Sports Rehabilitation")]
    SportsRehabilitation,
    #[serde(rename = "Post-Surgery Rehabilitation")]
    PostSurgeryRehabilitation,
    #[serde(rename = "Dry Needling")]
    DryNeedling,
    #[serde(rename = "Exercise Therapy")]
    ExerciseTherapy,
    #[serde(rename = "Pain Management")]
    PainManagement,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::ManualTherapy,
        ServiceKind::SportsRehabilitation,
        ServiceKind::PostSurgeryRehabilitation,
        ServiceKind::DryNeedling,
        ServiceKind::ExerciseTherapy,
        ServiceKind::PainManagement,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::ManualTherapy => "Manual Therapy",
            ServiceKind::SportsRehabilitation => "Sports Rehabilitation",
            ServiceKind::PostSurgeryRehabilitation => "Post-Surgery Rehabilitation",
            ServiceKind::DryNeedling => "Dry Needling",
            ServiceKind::ExerciseTherapy => "Exercise Therapy",
            ServiceKind::PainManagement => "Pain Management",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|service| service.name() == name)
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bookable start time. The label is what users pick and what gets
/// stored; start/end are carried so durations can be computed without
/// parsing labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeSlot {
    #[serde(rename = "9:00 AM")]
    NineAm,
    #[serde(rename = "10:00 AM")]
    TenAm,
    #[serde(rename = "11:00 AM")]
    ElevenAm,
    #[serde(rename = "12:00 PM")]
    Noon,
    #[serde(rename = "2:00 PM")]
    TwoPm,
    #[serde(rename = "3:00 PM")]
    ThreePm,
    #[serde(rename = "4:00 PM")]
    FourPm,
    #[serde(rename = "5:00 PM")]
    FivePm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 8] = [
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::Noon,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourPm,
        TimeSlot::FivePm,
    ];

    const DURATION_HOURS: u32 = 1;

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::NineAm => "9:00 AM",
            TimeSlot::TenAm => "10:00 AM",
            TimeSlot::ElevenAm => "11:00 AM",
            TimeSlot::Noon => "12:00 PM",
            TimeSlot::TwoPm => "2:00 PM",
            TimeSlot::ThreePm => "3:00 PM",
            TimeSlot::FourPm => "4:00 PM",
            TimeSlot::FivePm => "5:00 PM",
        }
    }

    fn start_hour(&self) -> u32 {
        match self {
            TimeSlot::NineAm => 9,
            TimeSlot::TenAm => 10,
            TimeSlot::ElevenAm => 11,
            TimeSlot::Noon => 12,
            TimeSlot::TwoPm => 14,
            TimeSlot::ThreePm => 15,
            TimeSlot::FourPm => 16,
            TimeSlot::FivePm => 17,
        }
    }

    pub fn start(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start_hour(), 0, 0).unwrap_or_default()
    }

    pub fn end(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.start_hour() + Self::DURATION_HOURS, 0, 0).unwrap_or_default()
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.label() == label)
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start() < other.end() && other.start() < self.end()
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSlotView {
    pub label: &'static str,
    pub start: String,
    pub end: String,
}

impl From<TimeSlot> for TimeSlotView {
    fn from(slot: TimeSlot) -> Self {
        Self {
            label: slot.label(),
            start: slot.start().format("%H:%M").to_string(),
            end: slot.end().format("%H:%M").to_string(),
        }
    }
}

// ==============================================================================
// APPOINTMENT RECORDS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A row of the `appointments` table as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: String,
    pub meeting_id: String,
    pub meeting_link: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: ServiceKind,
    pub appointment_date: DateTime<Utc>,
    pub time_slot: TimeSlot,
    pub is_new_patient: bool,
    pub message: Option<String>,
    pub is_host: bool,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Insert shape of an appointment; storage assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAppointment {
    pub user_id: String,
    pub meeting_id: String,
    pub meeting_link: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: ServiceKind,
    pub appointment_date: DateTime<Utc>,
    pub time_slot: TimeSlot,
    pub is_new_patient: bool,
    pub message: Option<String>,
    pub is_host: bool,
    pub status: AppointmentStatus,
}

/// Calendar dates are stored as a timestamp at midnight UTC.
pub fn date_to_timestamp(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

// ==============================================================================
// BOOKING FORM
// ==============================================================================

/// Raw form input exactly as typed; nothing here has been checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BookingForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time_slot: String,
    pub is_new_patient: bool,
    pub message: String,
}

/// Form fields that carry validation rules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingField {
    Name,
    Email,
    Phone,
    Service,
    Date,
    TimeSlot,
}

pub type FieldErrors = BTreeMap<BookingField, String>;

/// Form input that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub service: ServiceKind,
    pub date: NaiveDate,
    pub time_slot: TimeSlot,
    pub is_new_patient: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Submitting,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub appointment: Appointment,
    pub meeting_id: MeetingId,
    pub meeting_link: String,
}

/// Result of one submit. Every variant except `Ignored` carries exactly one
/// notification for the user.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    RegistrationRequired { notification: Notification },
    Invalid { errors: FieldErrors, notification: Notification },
    Conflict { notification: Notification },
    SlotTaken { notification: Notification },
    Failed { notification: Notification },
    Booked { confirmation: Box<BookingConfirmation>, notification: Notification },
    /// Submit while a submission is in flight or already succeeded.
    Ignored,
}

impl SubmitOutcome {
    pub fn notification(&self) -> Option<&Notification> {
        match self {
            SubmitOutcome::RegistrationRequired { notification }
            | SubmitOutcome::Invalid { notification, .. }
            | SubmitOutcome::Conflict { notification }
            | SubmitOutcome::SlotTaken { notification }
            | SubmitOutcome::Failed { notification }
            | SubmitOutcome::Booked { notification, .. } => Some(notification),
            SubmitOutcome::Ignored => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingFormView {
    pub state: FormState,
    pub form: BookingForm,
    pub services: Vec<&'static str>,
    pub time_slots: Vec<TimeSlotView>,
    pub min_date: NaiveDate,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment slot is already taken")]
    UniqueViolation,

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unauthorized access to appointments")]
    Unauthorized,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_serializes_as_labels() {
        assert_eq!(serde_json::to_string(&ServiceKind::ManualTherapy).unwrap(), "\"Manual Therapy\"");
        assert_eq!(serde_json::to_string(&TimeSlot::TenAm).unwrap(), "\"10:00 AM\"");

        for service in ServiceKind::ALL {
            let json = serde_json::to_value(service).unwrap();
            assert_eq!(json, service.name());
            assert_eq!(ServiceKind::from_name(service.name()), Some(service));
        }
        for slot in TimeSlot::ALL {
            assert_eq!(serde_json::to_value(slot).unwrap(), slot.label());
            assert_eq!(TimeSlot::from_label(slot.label()), Some(slot));
        }
    }

    #[test]
    fn test_time_slots_carry_hour_ranges() {
        assert_eq!(TimeSlot::TwoPm.start(), NaiveTime::from_hms_opt(14, 0, 0).unwrap());
        assert_eq!(TimeSlot::TwoPm.end(), NaiveTime::from_hms_opt(15, 0, 0).unwrap());
        assert!(TimeSlot::TenAm.overlaps(&TimeSlot::TenAm));
        assert!(!TimeSlot::TenAm.overlaps(&TimeSlot::ElevenAm));

        let view = TimeSlotView::from(TimeSlot::NineAm);
        assert_eq!((view.start.as_str(), view.end.as_str()), ("09:00", "10:00"));
    }

    #[test]
    fn test_unknown_labels_are_rejected() {
        assert_eq!(TimeSlot::from_label("10:00"), None);
        assert_eq!(ServiceKind::from_name("manual therapy"), None);
    }

    #[test]
    fn test_field_errors_serialize_with_field_names() {
        let mut errors = FieldErrors::new();
        errors.insert(BookingField::TimeSlot, "Please select a time slot".to_string());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["time_slot"], "Please select a time slot");
    }

    #[test]
    fn test_date_to_timestamp_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2030, 5, 17).unwrap();
        assert_eq!(date_to_timestamp(date).to_rfc3339(), "2030-05-17T00:00:00+00:00");
    }
}
