// libs/appointment-cell/src/services/store.rs
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, error};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{SupabaseApiError, SupabaseClient};

use crate::models::{
    date_to_timestamp, Appointment, AppointmentError, AppointmentStatus, NewAppointment, TimeSlot,
};

const APPOINTMENTS_TABLE: &str = "appointments";

/// Persistence boundary for appointments.
///
/// Implementations must reject a second `scheduled` row for the same
/// (user, date, slot) with [`AppointmentError::UniqueViolation`]. That
/// constraint is what actually prevents double booking; the availability
/// check in front of it only spares users a failed insert.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Scheduled appointments of `user_id` on `date` in `slot`.
    async fn find_scheduled(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    async fn insert(
        &self,
        appointment: &NewAppointment,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError>;

    /// Scheduled appointments of `user_id`, earliest first.
    async fn list_scheduled(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError>;
}

fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|apt| (apt.appointment_date, apt.time_slot));
}

// ==============================================================================
// SUPABASE
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    fn map_error(err: anyhow::Error) -> AppointmentError {
        match err.downcast_ref::<SupabaseApiError>() {
            Some(api) if api.is_unique_violation() => AppointmentError::UniqueViolation,
            Some(api) if api.is_auth_error() => AppointmentError::Unauthorized,
            _ => AppointmentError::DatabaseError(err.to_string()),
        }
    }

    fn parse_rows(rows: Vec<Value>) -> Result<Vec<Appointment>, AppointmentError> {
        rows.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn find_scheduled(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filters = [
            ("user_id", format!("eq.{}", user_id)),
            ("appointment_date", format!("eq.{}", date_to_timestamp(date).to_rfc3339())),
            ("time_slot", format!("eq.{}", slot.label())),
            ("status", format!("eq.{}", AppointmentStatus::Scheduled)),
        ];

        let rows: Vec<Value> = self.supabase
            .select(APPOINTMENTS_TABLE, &filters, Some(auth_token))
            .await
            .map_err(Self::map_error)?;

        Self::parse_rows(rows)
    }

    async fn insert(
        &self,
        appointment: &NewAppointment,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let body = serde_json::to_value(appointment)
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let rows: Vec<Value> = self.supabase
            .insert(APPOINTMENTS_TABLE, body, Some(auth_token))
            .await
            .map_err(Self::map_error)?;

        Self::parse_rows(rows)?
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no rows".to_string()))
    }

    async fn list_scheduled(
        &self,
        user_id: &str,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let filters = [
            ("user_id", format!("eq.{}", user_id)),
            ("status", format!("eq.{}", AppointmentStatus::Scheduled)),
            ("order", "appointment_date.asc".to_string()),
        ];

        let rows: Vec<Value> = self.supabase
            .select(APPOINTMENTS_TABLE, &filters, Some(auth_token))
            .await
            .map_err(Self::map_error)?;

        let mut appointments = Self::parse_rows(rows)?;
        sort_chronologically(&mut appointments);
        Ok(appointments)
    }
}

// ==============================================================================
// IN-MEMORY
// ==============================================================================

/// Process-local store with the same uniqueness rule as the `appointments`
/// table. Used when Supabase is not configured and in tests.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    rows: Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn all(&self) -> Vec<Appointment> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Appointment>> {
        self.rows.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn find_scheduled(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        _auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let timestamp = date_to_timestamp(date);

        Ok(self.lock()
            .iter()
            .filter(|apt| apt.user_id == user_id
                && apt.appointment_date == timestamp
                && apt.time_slot == slot
                && apt.status == AppointmentStatus::Scheduled)
            .cloned()
            .collect())
    }

    async fn insert(
        &self,
        appointment: &NewAppointment,
        _auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let mut rows = self.lock();

        let duplicate = appointment.status == AppointmentStatus::Scheduled
            && rows.iter().any(|apt| apt.user_id == appointment.user_id
                && apt.appointment_date == appointment.appointment_date
                && apt.time_slot == appointment.time_slot
                && apt.status == AppointmentStatus::Scheduled);

        if duplicate {
            error!("Duplicate scheduled appointment for user {}", appointment.user_id);
            return Err(AppointmentError::UniqueViolation);
        }

        let stored = Appointment {
            id: Uuid::new_v4(),
            user_id: appointment.user_id.clone(),
            meeting_id: appointment.meeting_id.clone(),
            meeting_link: appointment.meeting_link.clone(),
            name: appointment.name.clone(),
            email: appointment.email.clone(),
            phone: appointment.phone.clone(),
            service: appointment.service,
            appointment_date: appointment.appointment_date,
            time_slot: appointment.time_slot,
            is_new_patient: appointment.is_new_patient,
            message: appointment.message.clone(),
            is_host: appointment.is_host,
            status: appointment.status,
            created_at: Utc::now(),
        };

        debug!("Stored appointment {} in memory", stored.id);
        rows.push(stored.clone());
        Ok(stored)
    }

    async fn list_scheduled(
        &self,
        user_id: &str,
        _auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut appointments: Vec<Appointment> = self.lock()
            .iter()
            .filter(|apt| apt.user_id == user_id && apt.status == AppointmentStatus::Scheduled)
            .cloned()
            .collect();

        sort_chronologically(&mut appointments);
        Ok(appointments)
    }
}
