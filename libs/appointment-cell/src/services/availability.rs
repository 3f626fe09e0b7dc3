// libs/appointment-cell/src/services/availability.rs
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, error, warn};

use shared_config::AppConfig;

use crate::models::{AppointmentError, TimeSlot};
use crate::services::store::AppointmentStore;

/// What to do when the conflict lookup itself fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityPolicy {
    /// Log and treat the slot as free; the insert's unique constraint still
    /// stops a real double booking.
    #[default]
    FailOpen,
    /// Surface the read error and abort the submission.
    FailClosed,
}

impl AvailabilityPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        if config.booking_fail_closed {
            AvailabilityPolicy::FailClosed
        } else {
            AvailabilityPolicy::FailOpen
        }
    }
}

#[derive(Clone)]
pub struct AvailabilityChecker {
    store: Arc<dyn AppointmentStore>,
    policy: AvailabilityPolicy,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn AppointmentStore>, policy: AvailabilityPolicy) -> Self {
        Self { store, policy }
    }

    /// True when `user_id` already holds a scheduled appointment for this
    /// date and slot.
    pub async fn has_conflict(
        &self,
        user_id: &str,
        date: NaiveDate,
        slot: TimeSlot,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        debug!("Checking availability for user {} on {} at {}", user_id, date, slot);

        match self.store.find_scheduled(user_id, date, slot, auth_token).await {
            Ok(existing) => Ok(!existing.is_empty()),
            Err(e) => match self.policy {
                AvailabilityPolicy::FailOpen => {
                    warn!("Availability check failed, continuing without it: {}", e);
                    Ok(false)
                }
                AvailabilityPolicy::FailClosed => {
                    error!("Availability check failed: {}", e);
                    Err(e)
                }
            },
        }
    }
}
