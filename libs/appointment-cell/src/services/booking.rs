// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, error, info, warn};

use meeting_cell::{HostEntry, HostRegistry, MeetingIdGenerator};
use shared_models::auth::AuthSession;
use shared_models::notification::Notification;

use crate::models::{
    date_to_timestamp, AppointmentError, AppointmentStatus, BookingConfirmation, BookingField,
    BookingForm, BookingFormView, FieldErrors, FormState, NewAppointment, ServiceKind,
    SubmitOutcome, TimeSlot, TimeSlotView, ValidatedBooking,
};
use crate::services::availability::{AvailabilityChecker, AvailabilityPolicy};
use crate::services::store::AppointmentStore;
use crate::services::validation::validate_booking_form;

pub const REGISTRATION_REQUIRED_MESSAGE: &str =
    "Please sign in or create an account to book an appointment.";
pub const FIX_FIELDS_MESSAGE: &str = "Please fix the highlighted fields";
pub const CONFLICT_MESSAGE: &str =
    "You already have an appointment scheduled for this date and time. Please choose a different slot.";
pub const SLOT_TAKEN_MESSAGE: &str = "This time slot may already be taken. Please choose another time.";
pub const BOOKING_FAILED_MESSAGE: &str = "Booking failed. Please try again.";

/// Drives one booking form from input to a stored appointment.
///
/// ```text
/// idle -> submitting -> success -> (book another) -> idle
///              \-> error -> (next submit) -> idle
/// ```
///
/// `submit` takes `&mut self`, so a single form cannot have two submissions
/// in flight. Nothing orders submissions across forms; the store's unique
/// constraint settles those races.
pub struct BookingFormController {
    form: BookingForm,
    state: FormState,
    errors: FieldErrors,
    availability: AvailabilityChecker,
    store: Arc<dyn AppointmentStore>,
    hosts: Arc<dyn HostRegistry>,
    meeting_ids: MeetingIdGenerator,
    today: NaiveDate,
}

impl BookingFormController {
    pub fn new(
        store: Arc<dyn AppointmentStore>,
        hosts: Arc<dyn HostRegistry>,
        meeting_ids: MeetingIdGenerator,
        policy: AvailabilityPolicy,
    ) -> Self {
        Self {
            form: BookingForm::default(),
            state: FormState::Idle,
            errors: FieldErrors::new(),
            availability: AvailabilityChecker::new(Arc::clone(&store), policy),
            store,
            hosts,
            meeting_ids,
            today: Utc::now().date_naive(),
        }
    }

    /// Pins the date used for the "not in the past" rule.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Replaces the whole form, e.g. from a request body.
    pub fn fill(&mut self, form: BookingForm) {
        self.form = form;
    }

    /// Edits one validated field and clears its error.
    pub fn set_field(&mut self, field: BookingField, value: impl Into<String>) {
        let value = value.into();
        match field {
            BookingField::Name => self.form.name = value,
            BookingField::Email => self.form.email = value,
            BookingField::Phone => self.form.phone = value,
            BookingField::Service => self.form.service = value,
            BookingField::Date => self.form.date = value,
            BookingField::TimeSlot => self.form.time_slot = value,
        }
        self.errors.remove(&field);
    }

    pub fn set_new_patient(&mut self, is_new_patient: bool) {
        self.form.is_new_patient = is_new_patient;
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.form.message = message.into();
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn view(&self) -> BookingFormView {
        BookingFormView {
            state: self.state,
            form: self.form.clone(),
            services: ServiceKind::ALL.iter().map(ServiceKind::name).collect(),
            time_slots: TimeSlot::ALL.into_iter().map(TimeSlotView::from).collect(),
            min_date: self.today,
        }
    }

    /// Leaves the success screen for a fresh, empty form.
    pub fn book_another(&mut self) {
        if self.state == FormState::Success {
            self.state = FormState::Idle;
        }
    }

    pub async fn submit(&mut self, session: Option<&AuthSession>) -> SubmitOutcome {
        match self.state {
            FormState::Submitting | FormState::Success => {
                warn!("Ignoring submit while form is {:?}", self.state);
                return SubmitOutcome::Ignored;
            }
            FormState::Error => self.state = FormState::Idle,
            FormState::Idle => {}
        }

        let Some(session) = session else {
            info!("Booking attempted without a session");
            return SubmitOutcome::RegistrationRequired {
                notification: Notification::warning("Registration required", REGISTRATION_REQUIRED_MESSAGE),
            };
        };

        let booking = match validate_booking_form(&self.form, self.today) {
            Ok(booking) => booking,
            Err(errors) => {
                debug!("Booking form rejected: {:?}", errors.keys().collect::<Vec<_>>());
                self.errors = errors.clone();
                return SubmitOutcome::Invalid {
                    errors,
                    notification: Notification::error("Invalid form", FIX_FIELDS_MESSAGE),
                };
            }
        };
        self.errors.clear();

        self.state = FormState::Submitting;
        let outcome = self.book(booking, session).await;

        self.state = match outcome {
            SubmitOutcome::Booked { .. } => {
                self.form = BookingForm::default();
                self.errors.clear();
                FormState::Success
            }
            _ => FormState::Error,
        };

        outcome
    }

    async fn book(&self, booking: ValidatedBooking, session: &AuthSession) -> SubmitOutcome {
        let user_id = session.user.id.as_str();
        let token = session.access_token.as_str();

        match self.availability.has_conflict(user_id, booking.date, booking.time_slot, token).await {
            Ok(false) => {}
            Ok(true) => {
                info!("User {} already booked {} at {}", user_id, booking.date, booking.time_slot);
                return SubmitOutcome::Conflict {
                    notification: Notification::error("Time slot unavailable", CONFLICT_MESSAGE),
                };
            }
            Err(_) => {
                return SubmitOutcome::Failed {
                    notification: Notification::error("Booking failed", BOOKING_FAILED_MESSAGE),
                };
            }
        }

        let meeting_id = self.meeting_ids.generate();
        let meeting_link = self.meeting_ids.join_link(&meeting_id);
        self.hosts.set_host_entry(&meeting_id, HostEntry::owned_by(user_id, &booking.name));

        let record = NewAppointment {
            user_id: user_id.to_string(),
            meeting_id: meeting_id.to_string(),
            meeting_link: meeting_link.clone(),
            name: booking.name,
            email: booking.email,
            phone: booking.phone,
            service: booking.service,
            appointment_date: date_to_timestamp(booking.date),
            time_slot: booking.time_slot,
            is_new_patient: booking.is_new_patient,
            message: booking.message,
            is_host: true,
            status: AppointmentStatus::Scheduled,
        };

        match self.store.insert(&record, token).await {
            Ok(appointment) => {
                info!("Booked appointment {} with meeting {}", appointment.id, meeting_id);
                let notification = Notification::success(
                    "Appointment booked!",
                    format!("Your appointment is confirmed. Join your session at {}", meeting_link),
                );
                SubmitOutcome::Booked {
                    confirmation: Box::new(BookingConfirmation { appointment, meeting_id, meeting_link }),
                    notification,
                }
            }
            Err(AppointmentError::UniqueViolation) => {
                warn!("Insert hit the unique constraint for user {}", user_id);
                SubmitOutcome::SlotTaken {
                    notification: Notification::error("Time slot unavailable", SLOT_TAKEN_MESSAGE),
                }
            }
            Err(e) => {
                error!("Failed to store appointment: {}", e);
                SubmitOutcome::Failed {
                    notification: Notification::error("Booking failed", BOOKING_FAILED_MESSAGE),
                }
            }
        }
    }
}
