// libs/appointment-cell/src/services/mod.rs

pub mod availability;
pub mod booking;
pub mod store;
pub mod validation;

pub use availability::{AvailabilityChecker, AvailabilityPolicy};
pub use booking::BookingFormController;
pub use store::{AppointmentStore, InMemoryAppointmentStore, SupabaseAppointmentStore};
pub use validation::validate_booking_form;
