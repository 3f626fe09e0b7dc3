// libs/appointment-cell/src/lib.rs
//! # Appointment Cell
//!
//! The booking form: validation, the per-user slot conflict check, and
//! persistence of appointments with their meeting link.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                 Appointment Cell                    |
//! +-----------------------------------------------------+
//! |  handlers.rs       |  HTTP endpoint handlers        |
//! |  router.rs         |  Route definitions             |
//! |  models.rs         |  Catalog, records, form types  |
//! |  services/         |                                |
//! |    validation.rs   |  Field rules                   |
//! |    availability.rs |  Existing booking lookup       |
//! |    store.rs        |  Supabase / in-memory storage  |
//! |    booking.rs      |  Form controller               |
//! +-----------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /booking` - Empty form with services and time slots
//! - `POST /booking` - Submit a booking
//! - `GET /booking/appointments` - Caller's scheduled appointments (auth)

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentStatus, BookingConfirmation, BookingField,
    BookingForm, FieldErrors, FormState, NewAppointment, ServiceKind, SubmitOutcome, TimeSlot,
};

pub use services::{
    AppointmentStore,
    AvailabilityChecker,
    AvailabilityPolicy,
    BookingFormController,
    InMemoryAppointmentStore,
    SupabaseAppointmentStore,
};

pub use router::{booking_routes, BookingState};
