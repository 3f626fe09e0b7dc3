use std::sync::Arc;
use assert_matches::assert_matches;
use async_trait::async_trait;
use chrono::NaiveDate;

use appointment_cell::{
    Appointment, AppointmentError, AppointmentStore, AvailabilityPolicy, BookingField, BookingForm,
    BookingFormController, FormState, InMemoryAppointmentStore, NewAppointment, SubmitOutcome, TimeSlot,
};
use meeting_cell::{HostRegistry, InMemoryHostRegistry, MeetingIdGenerator};
use shared_models::auth::AuthSession;
use shared_models::notification::NotificationKind;
use shared_utils::test_utils::TestUser;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
}

fn filled_form() -> BookingForm {
    BookingForm {
        name: "Jane Doe".to_string(),
        email: "jane@example.com".to_string(),
        phone: "+15551234567".to_string(),
        service: "Manual Therapy".to_string(),
        date: "2030-01-20".to_string(),
        time_slot: "10:00 AM".to_string(),
        is_new_patient: true,
        message: String::new(),
    }
}

fn controller_with(store: Arc<dyn AppointmentStore>, hosts: Arc<dyn HostRegistry>) -> BookingFormController {
    BookingFormController::new(
        store,
        hosts,
        MeetingIdGenerator::new("https://clinic.test"),
        AvailabilityPolicy::FailOpen,
    )
    .with_today(today())
}

fn session() -> AuthSession {
    TestUser::patient("jane@example.com").to_session("token")
}

/// Reports every slot as free, whatever is stored, so two forms can both
/// get past the availability check.
struct StaleReadStore {
    inner: InMemoryAppointmentStore,
}

#[async_trait]
impl AppointmentStore for StaleReadStore {
    async fn find_scheduled(&self, _: &str, _: NaiveDate, _: TimeSlot, _: &str)
        -> Result<Vec<Appointment>, AppointmentError> {
        Ok(Vec::new())
    }

    async fn insert(&self, appointment: &NewAppointment, auth_token: &str) -> Result<Appointment, AppointmentError> {
        self.inner.insert(appointment, auth_token).await
    }

    async fn list_scheduled(&self, user_id: &str, auth_token: &str) -> Result<Vec<Appointment>, AppointmentError> {
        self.inner.list_scheduled(user_id, auth_token).await
    }
}

#[tokio::test]
async fn test_successful_booking_records_host_and_resets_form() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let hosts = Arc::new(InMemoryHostRegistry::new());
    let mut controller = controller_with(store.clone(), hosts.clone());
    controller.fill(filled_form());

    let outcome = controller.submit(Some(&session())).await;

    let confirmation = assert_matches!(outcome, SubmitOutcome::Booked { confirmation, notification } => {
        assert_eq!(notification.kind, NotificationKind::Success);
        assert!(notification.message.contains(&confirmation.meeting_link));
        confirmation
    });
    assert_eq!(controller.state(), FormState::Success);
    assert_eq!(controller.form(), &BookingForm::default());
    assert!(controller.errors().is_empty());

    let stored = store.all();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_host);
    assert_eq!(stored[0].meeting_id, confirmation.meeting_id.as_str());
    assert_eq!(stored[0].meeting_link, confirmation.meeting_link);
    assert_eq!(hosts.get_host(&confirmation.meeting_id), Some("Jane Doe".to_string()));
}

#[tokio::test]
async fn test_identical_resubmission_is_a_conflict() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let hosts: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());
    let user = session();

    let mut first = controller_with(store.clone(), hosts.clone());
    first.fill(filled_form());
    assert_matches!(first.submit(Some(&user)).await, SubmitOutcome::Booked { .. });

    let mut second = controller_with(store.clone(), hosts);
    second.fill(filled_form());
    let outcome = second.submit(Some(&user)).await;

    assert_matches!(outcome, SubmitOutcome::Conflict { .. });
    assert_eq!(second.state(), FormState::Error);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_racing_forms_hit_the_unique_constraint() {
    let store = Arc::new(StaleReadStore { inner: InMemoryAppointmentStore::new() });
    let hosts: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());
    let user = session();

    let mut first = controller_with(store.clone(), hosts.clone());
    let mut second = controller_with(store.clone(), hosts);
    first.fill(filled_form());
    second.fill(filled_form());

    assert_matches!(first.submit(Some(&user)).await, SubmitOutcome::Booked { .. });
    let outcome = second.submit(Some(&user)).await;

    assert_matches!(outcome, SubmitOutcome::SlotTaken { notification } => {
        assert!(notification.message.starts_with("This time slot may already be taken"));
    });
    assert_eq!(second.state(), FormState::Error);
    assert_eq!(store.inner.len(), 1);
}

#[tokio::test]
async fn test_error_state_allows_retry_with_new_slot() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let hosts: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());
    let user = session();

    let mut first = controller_with(store.clone(), hosts.clone());
    first.fill(filled_form());
    first.submit(Some(&user)).await;

    let mut second = controller_with(store.clone(), hosts);
    second.fill(filled_form());
    assert_matches!(second.submit(Some(&user)).await, SubmitOutcome::Conflict { .. });

    second.set_field(BookingField::TimeSlot, "2:00 PM");
    assert_matches!(second.submit(Some(&user)).await, SubmitOutcome::Booked { .. });
    assert_eq!(second.state(), FormState::Success);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn test_invalid_submit_keeps_input_and_marks_fields() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let mut controller = controller_with(store.clone(), Arc::new(InMemoryHostRegistry::new()));
    let mut form = filled_form();
    form.email = "not-an-email".to_string();
    form.date = "2030-01-14".to_string();
    controller.fill(form.clone());

    let outcome = controller.submit(Some(&session())).await;

    assert_matches!(outcome, SubmitOutcome::Invalid { errors, .. } => {
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&BookingField::Email], "Please enter a valid email address");
        assert_eq!(errors[&BookingField::Date], "Appointment date cannot be in the past");
    });
    assert_eq!(controller.state(), FormState::Idle);
    assert_eq!(controller.form(), &form);
    assert!(store.is_empty());

    // Fixing a field removes its error immediately.
    controller.set_field(BookingField::Email, "jane@example.com");
    assert_eq!(controller.errors().len(), 1);
    assert!(controller.errors().contains_key(&BookingField::Date));
}

#[tokio::test]
async fn test_book_another_after_success() {
    let store = Arc::new(InMemoryAppointmentStore::new());
    let mut controller = controller_with(store.clone(), Arc::new(InMemoryHostRegistry::new()));
    let user = session();

    controller.fill(filled_form());
    controller.submit(Some(&user)).await;
    controller.book_another();
    assert_eq!(controller.state(), FormState::Idle);

    let mut next = filled_form();
    next.date = "2030-01-21".to_string();
    controller.fill(next);
    assert_matches!(controller.submit(Some(&user)).await, SubmitOutcome::Booked { .. });
    assert_eq!(store.len(), 2);
}
