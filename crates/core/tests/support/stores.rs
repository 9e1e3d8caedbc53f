//! In-memory mocks for the catalog, booking, and reminder ports.
//!
//! Deterministic stand-ins for the SQLite repositories, enabling unit tests
//! without database dependencies.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use slotwise_core::booking::ports::BookingStore;
use slotwise_core::dispatch::ports::ReminderStore;
use slotwise_core::CatalogRepository;
use slotwise_domain::{
    Booking, BookingStatus, ReminderState, ReminderTask, Result as DomainResult, Service,
    SlotwiseError, StaffMember, TimeRange,
};

/// In-memory mock for `CatalogRepository`.
#[derive(Default, Clone)]
pub struct MockCatalog {
    services: Arc<Mutex<Vec<Service>>>,
    staff: Arc<Mutex<Vec<StaffMember>>>,
}

impl MockCatalog {
    pub fn with_service(self, service: Service) -> Self {
        self.services.lock().unwrap().push(service);
        self
    }

    pub fn with_staff(self, staff: StaffMember) -> Self {
        self.staff.lock().unwrap().push(staff);
        self
    }
}

#[async_trait]
impl CatalogRepository for MockCatalog {
    async fn find_service(&self, service_id: &str) -> DomainResult<Option<Service>> {
        Ok(self.services.lock().unwrap().iter().find(|s| s.id == service_id).cloned())
    }

    async fn find_staff(&self, staff_id: &str) -> DomainResult<Option<StaffMember>> {
        Ok(self.staff.lock().unwrap().iter().find(|s| s.id == staff_id).cloned())
    }
}

/// In-memory mock for `BookingStore`.
///
/// The reserve path checks the overlap invariant under one mutex, mirroring
/// the serialized conditional write of the SQLite implementation.
#[derive(Default, Clone)]
pub struct MockBookingStore {
    rows: Arc<Mutex<Vec<Booking>>>,
}

impl MockBookingStore {
    pub fn with_booking(self, booking: Booking) -> Self {
        self.rows.lock().unwrap().push(booking);
        self
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingStore for MockBookingStore {
    async fn reserve(&self, booking: &Booking) -> DomainResult<Booking> {
        let mut rows = self.rows.lock().unwrap();
        let conflict = rows.iter().any(|existing| {
            existing.staff_id == booking.staff_id
                && existing.status.is_active()
                && existing.guard_window().overlaps(&booking.guard_window())
        });
        if conflict {
            return Err(SlotwiseError::Conflict("slot window is no longer free".into()));
        }
        rows.push(booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_id(&self, booking_id: &str) -> DomainResult<Option<Booking>> {
        Ok(self.rows.lock().unwrap().iter().find(|b| b.id == booking_id).cloned())
    }

    async fn mark_cancelled(
        &self,
        booking_id: &str,
        now: DateTime<Utc>,
    ) -> DomainResult<Booking> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| SlotwiseError::NotFound(format!("booking {booking_id}")))?;
        if row.status != BookingStatus::Cancelled {
            row.status = BookingStatus::Cancelled;
            row.updated_at = now;
        }
        Ok(row.clone())
    }

    async fn active_in_range(
        &self,
        staff_id: &str,
        range: TimeRange,
    ) -> DomainResult<Vec<Booking>> {
        let mut matches: Vec<Booking> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.staff_id == staff_id
                    && b.status.is_active()
                    && b.guard_window().overlaps(&range)
            })
            .cloned()
            .collect();
        matches.sort_by_key(|b| b.start);
        Ok(matches)
    }

    async fn set_external_ref(
        &self,
        booking_id: &str,
        external_ref: Option<&str>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|b| b.id == booking_id) {
            row.external_event_ref = external_ref.map(str::to_string);
            row.updated_at = now;
        }
        Ok(())
    }

    async fn pending_side_effects(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> DomainResult<Vec<Booking>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                b.status == BookingStatus::Confirmed
                    && b.start > now
                    && b.external_event_ref.is_none()
            })
            .take(limit)
            .cloned()
            .collect())
    }
}

/// In-memory mock for `ReminderStore`.
#[derive(Default, Clone)]
pub struct MockReminderStore {
    rows: Arc<Mutex<Vec<ReminderTask>>>,
}

impl MockReminderStore {
    pub fn tasks(&self) -> Vec<ReminderTask> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReminderStore for MockReminderStore {
    async fn create_if_absent(&self, task: &ReminderTask) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|t| t.booking_id == task.booking_id) {
            return Ok(false);
        }
        rows.push(task.clone());
        Ok(true)
    }

    async fn find_by_booking(&self, booking_id: &str) -> DomainResult<Option<ReminderTask>> {
        Ok(self.rows.lock().unwrap().iter().find(|t| t.booking_id == booking_id).cloned())
    }

    async fn delete_scheduled(&self, booking_id: &str) -> DomainResult<bool> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|t| !(t.booking_id == booking_id && t.state == ReminderState::Scheduled));
        Ok(rows.len() < before)
    }

    async fn due(&self, now: DateTime<Utc>, limit: usize) -> DomainResult<Vec<ReminderTask>> {
        let mut due: Vec<ReminderTask> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.state == ReminderState::Scheduled && t.fire_at <= now)
            .cloned()
            .collect();
        due.sort_by_key(|t| t.fire_at);
        due.truncate(limit);
        Ok(due)
    }

    async fn mark(
        &self,
        booking_id: &str,
        state: ReminderState,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(task) = rows.iter_mut().find(|t| t.booking_id == booking_id) {
            task.state = state;
            task.updated_at = now;
        }
        Ok(())
    }
}
