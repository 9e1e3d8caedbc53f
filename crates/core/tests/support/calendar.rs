//! In-memory mocks for the external calendar and notification ports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use slotwise_core::dispatch::ports::{CalendarMirror, NotificationSender};
use slotwise_core::ExternalBusyFeed;
use slotwise_domain::{
    Booking, BusyInterval, Result as DomainResult, SlotwiseError, StaffMember, TimeRange,
};

/// In-memory mock for `ExternalBusyFeed`.
#[derive(Default, Clone)]
pub struct MockBusyFeed {
    busy: Arc<Mutex<Vec<BusyInterval>>>,
    unreachable: Arc<AtomicBool>,
}

impl MockBusyFeed {
    pub fn with_busy(self, interval: BusyInterval) -> Self {
        self.busy.lock().unwrap().push(interval);
        self
    }

    /// Add a busy interval after construction.
    pub fn push_busy(&self, interval: BusyInterval) {
        self.busy.lock().unwrap().push(interval);
    }

    /// Make the feed fail with `Unreachable` until further notice.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }
}

#[async_trait]
impl ExternalBusyFeed for MockBusyFeed {
    async fn fetch_busy(
        &self,
        staff: &StaffMember,
        range: TimeRange,
    ) -> DomainResult<Vec<BusyInterval>> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(SlotwiseError::Unreachable("mock feed offline".into()));
        }
        Ok(self
            .busy
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.staff_id == staff.id && b.window.overlaps(&range))
            .cloned()
            .collect())
    }
}

/// In-memory mock for `CalendarMirror` that records push/retract calls.
#[derive(Default, Clone)]
pub struct MockMirror {
    pushes: Arc<Mutex<Vec<String>>>,
    retractions: Arc<Mutex<Vec<String>>>,
    auth_expired: Arc<AtomicBool>,
}

impl MockMirror {
    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().unwrap().clone()
    }

    pub fn retractions(&self) -> Vec<String> {
        self.retractions.lock().unwrap().clone()
    }

    /// Simulate an unlinked calendar account.
    pub fn set_auth_expired(&self, expired: bool) {
        self.auth_expired.store(expired, Ordering::SeqCst);
    }
}

#[async_trait]
impl CalendarMirror for MockMirror {
    async fn push_booking(
        &self,
        _staff: &StaffMember,
        booking: &Booking,
    ) -> DomainResult<String> {
        if self.auth_expired.load(Ordering::SeqCst) {
            return Err(SlotwiseError::AuthExpired("mock account unlinked".into()));
        }
        self.pushes.lock().unwrap().push(booking.id.clone());
        Ok(format!("ext-{}", booking.id))
    }

    async fn retract_booking(
        &self,
        _staff: &StaffMember,
        external_ref: &str,
    ) -> DomainResult<()> {
        self.retractions.lock().unwrap().push(external_ref.to_string());
        Ok(())
    }
}

/// In-memory mock for `NotificationSender`.
#[derive(Default, Clone)]
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    failing: Arc<AtomicBool>,
}

impl MockNotifier {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSender for MockNotifier {
    async fn send(&self, client_contact: &str, message: &str) -> DomainResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SlotwiseError::Network("mock notifier down".into()));
        }
        self.sent.lock().unwrap().push((client_contact.to_string(), message.to_string()));
        Ok(())
    }
}
