//! Observer location acquisition.
//!
//! A location request is a one-shot: it is issued once per view, it is never
//! retried and it has no deadline. A request that never completes looks the
//! same as "no location", which is an accepted state.
//!
//! Results can arrive after the owning view is gone. Every request carries a
//! ticket, and [`ObserverSlot::deliver`] drops results whose ticket is not the
//! current one or whose slot has been torn down.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use foundation::GeoPoint;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationError {
    PermissionDenied,
    Unavailable,
}

impl std::fmt::Display for LocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationError::PermissionDenied => write!(f, "location permission denied"),
            LocationError::Unavailable => write!(f, "location unavailable"),
        }
    }
}

impl std::error::Error for LocationError {}

/// Something that can report where the observer is.
pub trait LocationSource: Send + Sync {
    fn locate(&self) -> BoxFuture<'_, Result<GeoPoint, LocationError>>;
}

/// Source with a predetermined answer (command-line coordinates, tests).
#[derive(Debug, Clone)]
pub struct FixedLocationSource {
    result: Result<GeoPoint, LocationError>,
}

impl FixedLocationSource {
    pub fn new(result: Result<GeoPoint, LocationError>) -> Self {
        Self { result }
    }

    /// `Unavailable` when no point is given.
    pub fn from_option(point: Option<GeoPoint>) -> Self {
        Self::new(point.ok_or(LocationError::Unavailable))
    }
}

impl LocationSource for FixedLocationSource {
    fn locate(&self) -> BoxFuture<'_, Result<GeoPoint, LocationError>> {
        let result = self.result;
        Box::pin(async move { result })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    NotRequested,
    Pending,
    Located,
    Failed(LocationError),
}

/// Proof that a delivery belongs to a specific request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationTicket {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delivery {
    Applied(GeoPoint),
    Failed(LocationError),
    /// Superseded request or torn-down slot; nothing changed.
    Stale,
}

#[derive(Debug)]
pub struct ObserverSlot {
    generation: u64,
    live: bool,
    status: LocationStatus,
    location: Option<GeoPoint>,
}

impl Default for ObserverSlot {
    fn default() -> Self {
        Self {
            generation: 0,
            live: true,
            status: LocationStatus::NotRequested,
            location: None,
        }
    }
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    pub fn status(&self) -> LocationStatus {
        self.status
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Starts a new request, superseding any earlier one.
    pub fn begin(&mut self) -> LocationTicket {
        self.generation += 1;
        if self.live {
            self.status = LocationStatus::Pending;
        }
        LocationTicket {
            generation: self.generation,
        }
    }

    pub fn deliver(
        &mut self,
        ticket: LocationTicket,
        result: Result<GeoPoint, LocationError>,
    ) -> Delivery {
        if !self.live || ticket.generation != self.generation {
            return Delivery::Stale;
        }
        // Only the first result for a ticket counts.
        if self.status != LocationStatus::Pending {
            return Delivery::Stale;
        }
        match result {
            Ok(point) => {
                self.location = Some(point);
                self.status = LocationStatus::Located;
                Delivery::Applied(point)
            }
            Err(err) => {
                self.status = LocationStatus::Failed(err);
                Delivery::Failed(err)
            }
        }
    }

    /// Marks the owner as gone; later deliveries are dropped.
    pub fn teardown(&mut self) {
        self.live = false;
    }
}

/// Shared handle to an [`ObserverSlot`].
#[derive(Debug, Clone, Default)]
pub struct ObserverHandle {
    slot: Arc<Mutex<ObserverSlot>>,
}

impl ObserverHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.slot.lock().location()
    }

    pub fn status(&self) -> LocationStatus {
        self.slot.lock().status()
    }

    pub fn teardown(&self) {
        self.slot.lock().teardown();
    }

    /// Issues one request against `source` and records its outcome.
    ///
    /// Failures are logged and leave the observer location unset.
    pub async fn acquire(&self, source: &dyn LocationSource) -> Delivery {
        let ticket = self.slot.lock().begin();
        let result = source.locate().await;
        let delivery = self.slot.lock().deliver(ticket, result);
        match delivery {
            Delivery::Applied(p) => info!(lat = p.lat, lng = p.lng, "observer located"),
            Delivery::Failed(err) => warn!("location access denied or unavailable: {err}"),
            Delivery::Stale => debug!("dropping stale location result"),
        }
        delivery
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_first_result_once() {
        let mut slot = ObserverSlot::new();
        let t = slot.begin();
        assert_eq!(slot.status(), LocationStatus::Pending);
        let p = GeoPoint::new(40.0, -74.0);
        assert_eq!(slot.deliver(t, Ok(p)), Delivery::Applied(p));
        assert_eq!(
            slot.deliver(t, Ok(GeoPoint::new(0.0, 0.0))),
            Delivery::Stale
        );
        assert_eq!(slot.location(), Some(p));
    }

    #[test]
    fn failure_leaves_location_unset() {
        let mut slot = ObserverSlot::new();
        let t = slot.begin();
        assert_eq!(
            slot.deliver(t, Err(LocationError::PermissionDenied)),
            Delivery::Failed(LocationError::PermissionDenied)
        );
        assert_eq!(slot.location(), None);
        assert_eq!(
            slot.status(),
            LocationStatus::Failed(LocationError::PermissionDenied)
        );
    }

    #[test]
    fn results_after_teardown_are_ignored() {
        let mut slot = ObserverSlot::new();
        let t = slot.begin();
        slot.teardown();
        assert_eq!(
            slot.deliver(t, Ok(GeoPoint::new(1.0, 1.0))),
            Delivery::Stale
        );
        assert_eq!(slot.location(), None);
    }

    #[test]
    fn superseded_ticket_is_stale() {
        let mut slot = ObserverSlot::new();
        let old = slot.begin();
        let new = slot.begin();
        assert_eq!(slot.deliver(old, Ok(GeoPoint::new(1.0, 1.0))), Delivery::Stale);
        let p = GeoPoint::new(2.0, 2.0);
        assert_eq!(slot.deliver(new, Ok(p)), Delivery::Applied(p));
    }

    #[tokio::test]
    async fn acquire_records_fixed_location() {
        let handle = ObserverHandle::new();
        let p = GeoPoint::new(40.7, -74.0);
        let d = handle.acquire(&FixedLocationSource::from_option(Some(p))).await;
        assert_eq!(d, Delivery::Applied(p));
        assert_eq!(handle.location(), Some(p));
    }

    struct Gated(tokio::sync::Mutex<Option<tokio::sync::oneshot::Receiver<GeoPoint>>>);

    impl LocationSource for Gated {
        fn locate(&self) -> BoxFuture<'_, Result<GeoPoint, LocationError>> {
            Box::pin(async move {
                let rx = self.0.lock().await.take().ok_or(LocationError::Unavailable)?;
                rx.await.map_err(|_| LocationError::Unavailable)
            })
        }
    }

    #[tokio::test]
    async fn late_result_after_teardown_is_dropped() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let source = Gated(tokio::sync::Mutex::new(Some(rx)));
        let handle = ObserverHandle::new();

        let pending = handle.acquire(&source);
        let viewer = handle.clone();
        let (delivery, _) = tokio::join!(pending, async move {
            viewer.teardown();
            let _ = tx.send(GeoPoint::new(1.0, 1.0));
        });
        assert_eq!(delivery, Delivery::Stale);
        assert_eq!(handle.location(), None);
    }

    #[tokio::test]
    async fn unavailable_source_is_not_an_error() {
        let handle = ObserverHandle::new();
        let d = handle.acquire(&FixedLocationSource::from_option(None)).await;
        assert_eq!(d, Delivery::Failed(LocationError::Unavailable));
        assert_eq!(handle.location(), None);
    }
}
