//! Admission control for in-flight fetches
//!
//! The gate is a counting semaphore plus two counters: how many fetches are
//! currently admitted and the highest number ever admitted at once. Waiting
//! callers are parked by the semaphore; there is no polling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Caps the number of concurrently running fetches
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    inner: Arc<GateInner>,
}

#[derive(Debug)]
struct GateInner {
    semaphore: Arc<Semaphore>,
    ceiling: usize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

/// An admitted fetch
///
/// The slot goes back to the gate when dropped, so every exit path of the
/// guarded operation releases it, including early returns and panics.
#[derive(Debug)]
pub struct Slot {
    gate: Arc<GateInner>,
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    /// Creates a gate admitting at most `ceiling` fetches at once
    ///
    /// A ceiling of zero is raised to one so the gate can never deadlock.
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(1);
        Self {
            inner: Arc::new(GateInner {
                semaphore: Arc::new(Semaphore::new(ceiling)),
                ceiling,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }),
        }
    }

    /// Waits until a slot is free and takes it
    ///
    /// Fairness between waiters is whatever the semaphore provides.
    ///
    /// # Returns
    ///
    /// * `Some(Slot)` - The fetch may proceed
    /// * `None` - The gate was closed; no more fetches are admitted
    pub async fn acquire(&self) -> Option<Slot> {
        let permit = Arc::clone(&self.inner.semaphore)
            .acquire_owned()
            .await
            .ok()?;

        let now = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.peak.fetch_max(now, Ordering::SeqCst);
        tracing::trace!("Admitted fetch ({}/{} in flight)", now, self.inner.ceiling);

        Some(Slot {
            gate: Arc::clone(&self.inner),
            _permit: permit,
        })
    }

    /// Stops admitting fetches; current and future waiters get `None`
    ///
    /// Slots already handed out stay valid until released.
    pub fn close(&self) {
        self.inner.semaphore.close();
    }

    /// Hands a slot back to the gate
    pub fn release(&self, slot: Slot) {
        drop(slot);
    }

    pub fn ceiling(&self) -> usize {
        self.inner.ceiling
    }

    /// Number of slots currently held
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of slots ever held at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.inner.peak.load(Ordering::SeqCst)
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        // Runs before the permit field is dropped, keeping in_flight <= ceiling.
        self.gate.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
