use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::TransportError;

/// Admits one request at a time; a second caller fails fast.
#[derive(Debug, Default)]
pub struct InFlightGate {
    busy: AtomicBool,
}

/// Releases the gate when dropped.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    busy: &'a AtomicBool,
}

impl InFlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> Result<InFlightGuard<'_>, TransportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TransportError::RequestInFlight)?;
        Ok(InFlightGuard { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
