use std::sync::{Arc, RwLock};

use chrono::NaiveDate;

use crate::domain::booking::booking::Booking;
use crate::domain::utils::id::BookingId;
use crate::error::{Error, Result};

/// Read access to the self-service booking store.
pub trait BookingRepository: std::fmt::Debug + Send + Sync {
    /// Active bookings whose session date lies in `[from, to]`.
    fn find_active(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>>;
}

/// Process-local [`BookingRepository`], also used to seed scenarios.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookingStore {
    bookings: Arc<RwLock<Vec<Booking>>>,
}

impl InMemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, booking: Booking) -> Result<()> {
        let mut guard = self.bookings.write().map_err(|_| Error::PersistenceFailure("booking store lock poisoned".to_string()))?;

        if guard.iter().any(|b| b.id == booking.id) {
            return Err(Error::PersistenceFailure(format!("booking {} already exists", booking.id)));
        }
        guard.push(booking);

        Ok(())
    }

    /// Marks a booking as cancelled. Returns `false` when the id is unknown.
    pub fn cancel(&self, id: &BookingId) -> Result<bool> {
        let mut guard = self.bookings.write().map_err(|_| Error::PersistenceFailure("booking store lock poisoned".to_string()))?;

        match guard.iter_mut().find(|b| &b.id == id) {
            Some(booking) => {
                booking.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl BookingRepository for InMemoryBookingStore {
    fn find_active(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<Booking>> {
        let guard = self.bookings.read().map_err(|_| Error::PersistenceFailure("booking store lock poisoned".to_string()))?;

        Ok(guard
            .iter()
            .filter(|b| b.is_active && b.occurrence.date >= from && b.occurrence.date <= to)
            .cloned()
            .collect())
    }
}
