use crate::domain::slot::occurrence::Occurrence;
use crate::domain::utils::id::{BookingId, UserId};

/// A self-service reservation made by members themselves.
///
/// Stored apart from staff assignments but sharing the same physical
/// capacity: every participant occupies one seat of the occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    pub id: BookingId,
    pub occurrence: Occurrence,
    pub participants: Vec<UserId>,
    pub is_active: bool,
}

impl Booking {
    /// Seats held by this booking.
    pub fn seats(&self) -> u32 {
        self.participants.len() as u32
    }
}
