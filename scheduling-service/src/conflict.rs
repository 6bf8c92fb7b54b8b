use uuid::Uuid;

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::{AppointmentStatus, TimeSlot};

/// An existing booking in a doctor's calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookedSlot {
    pub appointment_id: Uuid,
    pub slot: TimeSlot,
    pub status: AppointmentStatus,
}

/// First booking that blocks `candidate`.
///
/// Terminal appointments free their slot, and `exclude` skips the
/// appointment being rescheduled.
pub fn find_conflict<'a>(
    candidate: &TimeSlot,
    booked: &'a [BookedSlot],
    exclude: Option<Uuid>,
) -> Option<&'a BookedSlot> {
    booked.iter().find(|existing| {
        Some(existing.appointment_id) != exclude
            && !existing.status.is_terminal()
            && existing.slot.overlaps(candidate)
    })
}

pub fn ensure_slot_free(candidate: &TimeSlot, booked: &[BookedSlot], exclude: Option<Uuid>) -> SchedulingResult<()> {
    match find_conflict(candidate, booked, exclude) {
        Some(existing) => {
            tracing::debug!(conflicting = %existing.appointment_id, "Slot conflict detected");
            Err(SchedulingError::SlotConflict)
        }
        None => Ok(()),
    }
}
