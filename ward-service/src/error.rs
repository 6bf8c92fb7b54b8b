use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bed {bed_number} is outside room capacity {capacity}")]
    BedOutOfRange { bed_number: i32, capacity: i32 },

    #[error("Bed {0} is already occupied")]
    BedOccupied(i32),

    #[error("Patient already has an active bed assignment")]
    PatientAlreadyAdmitted,

    #[error("Bed assignment is already discharged")]
    AlreadyDischarged,

    #[error("Room capacity cannot drop below occupied bed {0}")]
    CapacityBelowOccupied(i32),

    #[error("Room still has occupied beds")]
    RoomOccupied,
}

pub type WardResult<T> = Result<T, WardError>;
