//! Night-shift staffing for running courses.

pub mod domain;
pub mod service;


pub use domain::{
    AssignmentStatus, NewNightShift, NightShift, NightShiftAssignment, NightShiftId,
    NightShiftPatch, ShiftAssignmentId, ShiftFilter,
};
pub use service::{NightShiftService, NIGHT_SHIFT_LINK};
