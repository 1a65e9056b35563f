//! Courses and their scheduling windows.

pub mod domain;
pub mod service;


pub use domain::{Course, CourseFilter, CourseId, CoursePatch, CourseStatus, NewCourse};
pub use service::CourseService;
