//! Accounts for students, secretaries and administrators.

pub mod domain;
pub mod service;


pub use domain::{NewUser, Role, User, UserFilter, UserId, UserPatch, UserStatus, UserView};
pub use service::UserService;
