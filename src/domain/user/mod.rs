//! User domain: accounts, roles and vendor requests

mod entity;
mod repository;
pub mod validation;

pub use entity::{
    username_from_email, AcademicProfile, NewUser, ProfilePatch, User, UserRole, VendorRequest,
    VendorRequestStatus,
};
pub use repository::UserRepository;
pub use validation::UserValidationError;
