pub mod auth;
pub mod patient;
pub mod token;

pub use auth::AuthService;
pub use patient::PatientService;
pub use token::TokenService;
