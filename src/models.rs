pub mod project;
pub mod session;
pub mod user;
pub mod upload;
