pub mod auth;
pub mod contact;
pub mod listing;
pub mod modal;
pub mod navigation;
pub mod projects;
pub mod reorder;
