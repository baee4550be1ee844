//! Read models.

pub mod user;
