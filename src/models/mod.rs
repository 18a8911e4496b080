// src/models/mod.rs

pub mod exam;
pub mod mcq;
pub mod query;
pub mod registration;
pub mod result;
pub mod user;
