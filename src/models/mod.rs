// src/models/mod.rs

pub mod classroom;
pub mod quiz;
pub mod quiz_response;
pub mod user;
