// src/handlers/mod.rs

pub mod auth;
pub mod classroom;
pub mod quiz;
pub mod response;
