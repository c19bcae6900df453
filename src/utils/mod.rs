// src/utils/mod.rs

pub mod auth;
pub mod html;
pub mod jwt;
pub mod oauth;
pub mod session;
