// src/services/mod.rs

pub mod classrooms;
pub mod closer;
pub mod identity;
pub mod quizzes;
