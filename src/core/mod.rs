// src/core/mod.rs

pub mod aggregate;
pub mod classify;
pub mod select;
pub mod session;
