// src/handlers/mod.rs

pub mod email;
pub mod health;
pub mod html;
