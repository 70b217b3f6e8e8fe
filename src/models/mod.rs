// src/models/mod.rs

pub mod email;
pub mod html;
