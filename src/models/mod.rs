// src/models/mod.rs
pub mod agent;
pub mod conversation;
pub mod ticket;
