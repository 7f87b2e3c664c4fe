// src/handlers/mod.rs
pub mod advertise;
pub mod heartbeat;
pub mod servers;
