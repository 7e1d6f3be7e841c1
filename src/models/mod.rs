pub mod appointments;
pub mod clients;
pub mod procedures;
pub mod professionals;

pub mod deliveries;
pub mod reminder_jobs;
