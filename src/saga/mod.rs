pub mod assignment;

pub use assignment::{accept_job, AcceptOutcome};
