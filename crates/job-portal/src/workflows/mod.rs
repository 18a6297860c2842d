pub mod accounts;
pub mod alerts;
pub mod listings;
