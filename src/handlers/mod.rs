pub mod auth;
pub mod clients;
pub mod gst_records;
pub mod periods;
pub mod settings;
pub mod staff;
