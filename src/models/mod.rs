pub mod client;
pub mod gst_record;
pub mod period;
pub mod setting;
pub mod user;

pub use client::Client;
pub use gst_record::{GstRecord, GstRecordWithContext};
pub use period::Period;
pub use setting::Setting;
pub use user::{PublicUser, User};
