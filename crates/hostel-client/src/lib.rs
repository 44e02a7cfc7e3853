//! Portal-side logic for the hostel complaint service: the HTTP client, the
//! student directory and local sessions, and the admin dashboard and student
//! portal views built on top of them.

pub mod api;
pub mod dashboard;
pub mod directory;
pub mod display;
pub mod error;
pub mod portal;
pub mod refresh;
pub mod session;
pub mod storage;

pub use api::ComplaintClient;
pub use error::ClientError;
