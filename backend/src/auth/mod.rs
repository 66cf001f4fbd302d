//! Caller identity: JWT-carried CRM credentials for the reports and a static
//! bearer token for the feedback endpoints.

pub mod jwt;
pub mod middleware;

pub use middleware::{CrmUser, FeedbackToken};
