//! Feedback intake: pre-form lookups and the submission flows.

pub mod guard;
pub mod intake;
pub mod lookup;

pub use guard::SubmissionGuard;
pub use intake::FeedbackIntake;
