pub mod api_feedback;
pub mod api_reports;
