use crate::domain::entities::document::{
    AssignmentRequest, DashboardCounts, Document, ReviewSubmission, Stage, User, UserId, UserRole,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Network(String),
    Status(u16, String),
    Decode(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Network(message) => write!(f, "network error: {message}"),
            ApiError::Status(code, message) => write!(f, "server returned {code}: {message}"),
            ApiError::Decode(message) => write!(f, "unexpected response: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Remote document service. Calls block the caller until the response arrives.
pub trait DocumentApi: Send + Sync {
    fn fetch_documents(&self, stage: Stage) -> Result<Vec<Document>, ApiError>;
    fn fetch_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiError>;
    fn fetch_dashboard_counts(&self) -> Result<DashboardCounts, ApiError>;

    fn assign_documents(&self, request: &AssignmentRequest) -> Result<(), ApiError>;
    fn auto_assign(&self, requesting_user_id: UserId) -> Result<(), ApiError>;
    fn submit_review(&self, review: &ReviewSubmission) -> Result<(), ApiError>;
}
