use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::domain::entities::document::{Document, DocumentId, ReviewSubmission, Stage, UserId};
use crate::usecase::ports::api::{ApiError, DocumentApi};

pub const MIN_REMARK_LEN: usize = 10;
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Raw values of the chart review form as typed by the auditor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReviewForm {
    pub codes_missed: String,
    pub codes_corrected: String,
    pub remarks: String,
    pub rating: Option<u8>,
}

/// Field name → inline message.
pub type ReviewFormErrors = BTreeMap<&'static str, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    pub codes_missed: Vec<String>,
    pub codes_corrected: Vec<String>,
    pub remarks: String,
    pub rating: u8,
}

/// Splits on commas and whitespace, upper-cases, drops blanks and repeats.
pub fn normalize_codes(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|code| code.trim().to_ascii_uppercase())
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

impl ReviewForm {
    pub fn validate(&self) -> Result<ReviewDraft, ReviewFormErrors> {
        let mut errors = ReviewFormErrors::new();

        let rating = match self.rating {
            None => {
                errors.insert("rating", "rating is required".to_string());
                0
            }
            Some(rating) if !RATING_RANGE.contains(&rating) => {
                errors.insert(
                    "rating",
                    format!(
                        "rating must be between {} and {}",
                        RATING_RANGE.start(),
                        RATING_RANGE.end()
                    ),
                );
                0
            }
            Some(rating) => rating,
        };

        let remarks = self.remarks.trim().to_string();
        if remarks.chars().count() < MIN_REMARK_LEN {
            errors.insert(
                "remarks",
                format!("remarks must be at least {MIN_REMARK_LEN} characters"),
            );
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(ReviewDraft {
            codes_missed: normalize_codes(&self.codes_missed),
            codes_corrected: normalize_codes(&self.codes_corrected),
            remarks,
            rating,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    Invalid(ReviewFormErrors),
    Api(ApiError),
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::Invalid(errors) => {
                let fields: Vec<&str> = errors.keys().copied().collect();
                write!(f, "review form has errors in: {}", fields.join(", "))
            }
            ReviewError::Api(err) => write!(f, "review submission failed: {err}"),
        }
    }
}

impl std::error::Error for ReviewError {}

pub struct ReviewService;

impl ReviewService {
    /// Posts the review and returns the refreshed audit queue.
    pub fn submit(
        api: &dyn DocumentApi,
        document_id: DocumentId,
        reviewer_id: UserId,
        form: &ReviewForm,
    ) -> Result<Vec<Document>, ReviewError> {
        let draft = form.validate().map_err(ReviewError::Invalid)?;
        let submission = ReviewSubmission {
            document_id,
            reviewer_id,
            codes_missed: draft.codes_missed,
            codes_corrected: draft.codes_corrected,
            remarks: draft.remarks,
            rating: draft.rating,
        };

        api.submit_review(&submission).map_err(|err| {
            warn!(document = %document_id, error = %err, "review submission failed");
            ReviewError::Api(err)
        })?;
        info!(document = %document_id, rating = submission.rating, "review submitted");

        api.fetch_documents(Stage::Audit).map_err(ReviewError::Api)
    }
}
