//! # Customer Feedback
//!
//! Validation and row layout for the append-only Feedback table.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::record::{FlatRecord, SUBMITTED_AT_FORMAT};
use crate::validation::{require_text, validate_rating, ValidationResult};

/// Header row of the Feedback table, in column order.
pub const FEEDBACK_COLUMNS: [&str; 6] = [
    "Customer Name",
    "Mobile Number/Email",
    "Rating",
    "Outlet",
    "Feedback",
    "Submitted At",
];

/// Written when the customer leaves no contact details.
pub const NO_CONTACT: &str = "N/A";

/// Star rating preselected on the form.
pub const DEFAULT_RATING: u8 = 5;

fn default_rating() -> u8 {
    DEFAULT_RATING
}

/// Raw feedback form input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default = "default_rating")]
    pub rating: u8,
    #[serde(default)]
    pub outlet: String,
    #[serde(default)]
    pub feedback: String,
}

impl Default for FeedbackDraft {
    fn default() -> Self {
        FeedbackDraft {
            customer_name: String::new(),
            contact: String::new(),
            rating: DEFAULT_RATING,
            outlet: String::new(),
            feedback: String::new(),
        }
    }
}

/// A validated feedback entry, ready to append.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    pub customer_name: String,
    pub contact: String,
    pub rating: u8,
    pub outlet: String,
    pub feedback: String,
    pub submitted_at: NaiveDateTime,
}

impl FeedbackEntry {
    /// Validates a draft, stamped with the local time.
    pub fn from_draft(draft: &FeedbackDraft) -> ValidationResult<Self> {
        Self::from_draft_at(draft, Local::now().naive_local())
    }

    /// Validates a draft with an explicit timestamp.
    ///
    /// Customer name and feedback text are required; the rating must be 1
    /// to 5. A blank contact becomes [`NO_CONTACT`].
    pub fn from_draft_at(draft: &FeedbackDraft, submitted_at: NaiveDateTime) -> ValidationResult<Self> {
        let customer_name = require_text(FEEDBACK_COLUMNS[0], &draft.customer_name)?;
        let feedback = require_text(FEEDBACK_COLUMNS[4], &draft.feedback)?;
        validate_rating(draft.rating)?;

        let contact = match draft.contact.trim() {
            "" => NO_CONTACT.to_string(),
            contact => contact.to_string(),
        };

        Ok(FeedbackEntry {
            customer_name,
            contact,
            rating: draft.rating,
            outlet: draft.outlet.trim().to_string(),
            feedback,
            submitted_at,
        })
    }

    /// Rating as displayed and written, e.g. `"4 / 5"`.
    pub fn rating_label(&self) -> String {
        format!("{} / 5", self.rating)
    }

    /// Flattens the entry into a Feedback row.
    pub fn to_record(&self) -> FlatRecord {
        let [name, contact, rating, outlet, feedback, submitted] = FEEDBACK_COLUMNS;
        FlatRecord::new()
            .with(name, self.customer_name.as_str())
            .with(contact, self.contact.as_str())
            .with(rating, self.rating_label())
            .with(outlet, self.outlet.as_str())
            .with(feedback, self.feedback.as_str())
            .with(submitted, self.submitted_at.format(SUBMITTED_AT_FORMAT).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use chrono::NaiveDate;

    fn stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 2)
            .unwrap()
            .and_hms_opt(18, 5, 0)
            .unwrap()
    }

    fn draft() -> FeedbackDraft {
        FeedbackDraft {
            customer_name: " Layla ".to_string(),
            rating: 4,
            outlet: "Marina".to_string(),
            feedback: "Fresh bread ran out early".to_string(),
            ..FeedbackDraft::default()
        }
    }

    #[test]
    fn test_record_layout() {
        let entry = FeedbackEntry::from_draft_at(&draft(), stamp()).unwrap();
        let record = entry.to_record();

        assert_eq!(record.field_names(), FEEDBACK_COLUMNS.to_vec());
        assert_eq!(record.get("Customer Name"), Some("Layla"));
        assert_eq!(record.get("Mobile Number/Email"), Some("N/A"));
        assert_eq!(record.get("Rating"), Some("4 / 5"));
        assert_eq!(record.get("Submitted At"), Some("2025-04-02 18:05:00"));
    }

    #[test]
    fn test_required_fields_and_rating() {
        let mut no_text = draft();
        no_text.feedback = "  ".to_string();
        assert_eq!(
            FeedbackEntry::from_draft_at(&no_text, stamp()).unwrap_err(),
            ValidationError::required("Feedback")
        );

        let mut bad_rating = draft();
        bad_rating.rating = 0;
        assert!(FeedbackEntry::from_draft_at(&bad_rating, stamp()).is_err());
    }

    #[test]
    fn test_rating_defaults_to_five() {
        let parsed: FeedbackDraft =
            serde_json::from_str(r#"{"customer_name":"Omar","feedback":"Great"}"#).unwrap();
        assert_eq!(parsed.rating, 5);
    }
}
