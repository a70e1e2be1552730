//! # Feedback Command
//!
//! Appends one customer feedback row to the Feedback table.

use std::io::Write;

use clap::Args;
use serde::Serialize;
use shelfline_core::feedback::DEFAULT_RATING;
use shelfline_core::{FeedbackDraft, FeedbackEntry};
use shelfline_sheets::TabularStore;
use tracing::debug;

use super::Output;
use crate::error::AppResult;
use crate::state::Session;

/// Arguments for `feedback`.
#[derive(Debug, Clone, Args)]
pub struct FeedbackArgs {
    /// Customer name
    #[arg(long)]
    pub name: String,

    /// Mobile number or email
    #[arg(long, default_value = "")]
    pub contact: String,

    /// Rating from 1 to 5
    #[arg(long, default_value_t = DEFAULT_RATING)]
    pub rating: u8,

    /// Outlet the feedback is about
    #[arg(long, default_value = "")]
    pub outlet: String,

    /// Feedback text
    #[arg(long)]
    pub message: String,
}

impl From<&FeedbackArgs> for FeedbackDraft {
    fn from(args: &FeedbackArgs) -> Self {
        FeedbackDraft {
            customer_name: args.name.clone(),
            contact: args.contact.clone(),
            rating: args.rating,
            outlet: args.outlet.clone(),
            feedback: args.message.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackResponse<'a> {
    #[serde(flatten)]
    entry: &'a FeedbackEntry,
    rating_label: String,
}

/// Validates and submits one piece of feedback.
pub async fn submit<S: TabularStore, W: Write>(
    session: &mut Session<S>,
    out: &mut Output<W>,
    args: &FeedbackArgs,
) -> AppResult<()> {
    debug!(rating = args.rating, "feedback command");

    let entry = session.submit_feedback(&FeedbackDraft::from(args)).await?;
    let response = FeedbackResponse {
        entry,
        rating_label: entry.rating_label(),
    };

    out.emit(&response, || {
        format!(
            "Thank you, {}! Feedback recorded ({}).",
            entry.customer_name, response.rating_label
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::SessionSettings;
    use shelfline_core::Catalog;
    use shelfline_sheets::{MemoryTable, SheetTable};
    use std::sync::Arc;

    fn args(rating: u8) -> FeedbackArgs {
        FeedbackArgs {
            name: "Omar".into(),
            contact: String::new(),
            rating,
            outlet: "Marina".into(),
            message: "Fresh bread every morning".into(),
        }
    }

    fn session(feedback: &SheetTable<MemoryTable>) -> Session<MemoryTable> {
        Session::new(
            Arc::new(Catalog::new(Vec::new())),
            SheetTable::new("Items", MemoryTable::new()),
            feedback.clone(),
            SessionSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_feedback_appended() {
        let table = SheetTable::new("Feedback", MemoryTable::new());
        let mut session = session(&table);

        let mut out = Output::new(false, Vec::new());
        submit(&mut session, &mut out, &args(5)).await.unwrap();
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert_eq!(text, "Thank you, Omar! Feedback recorded (5 / 5).\n");

        let rows = table.store().rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "N/A");
        assert_eq!(rows[1][3], "Marina");
    }

    #[tokio::test]
    async fn test_rating_out_of_range() {
        let table = SheetTable::new("Feedback", MemoryTable::new());
        let mut session = session(&table);

        let mut out = Output::new(true, Vec::new());
        let err = submit(&mut session, &mut out, &args(0)).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(table.store().rows().is_empty());
    }
}
