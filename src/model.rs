//! Plain data records shared between the auth core and the quiz screens.
//!
//! DESIGN
//! ======
//! `User` is a projection of the identity provider's session at query time.
//! `Question` and `QuizResult` carry no behavior; field names serialize in
//! camelCase to match the documents the mobile client stores.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use serde::{Deserialize, Serialize};

/// Signed-in identity as seen by the application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-assigned unique identifier.
    pub id: String,
    /// Display name, if the provider has one on file.
    pub display_name: Option<String>,
    /// Email address, if the provider has one on file.
    pub email: Option<String>,
}

/// A single multiple-choice question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub id: String,
    pub statement: String,
    pub options: Vec<String>,
    pub correct_answer_index: i32,
}

/// Outcome of one finished quiz.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizResult {
    pub user_id: String,
    /// Completion time in milliseconds since the Unix epoch.
    pub date: i64,
    pub score: i32,
    pub total_questions: i32,
}
