//! Answer grading.
//!
//! Compares a learner's answer to the reference value after both have been
//! normalized. Two matching policies exist: strict for names and floors,
//! loose for numeric spec fields that tolerate partial recall of a range.

use serde::{Deserialize, Serialize};

use crate::model::{Answers, Field, Truth};
use crate::normalize::normalize;

/// How tolerant a comparison is of partial answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The truth must contain the answer and the answer must be at least as
    /// long as the truth, which in effect demands an exact match. Fragments
    /// and longer names that merely embed the truth are rejected.
    Strict,
    /// Exact match, or either value containing the other.
    Loose,
}

/// Grade a single answer against its reference value.
///
/// An empty normalized truth always passes: there is nothing to grade.
pub fn is_correct(user: &str, truth: &str, policy: MatchPolicy) -> bool {
    let v = normalize(Some(truth));
    if v.is_empty() {
        return true;
    }
    let u = normalize(Some(user));
    if u == v {
        return true;
    }
    if u.is_empty() {
        return false;
    }

    match policy {
        MatchPolicy::Strict => v.contains(&u) && u.chars().count() >= v.chars().count(),
        MatchPolicy::Loose => u.contains(&v) || v.contains(&u),
    }
}

/// Grading result for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVerdict {
    pub field: Field,
    pub expected: String,
    pub given: String,
    pub correct: bool,
}

/// Grading result for one quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// `true` only when every field is correct.
    pub correct: bool,
    pub fields: Vec<FieldVerdict>,
}

impl Verdict {
    pub fn wrong_fields(&self) -> impl Iterator<Item = &FieldVerdict> {
        self.fields.iter().filter(|f| !f.correct)
    }
}

/// Grade every field of `truth` with the field's own policy.
pub fn grade(truth: &Truth, answers: &Answers) -> Verdict {
    let fields: Vec<FieldVerdict> = truth
        .entries
        .iter()
        .map(|(field, expected)| {
            let given = answers.get(*field);
            FieldVerdict {
                field: *field,
                expected: expected.clone(),
                given: given.to_string(),
                correct: is_correct(given, expected, field.policy()),
            }
        })
        .collect();

    Verdict {
        correct: fields.iter().all(|f| f.correct),
        fields,
    }
}
