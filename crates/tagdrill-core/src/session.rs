//! Quiz session controller.
//!
//! A session is an ordered list of quiz items, a cursor and a running score.
//! Submitting grades the current item and records the outcome with the
//! proficiency tracker, but does not move the cursor: the caller shows the
//! revealed answer and then redeems the returned [`AdvanceTicket`]. Only the
//! ticket of the latest submission is honoured, so repeated submissions for
//! the same item advance at most once.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::grading::{grade, Verdict};
use crate::model::{Answers, CategorySelection, Field, QuizItem, ReferenceData, Truth};
use crate::proficiency::{ProficiencyRecord, ProficiencyTracker};

/// Fraction of each category sampled in exam mode.
pub const EXAM_RATIO: f64 = 0.33;

/// How a session picks its items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionOptions {
    pub selection: CategorySelection,
    /// Maximum number of items; `0` means all.
    pub item_limit: usize,
    pub exam_mode: bool,
    pub exam_ratio: f64,
}

impl SessionOptions {
    pub fn new(selection: impl Into<CategorySelection>) -> Self {
        Self {
            selection: selection.into(),
            item_limit: 0,
            exam_mode: false,
            exam_ratio: EXAM_RATIO,
        }
    }

    pub fn with_limit(mut self, item_limit: usize) -> Self {
        self.item_limit = item_limit;
        self
    }

    pub fn exam(mut self, exam_mode: bool) -> Self {
        self.exam_mode = exam_mode;
        self
    }

    pub fn with_exam_ratio(mut self, ratio: f64) -> Self {
        self.exam_ratio = ratio;
        self
    }
}

/// Number of items exam mode draws from a category of `count` items:
/// `ceil(count × ratio)`, at least one and at most `count`.
pub fn exam_sample_size(count: usize, ratio: f64) -> usize {
    if count == 0 {
        return 0;
    }
    let k = (count as f64 * ratio).ceil();
    if k.is_finite() && k > 0.0 {
        (k as usize).clamp(1, count)
    } else {
        1
    }
}

/// Uniformly sample `exam_sample_size(items.len(), ratio)` items without replacement.
pub fn sample_by_ratio<R: Rng + ?Sized>(
    mut items: Vec<QuizItem>,
    ratio: f64,
    rng: &mut R,
) -> Vec<QuizItem> {
    let k = exam_sample_size(items.len(), ratio);
    items.shuffle(rng);
    items.truncate(k);
    items
}

/// Self-assessment typed into the primary answer field instead of an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shortcut {
    /// `1`: the learner marks the item as known.
    Knew,
    /// `2`: the learner marks the item as not known.
    DidNotKnow,
}

impl Shortcut {
    /// Detect a shortcut in the primary answer.
    ///
    /// A genuine answer of exactly `1` or `2` is indistinguishable from a
    /// shortcut and is always read as one.
    pub fn detect(primary: &str) -> Option<Self> {
        match primary.trim() {
            "1" => Some(Shortcut::Knew),
            "2" => Some(Shortcut::DidNotKnow),
            _ => None,
        }
    }

    pub fn is_correct(self) -> bool {
        self == Shortcut::Knew
    }
}

/// How a submission was judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Grading {
    Graded { verdict: Verdict },
    SelfMarked { shortcut: Shortcut },
}

/// Redeemable once to move past the item it was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AdvanceTicket(u64);

/// The outcome of submitting answers for the current item.
#[derive(Debug, Clone)]
pub struct Submission {
    pub item: QuizItem,
    /// The revealed ground truth.
    pub truth: Truth,
    pub correct: bool,
    pub grading: Grading,
    /// Proficiency of the item after this outcome was recorded.
    pub proficiency: ProficiencyRecord,
    pub ticket: AdvanceTicket,
}

/// Final result of one item in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemResult {
    Correct,
    Wrong,
    SelfMarkedCorrect,
    SelfMarkedWrong,
    Skipped,
}

impl ItemResult {
    pub fn is_correct(self) -> bool {
        matches!(self, ItemResult::Correct | ItemResult::SelfMarkedCorrect)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemOutcome {
    pub item: QuizItem,
    pub result: ItemResult,
}

/// Progress view for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionProgress {
    /// 1-based position of the current item, clamped to `total`.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    pub is_complete: bool,
}

#[derive(Debug, Clone)]
struct Pending {
    ticket: AdvanceTicket,
    result: ItemResult,
}

/// A running quiz session.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    options: SessionOptions,
    items: Vec<QuizItem>,
    cursor: usize,
    correct: usize,
    pending: Option<Pending>,
    next_ticket: u64,
    outcomes: Vec<ItemOutcome>,
}

impl QuizSession {
    /// Build and shuffle the item list for a new session.
    ///
    /// Fails with [`QuizError::NoItems`] when the selection yields nothing,
    /// which means the reference tables have not been loaded.
    pub fn start<R: Rng + ?Sized>(
        data: &ReferenceData,
        options: SessionOptions,
        rng: &mut R,
    ) -> Result<Self, QuizError> {
        let mut items = Vec::new();
        for category in options.selection.categories() {
            let candidates = data.items(category);
            if options.exam_mode {
                items.extend(sample_by_ratio(candidates, options.exam_ratio, rng));
            } else {
                items.extend(candidates);
            }
        }
        if items.is_empty() {
            return Err(QuizError::NoItems);
        }

        items.shuffle(rng);
        if options.item_limit > 0 {
            items.truncate(options.item_limit);
        }

        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            options,
            items,
            cursor: 0,
            correct: 0,
            pending: None,
            next_ticket: 0,
            outcomes: Vec::new(),
        };
        tracing::info!(
            id = %session.id,
            selection = %options.selection,
            exam = options.exam_mode,
            items = session.items.len(),
            "session started"
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn items(&self) -> &[QuizItem] {
        &self.items
    }

    pub fn current_item(&self) -> Option<&QuizItem> {
        self.items.get(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.items.len()
    }

    /// Running count of correct items.
    pub fn correct(&self) -> usize {
        self.correct
    }

    /// Fields to prompt for on the current item, or `None` when the session
    /// is finished or the item has no ground truth.
    pub fn fields(&self, data: &ReferenceData) -> Option<Vec<Field>> {
        let item = self.current_item()?;
        data.fields_for(item).map(|t| t.fields())
    }

    /// Grade the current item and record the outcome.
    ///
    /// A primary (`name`) answer of `1` or `2` self-marks the item and skips
    /// per-field grading. The cursor does not move until the returned ticket
    /// is redeemed with [`QuizSession::advance`]; a later submission for the
    /// same item supersedes the earlier ticket.
    pub fn submit(
        &mut self,
        answers: &Answers,
        data: &ReferenceData,
        tracker: &ProficiencyTracker,
    ) -> Result<Submission, QuizError> {
        let item = self
            .current_item()
            .cloned()
            .ok_or(QuizError::SessionFinished)?;
        let truth = data
            .fields_for(&item)
            .ok_or_else(|| QuizError::NoGroundTruth {
                category: item.category,
                tag: item.tag.clone(),
            })?;

        let (correct, grading, result) = match Shortcut::detect(answers.get(Field::Name)) {
            Some(shortcut) => {
                let correct = shortcut.is_correct();
                let result = if correct {
                    ItemResult::SelfMarkedCorrect
                } else {
                    ItemResult::SelfMarkedWrong
                };
                (correct, Grading::SelfMarked { shortcut }, result)
            }
            None => {
                let verdict = grade(&truth, answers);
                let correct = verdict.correct;
                let result = if correct {
                    ItemResult::Correct
                } else {
                    ItemResult::Wrong
                };
                (correct, Grading::Graded { verdict }, result)
            }
        };

        let proficiency = match tracker.record(item.category, &item.tag, correct) {
            Ok(rec) => rec,
            Err(e) => {
                tracing::warn!("failed to persist proficiency for {item}: {e:#}");
                tracker.get(item.category, &item.tag)
            }
        };

        let ticket = AdvanceTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending = Some(Pending { ticket, result });

        Ok(Submission {
            item,
            truth,
            correct,
            grading,
            proficiency,
            ticket,
        })
    }

    /// Move past the current item if `ticket` belongs to its latest submission.
    ///
    /// Returns `false` for stale or already-redeemed tickets.
    pub fn advance(&mut self, ticket: AdvanceTicket) -> bool {
        match &self.pending {
            Some(p) if p.ticket == ticket => {
                let result = p.result;
                self.pending = None;
                self.finish_item(result);
                true
            }
            _ => false,
        }
    }

    /// Move past the current item without scoring it.
    ///
    /// Used after [`QuizError::NoGroundTruth`]. Returns `false` when the
    /// session is already finished.
    pub fn skip(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.pending = None;
        self.finish_item(ItemResult::Skipped);
        true
    }

    fn finish_item(&mut self, result: ItemResult) {
        if let Some(item) = self.items.get(self.cursor).cloned() {
            if result.is_correct() {
                self.correct += 1;
            }
            self.outcomes.push(ItemOutcome { item, result });
        }
        self.cursor += 1;
    }

    pub fn progress(&self) -> SessionProgress {
        let total = self.items.len();
        SessionProgress {
            position: (self.cursor + 1).min(total.max(1)),
            total,
            answered: self.outcomes.len(),
            correct: self.correct,
            is_complete: self.is_finished(),
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            started_at: self.started_at,
            finished_at: self.is_finished().then(Utc::now),
            selection: self.options.selection,
            exam_mode: self.options.exam_mode,
            total: self.items.len(),
            correct: self.correct,
            outcomes: self.outcomes.clone(),
        }
    }
}

/// Record of a session, suitable for saving next to other session logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub selection: CategorySelection,
    pub exam_mode: bool,
    pub total: usize,
    pub correct: usize,
    pub outcomes: Vec<ItemOutcome>,
}

impl SessionSummary {
    pub fn answered(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.result != ItemResult::Skipped)
            .count()
    }

    /// Fraction of answered items that were correct.
    pub fn accuracy(&self) -> f64 {
        let answered = self.answered();
        if answered == 0 {
            0.0
        } else {
            self.correct as f64 / answered as f64
        }
    }

    /// Save the summary as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize session")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write session to {}", path.display()))?;
        Ok(())
    }

    /// Load a summary from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse session JSON")
    }
}
