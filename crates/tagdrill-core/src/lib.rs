//! tagdrill-core: grading engine, record merging and proficiency tracking.
//!
//! This crate holds everything that decides what counts as a correct answer,
//! how raw table rows collapse into one record per tag, and how mastery of
//! each item evolves across quiz sessions. Apart from the proficiency store
//! and the table source trait it performs no I/O.

pub mod canonical;
pub mod engine;
pub mod error;
pub mod grading;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod proficiency;
pub mod session;
pub mod source;
pub mod statistics;
pub mod table;

pub use canonical::canonicalize;
pub use engine::{QuizEngine, QuizEngineConfig};
pub use error::QuizError;
pub use grading::{grade, is_correct, MatchPolicy, Verdict};
pub use model::{Answers, Category, CategorySelection, Field, QuizItem, ReferenceData, Truth};
pub use normalize::normalize;
pub use proficiency::{FileStore, KeyValueStore, MemoryStore, ProficiencyRecord, ProficiencyTracker};
pub use session::{QuizSession, SessionOptions, SessionSummary, Submission};
pub use source::{load_reference_data, LoadedData, TableSource};
pub use table::TableKind;
