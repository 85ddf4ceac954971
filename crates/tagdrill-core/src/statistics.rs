//! Proficiency statistics and the wrong-answer book.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Category, ReferenceData};
use crate::proficiency::{ProficiencyEntry, MAX_LEVEL};

/// Rounded percentage of correct answers, `0` when there were none.
pub fn accuracy_percent(correct: u64, wrong: u64) -> u32 {
    let total = correct + wrong;
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// Display band of a mastery level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelBand {
    New,
    Weak,
    Learning,
    Familiar,
    Mastered,
}

impl LevelBand {
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => LevelBand::New,
            1 => LevelBand::Weak,
            2 => LevelBand::Learning,
            3 => LevelBand::Familiar,
            _ => LevelBand::Mastered,
        }
    }

    /// CSS colour used for the band.
    pub fn colour(self) -> &'static str {
        match self {
            LevelBand::New => "#3b82f6",
            LevelBand::Weak => "#ef4444",
            LevelBand::Learning => "#f97316",
            LevelBand::Familiar => "#eab308",
            LevelBand::Mastered => "#22c55e",
        }
    }
}

/// Accuracy over all entries of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryAccuracy {
    pub category: Category,
    pub entries: usize,
    pub correct: u64,
    pub wrong: u64,
    pub accuracy_percent: u32,
}

/// Aggregate view of the proficiency store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProficiencySummary {
    pub entries: usize,
    pub total_correct: u64,
    pub total_wrong: u64,
    pub average_level: f64,
    /// Number of entries at each level `0..=5`.
    pub level_distribution: [usize; MAX_LEVEL as usize + 1],
    /// Only categories that have entries, in category order.
    pub categories: Vec<CategoryAccuracy>,
    /// Entries by level desc, correct desc, key asc.
    pub ranked: Vec<ProficiencyEntry>,
}

impl ProficiencySummary {
    pub fn from_entries(entries: &[ProficiencyEntry]) -> Self {
        let mut total_correct = 0u64;
        let mut total_wrong = 0u64;
        let mut level_sum = 0u64;
        let mut level_distribution = [0usize; MAX_LEVEL as usize + 1];
        let mut per_category: BTreeMap<Category, (usize, u64, u64)> = BTreeMap::new();

        for entry in entries {
            let r = &entry.record;
            total_correct += u64::from(r.correct);
            total_wrong += u64::from(r.wrong);
            let level = r.level.min(MAX_LEVEL);
            level_sum += u64::from(level);
            level_distribution[level as usize] += 1;
            if let Some(category) = entry.category {
                let acc = per_category.entry(category).or_default();
                acc.0 += 1;
                acc.1 += u64::from(r.correct);
                acc.2 += u64::from(r.wrong);
            }
        }

        let categories = per_category
            .into_iter()
            .map(|(category, (n, correct, wrong))| CategoryAccuracy {
                category,
                entries: n,
                correct,
                wrong,
                accuracy_percent: accuracy_percent(correct, wrong),
            })
            .collect();

        let mut ranked = entries.to_vec();
        ranked.sort_by(|a, b| {
            b.record
                .level
                .cmp(&a.record.level)
                .then(b.record.correct.cmp(&a.record.correct))
                .then_with(|| a.key.cmp(&b.key))
        });

        let average_level = if entries.is_empty() {
            0.0
        } else {
            level_sum as f64 / entries.len() as f64
        };

        Self {
            entries: entries.len(),
            total_correct,
            total_wrong,
            average_level,
            level_distribution,
            categories,
            ranked,
        }
    }

    pub fn accuracy_percent(&self) -> u32 {
        accuracy_percent(self.total_correct, self.total_wrong)
    }
}

/// How urgently an item needs review, by its wrong count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// `None` for items never answered wrong.
    pub fn from_wrong(wrong: u32) -> Option<Self> {
        match wrong {
            0 => None,
            1..=2 => Some(Severity::Low),
            3..=4 => Some(Severity::Medium),
            5..=7 => Some(Severity::High),
            _ => Some(Severity::Critical),
        }
    }

    pub fn colour(self) -> &'static str {
        match self {
            Severity::Low => "#22c55e",
            Severity::Medium => "#eab308",
            Severity::High => "#f97316",
            Severity::Critical => "#ef4444",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// One entry of the wrong-answer book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongbookEntry {
    pub category: Option<Category>,
    pub tag: String,
    /// Record name, when the key is still in the loaded tables.
    pub name: Option<String>,
    pub correct: u32,
    pub wrong: u32,
    pub level: u8,
    pub severity: Severity,
}

/// Every item answered wrong at least once, most urgent first.
pub fn wrongbook(entries: &[ProficiencyEntry], data: &ReferenceData) -> Vec<WrongbookEntry> {
    let mut book: Vec<WrongbookEntry> = entries
        .iter()
        .filter_map(|e| {
            let severity = Severity::from_wrong(e.record.wrong)?;
            let name = e
                .category
                .and_then(|c| data.name_of(c, &e.tag))
                .map(str::to_string);
            Some(WrongbookEntry {
                category: e.category,
                tag: e.tag.clone(),
                name,
                correct: e.record.correct,
                wrong: e.record.wrong,
                level: e.record.level,
                severity,
            })
        })
        .collect();

    book.sort_by_key(|e| {
        (
            Reverse(e.severity),
            Reverse(e.wrong),
            e.category,
            e.tag.clone(),
        )
    });
    book
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EquipmentRecord;
    use crate::proficiency::{proficiency_key, ProficiencyRecord};

    fn entry(category: Category, tag: &str, correct: u32, wrong: u32, level: u8) -> ProficiencyEntry {
        ProficiencyEntry {
            key: proficiency_key(category, tag),
            category: Some(category),
            tag: tag.to_string(),
            record: ProficiencyRecord {
                correct,
                wrong,
                level,
            },
        }
    }

    #[test]
    fn accuracy_rounds_and_handles_zero() {
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_percent(2, 1), 67);
        assert_eq!(accuracy_percent(1, 0), 100);
    }

    #[test]
    fn summary_aggregates() {
        let entries = vec![
            entry(Category::Equipment, "P101", 5, 0, 5),
            entry(Category::Equipment, "P102", 1, 3, 0),
            entry(Category::Valve, "XV1", 2, 2, 2),
        ];
        let summary = ProficiencySummary::from_entries(&entries);
        assert_eq!(summary.entries, 3);
        assert_eq!(summary.total_correct, 8);
        assert_eq!(summary.total_wrong, 5);
        assert!((summary.average_level - 7.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.level_distribution, [1, 0, 1, 0, 0, 1]);
        assert_eq!(summary.accuracy_percent(), 62);

        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].category, Category::Equipment);
        assert_eq!(summary.categories[0].accuracy_percent, 67);
        assert_eq!(summary.categories[1].accuracy_percent, 50);

        let order: Vec<&str> = summary.ranked.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(order, vec!["P101", "XV1", "P102"]);
    }

    #[test]
    fn empty_summary() {
        let summary = ProficiencySummary::from_entries(&[]);
        assert_eq!(summary.entries, 0);
        assert_eq!(summary.average_level, 0.0);
        assert!(summary.categories.is_empty());
    }

    #[test]
    fn level_bands() {
        assert_eq!(LevelBand::from_level(0), LevelBand::New);
        assert_eq!(LevelBand::from_level(3), LevelBand::Familiar);
        assert_eq!(LevelBand::from_level(4), LevelBand::Mastered);
        assert_eq!(LevelBand::from_level(5), LevelBand::Mastered);
    }

    #[test]
    fn severity_thresholds() {
        assert_eq!(Severity::from_wrong(0), None);
        assert_eq!(Severity::from_wrong(1), Some(Severity::Low));
        assert_eq!(Severity::from_wrong(3), Some(Severity::Medium));
        assert_eq!(Severity::from_wrong(5), Some(Severity::High));
        assert_eq!(Severity::from_wrong(8), Some(Severity::Critical));
    }

    #[test]
    fn wrongbook_filters_sorts_and_names() {
        let mut data = ReferenceData::default();
        data.equipment.insert(
            "P102".into(),
            EquipmentRecord {
                tag: "P102".into(),
                name: "给水泵".into(),
            },
        );
        let entries = vec![
            entry(Category::Equipment, "P101", 5, 0, 5),
            entry(Category::Valve, "XV2", 0, 1, 0),
            entry(Category::Equipment, "P102", 1, 6, 0),
            entry(Category::Equipment, "P103", 0, 1, 0),
        ];
        let book = wrongbook(&entries, &data);
        let tags: Vec<&str> = book.iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["P102", "P103", "XV2"]);
        assert_eq!(book[0].severity, Severity::High);
        assert_eq!(book[0].name.as_deref(), Some("给水泵"));
        assert_eq!(book[1].name, None);
    }
}
