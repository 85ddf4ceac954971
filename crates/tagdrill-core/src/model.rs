//! Core data model types for tagdrill.
//!
//! Categories, their per-category field schemas, the merged reference records
//! and the quiz items drawn from them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::grading::MatchPolicy;

/// The four kinds of reference table a learner can be quizzed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "设备")]
    Equipment,
    #[serde(rename = "阀门")]
    Valve,
    #[serde(rename = "性能参数")]
    PerformanceSpec,
    #[serde(rename = "工艺指标")]
    ProcessStandard,
}

impl Category {
    /// All categories in the order a mixed session concatenates them.
    pub const ALL: [Category; 4] = [
        Category::Equipment,
        Category::Valve,
        Category::PerformanceSpec,
        Category::ProcessStandard,
    ];

    /// Display label, also used as the category part of proficiency keys.
    pub fn label(self) -> &'static str {
        match self {
            Category::Equipment => "设备",
            Category::Valve => "阀门",
            Category::PerformanceSpec => "性能参数",
            Category::ProcessStandard => "工艺指标",
        }
    }

    /// Every field a record of this category may carry, in prompt order.
    pub fn schema(self) -> &'static [Field] {
        match self {
            Category::Equipment => &[Field::Name],
            Category::Valve => &[Field::Name, Field::Floor],
            Category::PerformanceSpec => &[
                Field::Name,
                Field::Medium,
                Field::PowerKw,
                Field::HeadM,
                Field::FlowM3h,
                Field::SpeedRpm,
                Field::PressureBar,
                Field::DiameterM,
                Field::LengthM,
                Field::VolumeM3,
                Field::RatedCurrentA,
            ],
            Category::ProcessStandard => &[
                Field::Name,
                Field::Tag,
                Field::ControlTag,
                Field::Unit,
                Field::Standard,
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "设备" | "equipment" | "equip" => Ok(Category::Equipment),
            "阀门" | "valve" | "valves" => Ok(Category::Valve),
            "性能参数" | "performance" | "perf" | "spec" | "specs" => {
                Ok(Category::PerformanceSpec)
            }
            "工艺指标" | "standard" | "standards" | "std" => Ok(Category::ProcessStandard),
            other => Err(QuizError::UnknownCategory(other.to_string())),
        }
    }
}

/// Which categories a session draws its items from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySelection {
    Single(Category),
    Mixed,
}

impl CategorySelection {
    pub fn categories(self) -> Vec<Category> {
        match self {
            CategorySelection::Single(c) => vec![c],
            CategorySelection::Mixed => Category::ALL.to_vec(),
        }
    }
}

impl fmt::Display for CategorySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelection::Single(c) => write!(f, "{c}"),
            CategorySelection::Mixed => f.write_str("混合"),
        }
    }
}

impl FromStr for CategorySelection {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "混合" | "mixed" | "all" => Ok(CategorySelection::Mixed),
            other => other.parse().map(CategorySelection::Single),
        }
    }
}

impl From<Category> for CategorySelection {
    fn from(category: Category) -> Self {
        CategorySelection::Single(category)
    }
}

/// A single answerable attribute of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Floor,
    Medium,
    PowerKw,
    HeadM,
    FlowM3h,
    SpeedRpm,
    PressureBar,
    DiameterM,
    LengthM,
    VolumeM3,
    RatedCurrentA,
    Tag,
    ControlTag,
    Unit,
    Standard,
}

impl Field {
    /// The optional measurement columns of the performance table.
    pub const PERFORMANCE_SPECS: [Field; 10] = [
        Field::Medium,
        Field::PowerKw,
        Field::HeadM,
        Field::FlowM3h,
        Field::SpeedRpm,
        Field::PressureBar,
        Field::DiameterM,
        Field::LengthM,
        Field::VolumeM3,
        Field::RatedCurrentA,
    ];

    /// Column name in the source tables.
    pub fn column(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Floor => "floor",
            Field::Medium => "medium",
            Field::PowerKw => "power_kw",
            Field::HeadM => "head_m",
            Field::FlowM3h => "flow_m3h",
            Field::SpeedRpm => "speed_rpm",
            Field::PressureBar => "pressure_bar",
            Field::DiameterM => "diameter_m",
            Field::LengthM => "length_m",
            Field::VolumeM3 => "volume_m3",
            Field::RatedCurrentA => "rated_current_a",
            Field::Tag => "tag",
            Field::ControlTag => "control_tag",
            Field::Unit => "unit",
            Field::Standard => "standard",
        }
    }

    /// Prompt label for this field when quizzing `category`.
    pub fn label(self, category: Category) -> &'static str {
        match (self, category) {
            (Field::Name, Category::ProcessStandard) => "设备名称及控制项目",
            (Field::Name, _) => "名称",
            (Field::Floor, _) => "楼层",
            (Field::Medium, _) => "介质",
            (Field::PowerKw, _) => "功率(kW)",
            (Field::HeadM, _) => "扬程(m)",
            (Field::FlowM3h, _) => "流量(m3/h)",
            (Field::SpeedRpm, _) => "转速(rpm)",
            (Field::PressureBar, _) => "压力(bar)",
            (Field::DiameterM, _) => "直径(m)",
            (Field::LengthM, _) => "长度(m)",
            (Field::VolumeM3, _) => "容积(m3)",
            (Field::RatedCurrentA, _) => "额定电流(A)",
            (Field::Tag, _) => "设备位号",
            (Field::ControlTag, _) => "项目控制位号",
            (Field::Unit, _) => "单位",
            (Field::Standard, _) => "控制指标",
        }
    }

    /// Names and floors demand complete recall; measurements accept partial answers.
    pub fn policy(self) -> MatchPolicy {
        match self {
            Field::Name | Field::Floor => MatchPolicy::Strict,
            _ => MatchPolicy::Loose,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .flat_map(|c| c.schema().iter().copied())
            .find(|f| f.column() == s.trim())
            .ok_or_else(|| format!("unknown field: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub tag: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValveRecord {
    pub tag: String,
    pub name: String,
    /// `None` means the table gave no floor, as opposed to an empty one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
}

/// A performance-spec record, possibly merged from several rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceRecord {
    pub tag: String,
    pub name: String,
    /// Present measurement columns only; keys are drawn from [`Field::PERFORMANCE_SPECS`].
    #[serde(default)]
    pub specs: BTreeMap<Field, String>,
}

impl PerformanceRecord {
    pub fn spec(&self, field: Field) -> Option<&str> {
        self.specs.get(&field).map(String::as_str)
    }
}

/// A process-control standard, keyed by its control tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardRecord {
    pub control_tag: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard: Option<String>,
}

/// A `(category, tag)` pair the learner is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuizItem {
    pub category: Category,
    pub tag: String,
}

impl QuizItem {
    pub fn new(category: Category, tag: impl Into<String>) -> Self {
        Self {
            category,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for QuizItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.category, self.tag)
    }
}

/// The ground truth revealed and graded for one quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Truth {
    pub item: QuizItem,
    /// Present fields in schema order; `name` is always first.
    pub entries: Vec<(Field, String)>,
}

impl Truth {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> Vec<Field> {
        self.entries.iter().map(|(f, _)| *f).collect()
    }
}

/// Free-text answers typed by the learner, one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers(HashMap<Field, String>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    /// The answer for `field`, or the empty string when it was left blank.
    pub fn get(&self, field: Field) -> &str {
        self.0.get(&field).map(String::as_str).unwrap_or("")
    }
}

/// All merged reference records, one map per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub equipment: BTreeMap<String, EquipmentRecord>,
    pub valves: BTreeMap<String, ValveRecord>,
    pub performance: BTreeMap<String, PerformanceRecord>,
    pub standards: BTreeMap<String, StandardRecord>,
}

impl ReferenceData {
    /// Quiz items for one category, in key order.
    pub fn items(&self, category: Category) -> Vec<QuizItem> {
        let keys: Vec<&String> = match category {
            Category::Equipment => self.equipment.keys().collect(),
            Category::Valve => self.valves.keys().collect(),
            Category::PerformanceSpec => self.performance.keys().collect(),
            Category::ProcessStandard => self.standards.keys().collect(),
        };
        keys.into_iter()
            .map(|k| QuizItem::new(category, k.clone()))
            .collect()
    }

    pub fn len(&self, category: Category) -> usize {
        match category {
            Category::Equipment => self.equipment.len(),
            Category::Valve => self.valves.len(),
            Category::PerformanceSpec => self.performance.len(),
            Category::ProcessStandard => self.standards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|c| self.len(*c) == 0)
    }

    /// The record name for a key, if the key is known.
    pub fn name_of(&self, category: Category, tag: &str) -> Option<&str> {
        match category {
            Category::Equipment => self.equipment.get(tag).map(|r| r.name.as_str()),
            Category::Valve => self.valves.get(tag).map(|r| r.name.as_str()),
            Category::PerformanceSpec => self.performance.get(tag).map(|r| r.name.as_str()),
            Category::ProcessStandard => self.standards.get(tag).map(|r| r.name.as_str()),
        }
    }

    /// Build the ground truth for `item`: the record's name plus every
    /// optional field of its category schema that holds a value.
    ///
    /// Returns `None` when the item's key is not in the loaded tables.
    pub fn fields_for(&self, item: &QuizItem) -> Option<Truth> {
        let mut entries = Vec::new();
        match item.category {
            Category::Equipment => {
                let r = self.equipment.get(&item.tag)?;
                entries.push((Field::Name, r.name.clone()));
            }
            Category::Valve => {
                let r = self.valves.get(&item.tag)?;
                entries.push((Field::Name, r.name.clone()));
                if let Some(floor) = &r.floor {
                    entries.push((Field::Floor, floor.clone()));
                }
            }
            Category::PerformanceSpec => {
                let r = self.performance.get(&item.tag)?;
                entries.push((Field::Name, r.name.clone()));
                for field in Field::PERFORMANCE_SPECS {
                    if let Some(v) = r.spec(field) {
                        entries.push((field, v.to_string()));
                    }
                }
            }
            Category::ProcessStandard => {
                let r = self.standards.get(&item.tag)?;
                entries.push((Field::Name, r.name.clone()));
                let optional = [
                    (Field::Tag, r.tag.as_deref()),
                    (Field::ControlTag, Some(r.control_tag.as_str())),
                    (Field::Unit, r.unit.as_deref()),
                    (Field::Standard, r.standard.as_deref()),
                ];
                for (field, value) in optional {
                    if let Some(v) = value.filter(|v| !v.is_empty()) {
                        entries.push((field, v.to_string()));
                    }
                }
            }
        }
        Some(Truth {
            item: item.clone(),
            entries,
        })
    }
}
