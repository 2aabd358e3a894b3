//! Persisted record types.
//!
//! Every record is flat and carries an opaque generated `id`. Cross-record links
//! (pedigree, health → animal, finance → allocation) are copied business-key
//! strings, never owned references; see `index::TagIndex` for lookups.
//!
//! All structs are `#[serde(default)]` so a record missing numeric or string
//! fields still loads with zero/empty values instead of failing the whole
//! collection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Animals
// =============================================================================

/// Developmental phase. Independent of `AnimalStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifeStage {
    Newborn,
    Weaned,
    #[default]
    Growing,
    Finishing,
    BreedingFemale,
    BreedingMale,
}

impl LifeStage {
    pub const ALL: [LifeStage; 6] = [
        LifeStage::Newborn,
        LifeStage::Weaned,
        LifeStage::Growing,
        LifeStage::Finishing,
        LifeStage::BreedingFemale,
        LifeStage::BreedingMale,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newborn => "newborn",
            Self::Weaned => "weaned",
            Self::Growing => "growing",
            Self::Finishing => "finishing",
            Self::BreedingFemale => "breeding-female",
            Self::BreedingMale => "breeding-male",
        }
    }
}

/// Operational condition. Independent of `LifeStage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimalStatus {
    #[default]
    Active,
    Sick,
    Quarantined,
    Sold,
    Deceased,
}

impl AnimalStatus {
    pub const ALL: [AnimalStatus; 5] = [
        AnimalStatus::Active,
        AnimalStatus::Sick,
        AnimalStatus::Quarantined,
        AnimalStatus::Sold,
        AnimalStatus::Deceased,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Sick => "sick",
            Self::Quarantined => "quarantined",
            Self::Sold => "sold",
            Self::Deceased => "deceased",
        }
    }

    /// Still on the farm (not sold, not dead).
    pub fn is_on_farm(&self) -> bool {
        !matches!(self, Self::Sold | Self::Deceased)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    #[default]
    Female,
}

/// Color tag on a timeline event; drives calendar presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    #[default]
    Blue,
    Green,
    Amber,
    Red,
    Purple,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Completed,
    Pending,
}

/// One entry in an animal's ordered timeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEvent {
    pub id: String,
    pub date: NaiveDate,
    pub title: String,
    pub subtitle: String,
    pub color: EventColor,
    pub status: EventStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Animal {
    pub id: String,
    /// Ear tag. Business key; uniqueness is not enforced.
    pub tag: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub stage: LifeStage,
    pub status: AnimalStatus,
    pub pen_location: String,
    /// Live weight in kg.
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sire_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dam_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-form timestamp of the last feeding, as entered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_fed: Option<String>,
    pub timeline: Vec<TimelineEvent>,
}

impl Animal {
    /// Finishing stage and active status: the animals headed for market.
    pub fn is_market_candidate(&self) -> bool {
        self.stage == LifeStage::Finishing && self.status == AnimalStatus::Active
    }
}

// =============================================================================
// Tasks
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

// =============================================================================
// Feed
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedInventory {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub feed_type: String,
    /// Stock on hand in kg.
    pub quantity: f64,
    /// Reorder once `quantity` is at or below this level.
    pub reorder_level: f64,
    pub last_restocked: NaiveDate,
}

impl FeedInventory {
    pub fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthRecordType {
    Vaccination,
    Treatment,
    #[default]
    Checkup,
}

impl HealthRecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vaccination => "vaccination",
            Self::Treatment => "treatment",
            Self::Checkup => "checkup",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthRecord {
    pub id: String,
    /// Weak reference to `Animal::tag`; may resolve to nothing.
    pub animal_tag: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub record_type: HealthRecordType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    pub administered_by: String,
}

// =============================================================================
// Finance
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceType {
    Income,
    #[default]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FinanceStatus {
    Paid,
    Scheduled,
    Projected,
}

/// Cost center a finance record is booked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Enterprise {
    #[default]
    General,
    Livestock,
    Poultry,
    Crops,
    Machinery,
}

impl Enterprise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Livestock => "livestock",
            Self::Poultry => "poultry",
            Self::Crops => "crops",
            Self::Machinery => "machinery",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinanceRecord {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub record_type: FinanceType,
    pub category: String,
    /// Magnitude of the movement; direction comes from `record_type`.
    pub amount: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<FinanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enterprise: Option<Enterprise>,
    /// Weak reference into a field or asset list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation_id: Option<String>,
    /// Free-text grouping key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
}

impl FinanceRecord {
    pub fn is_scheduled(&self) -> bool {
        self.status == Some(FinanceStatus::Scheduled)
    }

    /// Paid, or entered without a status (treated as already settled).
    pub fn is_settled(&self) -> bool {
        matches!(self.status, None | Some(FinanceStatus::Paid))
    }

    /// Amount as a positive number regardless of how it was entered.
    pub fn magnitude(&self) -> f64 {
        self.amount.abs()
    }

    /// Signed cash effect: income positive, expense negative.
    pub fn signed_amount(&self) -> f64 {
        match self.record_type {
            FinanceType::Income => self.magnitude(),
            FinanceType::Expense => -self.magnitude(),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Closed set of session roles. See `access` for the view table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Veterinarian,
    Worker,
    Accountant,
    /// Any stored role string outside the known set. Permits nothing, and is
    /// written back as `"unassigned"`.
    #[default]
    #[serde(other)]
    Unassigned,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Veterinarian => "veterinarian",
            Self::Worker => "worker",
            Self::Accountant => "accountant",
            Self::Unassigned => "unassigned",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Plaintext, carried over as-is. Not a credential scheme.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_serializes_kebab_case() {
        let json = serde_json::to_string(&LifeStage::BreedingFemale).unwrap();
        assert_eq!(json, "\"breeding-female\"");
    }

    #[test]
    fn test_missing_fields_default() {
        let animal: Animal = serde_json::from_str(r#"{"id":"a1","tag":"P-001"}"#).unwrap();
        assert_eq!(animal.weight, 0.0);
        assert_eq!(animal.breed, "");
        assert_eq!(animal.status, AnimalStatus::Active);
        assert!(animal.timeline.is_empty());
    }

    #[test]
    fn test_unknown_role_is_unassigned() {
        let user: User =
            serde_json::from_str(r#"{"id":"u1","name":"X","email":"x@y","role":"owner"}"#)
                .unwrap();
        assert_eq!(user.role, Role::Unassigned);
    }

    #[test]
    fn test_unknown_role_is_normalized_on_save() {
        let user: User = serde_json::from_str(r#"{"id":"u1","role":"owner"}"#).unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "unassigned");
    }

    #[test]
    fn test_finance_type_field_is_named_type() {
        let record = FinanceRecord {
            id: "f1".to_string(),
            record_type: FinanceType::Income,
            amount: 10.0,
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "income");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_settled_and_signed_amount() {
        let mut record = FinanceRecord {
            record_type: FinanceType::Expense,
            amount: -150.0,
            ..Default::default()
        };
        assert!(record.is_settled());
        assert_eq!(record.signed_amount(), -150.0);
        record.status = Some(FinanceStatus::Scheduled);
        assert!(!record.is_settled());
        assert!(record.is_scheduled());
    }

    #[test]
    fn test_stage_and_status_are_independent() {
        let animal = Animal {
            stage: LifeStage::Finishing,
            status: AnimalStatus::Sick,
            ..Default::default()
        };
        assert!(!animal.is_market_candidate());
        assert!(animal.status.is_on_farm());
    }
}
