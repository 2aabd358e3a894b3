//! Session state and its mutation API.
//!
//! `FarmState` owns the six collections and the store. Every mutation updates
//! the in-memory collection first and then mirrors that whole collection to
//! the store; persistence failures are logged by the store and never surface
//! here. Analytics read the collections through the slice accessors and never
//! mutate them.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::config::FarmConfig;
use crate::error::FarmError;
use crate::index::TagIndex;
use crate::seed;
use crate::store::{
    PersistentStore, SqliteBackend, ANIMALS_KEY, FEED_KEY, FINANCE_KEY, HEALTH_KEY, TASKS_KEY,
    USERS_KEY,
};
use crate::types::{
    Animal, AnimalStatus, EventColor, EventStatus, FeedInventory, FinanceRecord, FinanceStatus,
    FinanceType, HealthRecord, HealthRecordType, LifeStage, Role, Sex, Task, TaskPriority,
    TaskStatus, TimelineEvent, User,
};

/// State shared with in-flight external calls.
pub type SharedState = Arc<Mutex<FarmState>>;

// =============================================================================
// Create requests
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct NewAnimal {
    pub tag: String,
    pub breed: String,
    pub date_of_birth: NaiveDate,
    pub sex: Sex,
    pub stage: LifeStage,
    pub status: AnimalStatus,
    pub pen_location: String,
    pub weight: f64,
    pub sire_tag: Option<String>,
    pub dam_tag: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewTimelineEvent {
    pub date: NaiveDate,
    pub title: String,
    pub subtitle: String,
    pub color: EventColor,
    pub status: EventStatus,
}

#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub category: String,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewFeed {
    pub name: String,
    pub feed_type: String,
    pub quantity: f64,
    pub reorder_level: f64,
    pub last_restocked: NaiveDate,
}

#[derive(Debug, Clone, Default)]
pub struct NewHealthRecord {
    pub animal_tag: String,
    pub date: NaiveDate,
    pub record_type: HealthRecordType,
    pub description: String,
    pub medication: Option<String>,
    pub administered_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct NewFinanceRecord {
    pub date: NaiveDate,
    pub record_type: FinanceType,
    pub category: String,
    pub amount: f64,
    pub description: String,
    pub status: Option<FinanceStatus>,
    pub enterprise: Option<crate::types::Enterprise>,
    pub allocation_id: Option<String>,
    pub batch_id: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Blank or whitespace-only optional strings are stored as absent.
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// NaN and infinities become zero. serde_json writes them as `null`, which
/// would make the whole collection unreadable on the next load.
fn finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::warn!("Non-finite numeric input {} stored as 0", value);
        0.0
    }
}

fn health_color(record_type: HealthRecordType) -> EventColor {
    match record_type {
        HealthRecordType::Vaccination => EventColor::Green,
        HealthRecordType::Treatment => EventColor::Red,
        HealthRecordType::Checkup => EventColor::Blue,
    }
}

// =============================================================================
// FarmState
// =============================================================================

pub struct FarmState {
    store: PersistentStore,
    animals: Vec<Animal>,
    users: Vec<User>,
    tasks: Vec<Task>,
    feed: Vec<FeedInventory>,
    health: Vec<HealthRecord>,
    finance: Vec<FinanceRecord>,
}

impl FarmState {
    /// Load every collection from `store`, reseeding any that are missing.
    pub fn open(store: PersistentStore, today: NaiveDate) -> Self {
        let mut state = Self {
            store,
            animals: Vec::new(),
            users: Vec::new(),
            tasks: Vec::new(),
            feed: Vec::new(),
            health: Vec::new(),
            finance: Vec::new(),
        };
        state.load_all(today);
        state
    }

    /// Open the SQLite-backed store named by `config` (or the default path).
    /// If the database cannot be opened the session runs in memory.
    pub fn open_with_config(config: &FarmConfig, today: NaiveDate) -> Self {
        let backend = match config.store_path() {
            Some(path) => SqliteBackend::open_at(&path),
            None => SqliteBackend::open(),
        };
        let store = match backend {
            Ok(backend) => PersistentStore::new(backend),
            Err(e) => {
                log::error!("Failed to open farm database: {}. Changes will not persist.", e);
                PersistentStore::in_memory()
            }
        };
        Self::open(store, today)
    }

    fn load_all(&mut self, today: NaiveDate) {
        self.animals = self.load_or_seed(ANIMALS_KEY, || seed::sample_animals(today));
        self.users = self.load_or_seed(USERS_KEY, seed::sample_users);
        self.tasks = self.load_or_seed(TASKS_KEY, || seed::sample_tasks(today));
        self.feed = self.load_or_seed(FEED_KEY, || seed::sample_feed(today));
        self.health = self.load_or_seed(HEALTH_KEY, || seed::sample_health(today));
        self.finance = self.load_or_seed(FINANCE_KEY, || seed::sample_finance(today));
        log::info!(
            "Loaded farm state: {} animals, {} tasks, {} feed items, {} health records, {} finance records, {} users",
            self.animals.len(),
            self.tasks.len(),
            self.feed.len(),
            self.health.len(),
            self.finance.len(),
            self.users.len()
        );
    }

    fn load_or_seed<T, F>(&mut self, key: &str, sample: F) -> Vec<T>
    where
        T: serde::Serialize + serde::de::DeserializeOwned,
        F: FnOnce() -> Vec<T>,
    {
        match self.store.contains(key) {
            Ok(true) => self.store.load(key, sample()),
            Ok(false) => {
                let seeded = sample();
                log::info!("Seeding '{}' with {} sample records", key, seeded.len());
                self.store.save(key, &seeded);
                seeded
            }
            Err(e) => {
                // Stored data may still be there; keep it untouched.
                log::warn!(
                    "Could not check '{}' in store: {}. Using sample data without saving.",
                    key,
                    e
                );
                sample()
            }
        }
    }

    /// Wrap for sharing with async collaborators.
    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    /// Wipe the store and reseed every collection.
    pub fn factory_reset(&mut self, today: NaiveDate) {
        log::warn!("Factory reset requested");
        self.store.clear();
        self.load_all(today);
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn feed(&self) -> &[FeedInventory] {
        &self.feed
    }

    pub fn health(&self) -> &[HealthRecord] {
        &self.health
    }

    pub fn finance(&self) -> &[FinanceRecord] {
        &self.finance
    }

    pub fn animal(&self, id: &str) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id == id)
    }

    /// Tag lookups over the current herd. Rebuild after animal mutations.
    pub fn tag_index(&self) -> TagIndex<'_> {
        TagIndex::build(&self.animals)
    }

    /// Feed items at or below their reorder level.
    pub fn low_stock_feed(&self) -> Vec<&FeedInventory> {
        self.feed.iter().filter(|f| f.needs_reorder()).collect()
    }

    // -------------------------------------------------------------------------
    // Persistence mirrors
    // -------------------------------------------------------------------------

    fn persist_animals(&mut self) {
        self.store.save(ANIMALS_KEY, &self.animals);
    }

    fn persist_users(&mut self) {
        self.store.save(USERS_KEY, &self.users);
    }

    fn persist_tasks(&mut self) {
        self.store.save(TASKS_KEY, &self.tasks);
    }

    fn persist_feed(&mut self) {
        self.store.save(FEED_KEY, &self.feed);
    }

    fn persist_health(&mut self) {
        self.store.save(HEALTH_KEY, &self.health);
    }

    fn persist_finance(&mut self) {
        self.store.save(FINANCE_KEY, &self.finance);
    }

    fn animal_mut(&mut self, id: &str) -> Result<&mut Animal, FarmError> {
        self.animals
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| FarmError::not_found("animal", id))
    }

    // -------------------------------------------------------------------------
    // Animals
    // -------------------------------------------------------------------------

    /// Register an animal. Its timeline starts with a "Created" event.
    ///
    /// Tags are not required to be unique; a collision is logged and the
    /// animal is added anyway. Tag lookups resolve to the earliest animal.
    pub fn add_animal(&mut self, request: NewAnimal) -> &Animal {
        let tag = request.tag.trim().to_string();
        if !tag.is_empty() && self.animals.iter().any(|a| a.tag.trim() == tag) {
            log::warn!("Animal tag '{}' is already in use; adding duplicate", tag);
        }

        let animal = Animal {
            id: new_id(),
            timeline: vec![TimelineEvent {
                id: new_id(),
                date: request.date_of_birth,
                title: "Created".to_string(),
                subtitle: format!("Registered in {}", request.pen_location),
                color: EventColor::Blue,
                status: EventStatus::Completed,
            }],
            tag,
            breed: request.breed,
            date_of_birth: request.date_of_birth,
            sex: request.sex,
            stage: request.stage,
            status: request.status,
            pen_location: request.pen_location,
            weight: finite(request.weight),
            sire_tag: non_empty(request.sire_tag),
            dam_tag: non_empty(request.dam_tag),
            notes: non_empty(request.notes),
            last_fed: None,
        };
        log::info!("Added animal {} ({})", animal.tag, animal.id);

        self.animals.push(animal);
        self.persist_animals();
        let last = self.animals.len() - 1;
        &self.animals[last]
    }

    /// Remove an animal. References to its tag elsewhere are left dangling.
    pub fn delete_animal(&mut self, id: &str) -> Result<Animal, FarmError> {
        let pos = self
            .animals
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| FarmError::not_found("animal", id))?;
        let removed = self.animals.remove(pos);
        self.persist_animals();
        log::info!("Deleted animal {} ({})", removed.tag, removed.id);
        Ok(removed)
    }

    /// Append an event to an animal's timeline.
    pub fn log_event(&mut self, animal_id: &str, event: NewTimelineEvent) -> Result<(), FarmError> {
        let animal = self.animal_mut(animal_id)?;
        animal.timeline.push(TimelineEvent {
            id: new_id(),
            date: event.date,
            title: event.title,
            subtitle: event.subtitle,
            color: event.color,
            status: event.status,
        });
        self.persist_animals();
        Ok(())
    }

    /// Record a feeding: stamps `last_fed`, adds a timeline entry, and draws
    /// the amount from `feed_id`'s stock when given. Stock never goes negative.
    pub fn log_feeding(
        &mut self,
        animal_id: &str,
        feed_id: Option<&str>,
        kg: f64,
        at: DateTime<Utc>,
    ) -> Result<(), FarmError> {
        let kg = finite(kg);
        let feed_index = match feed_id {
            Some(fid) => Some(
                self.feed
                    .iter()
                    .position(|f| f.id == fid)
                    .ok_or_else(|| FarmError::not_found("feed", fid))?,
            ),
            None => None,
        };
        let feed_name = feed_index
            .map(|i| self.feed[i].name.clone())
            .unwrap_or_else(|| "feed".to_string());

        let animal = self.animal_mut(animal_id)?;
        animal.last_fed = Some(at.to_rfc3339());
        animal.timeline.push(TimelineEvent {
            id: new_id(),
            date: at.date_naive(),
            title: "Fed".to_string(),
            subtitle: format!("{:.1} kg {}", kg, feed_name),
            color: EventColor::Green,
            status: EventStatus::Completed,
        });
        self.persist_animals();

        if let Some(i) = feed_index {
            let item = &mut self.feed[i];
            item.quantity = (item.quantity - kg.max(0.0)).max(0.0);
            if item.needs_reorder() {
                log::info!("{} is at or below reorder level ({:.1} kg)", item.name, item.quantity);
            }
            self.persist_feed();
        }
        Ok(())
    }

    pub fn update_notes(&mut self, animal_id: &str, notes: Option<String>) -> Result<(), FarmError> {
        self.animal_mut(animal_id)?.notes = non_empty(notes);
        self.persist_animals();
        Ok(())
    }

    /// Set sire and dam tags. Tags need not resolve to an existing animal.
    pub fn set_pedigree(
        &mut self,
        animal_id: &str,
        sire_tag: Option<String>,
        dam_tag: Option<String>,
    ) -> Result<(), FarmError> {
        let animal = self.animal_mut(animal_id)?;
        animal.sire_tag = non_empty(sire_tag);
        animal.dam_tag = non_empty(dam_tag);
        self.persist_animals();
        Ok(())
    }

    pub fn update_status(&mut self, animal_id: &str, status: AnimalStatus) -> Result<(), FarmError> {
        self.animal_mut(animal_id)?.status = status;
        self.persist_animals();
        Ok(())
    }

    pub fn update_stage(&mut self, animal_id: &str, stage: LifeStage) -> Result<(), FarmError> {
        self.animal_mut(animal_id)?.stage = stage;
        self.persist_animals();
        Ok(())
    }

    /// Record a weighing and note it on the timeline.
    pub fn record_weight(
        &mut self,
        animal_id: &str,
        weight: f64,
        on: NaiveDate,
    ) -> Result<(), FarmError> {
        let weight = finite(weight);
        let animal = self.animal_mut(animal_id)?;
        animal.weight = weight;
        animal.timeline.push(TimelineEvent {
            id: new_id(),
            date: on,
            title: "Weighed".to_string(),
            subtitle: format!("{:.1} kg", weight),
            color: EventColor::Purple,
            status: EventStatus::Completed,
        });
        self.persist_animals();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    pub fn add_task(&mut self, request: NewTask) -> &Task {
        self.tasks.push(Task {
            id: new_id(),
            title: request.title,
            due_date: request.due_date,
            priority: request.priority,
            status: TaskStatus::Pending,
            category: request.category,
            assignee_id: non_empty(request.assignee_id),
        });
        self.persist_tasks();
        let last = self.tasks.len() - 1;
        &self.tasks[last]
    }

    /// Flip a task between pending and completed. Returns the new status.
    pub fn toggle_task(&mut self, id: &str) -> Result<TaskStatus, FarmError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| FarmError::not_found("task", id))?;
        task.status = match task.status {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        };
        let status = task.status;
        self.persist_tasks();
        Ok(status)
    }

    // -------------------------------------------------------------------------
    // Feed
    // -------------------------------------------------------------------------

    pub fn add_feed(&mut self, request: NewFeed) -> &FeedInventory {
        self.feed.push(FeedInventory {
            id: new_id(),
            name: request.name,
            feed_type: request.feed_type,
            quantity: finite(request.quantity).max(0.0),
            reorder_level: finite(request.reorder_level),
            last_restocked: request.last_restocked,
        });
        self.persist_feed();
        let last = self.feed.len() - 1;
        &self.feed[last]
    }

    pub fn restock_feed(&mut self, id: &str, kg: f64, on: NaiveDate) -> Result<f64, FarmError> {
        let item = self
            .feed
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FarmError::not_found("feed", id))?;
        item.quantity += finite(kg).max(0.0);
        item.last_restocked = on;
        let quantity = item.quantity;
        self.persist_feed();
        Ok(quantity)
    }

    /// Draw stock without tying it to an animal. Floors at zero.
    pub fn consume_feed(&mut self, id: &str, kg: f64) -> Result<f64, FarmError> {
        let item = self
            .feed
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| FarmError::not_found("feed", id))?;
        item.quantity = (item.quantity - finite(kg).max(0.0)).max(0.0);
        let quantity = item.quantity;
        self.persist_feed();
        Ok(quantity)
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    /// Store a health record and, if its tag resolves, note it on that
    /// animal's timeline. An unresolved tag is kept as-is.
    pub fn add_health_record(&mut self, request: NewHealthRecord) -> &HealthRecord {
        let record = HealthRecord {
            id: new_id(),
            animal_tag: request.animal_tag.trim().to_string(),
            date: request.date,
            record_type: request.record_type,
            description: request.description,
            medication: non_empty(request.medication),
            administered_by: request.administered_by,
        };

        let tag = record.animal_tag.clone();
        match self.animals.iter_mut().find(|a| a.tag.trim() == tag) {
            Some(animal) => {
                let subtitle = match &record.medication {
                    Some(med) => format!("{} ({})", record.description, med),
                    None => record.description.clone(),
                };
                animal.timeline.push(TimelineEvent {
                    id: new_id(),
                    date: record.date,
                    title: capitalize(record.record_type.as_str()),
                    subtitle,
                    color: health_color(record.record_type),
                    status: EventStatus::Completed,
                });
                self.persist_animals();
            }
            None => log::warn!("Health record for unknown tag '{}'", tag),
        }

        self.health.push(record);
        self.persist_health();
        let last = self.health.len() - 1;
        &self.health[last]
    }

    // -------------------------------------------------------------------------
    // Finance
    // -------------------------------------------------------------------------

    pub fn add_finance_record(&mut self, request: NewFinanceRecord) -> &FinanceRecord {
        self.finance.push(FinanceRecord {
            id: new_id(),
            date: request.date,
            record_type: request.record_type,
            category: request.category,
            amount: finite(request.amount).abs(),
            description: request.description,
            status: request.status,
            enterprise: request.enterprise,
            allocation_id: non_empty(request.allocation_id),
            batch_id: non_empty(request.batch_id),
        });
        self.persist_finance();
        let last = self.finance.len() - 1;
        &self.finance[last]
    }

    /// Mark a scheduled or projected record as paid.
    pub fn settle_finance_record(&mut self, id: &str) -> Result<(), FarmError> {
        let record = self
            .finance
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| FarmError::not_found("finance record", id))?;
        record.status = Some(FinanceStatus::Paid);
        self.persist_finance();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub fn add_user(&mut self, request: NewUser) -> &User {
        self.users.push(User {
            id: new_id(),
            name: request.name,
            email: request.email.trim().to_string(),
            role: request.role,
            password: request.password,
        });
        self.persist_users();
        let last = self.users.len() - 1;
        &self.users[last]
    }

    /// Plaintext credential check, case-insensitive on email. Not secure.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email) && u.password == password)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
    }

    fn empty_state() -> FarmState {
        let mut store = PersistentStore::in_memory();
        for key in crate::store::COLLECTION_KEYS {
            store.save(key, &Vec::<serde_json::Value>::new());
        }
        FarmState::open(store, today())
    }

    #[test]
    fn test_open_seeds_missing_collections() {
        let state = FarmState::open(PersistentStore::in_memory(), today());
        assert!(!state.animals().is_empty());
        assert!(!state.users().is_empty());
        assert!(!state.finance().is_empty());
    }

    #[test]
    fn test_open_keeps_stored_empty_collection() {
        let state = empty_state();
        assert!(state.animals().is_empty());
        assert!(state.tasks().is_empty());
    }

    #[test]
    fn test_add_animal_seeds_created_event() {
        let mut state = empty_state();
        let animal = state.add_animal(NewAnimal {
            tag: " P-500 ".to_string(),
            pen_location: "Finisher B".to_string(),
            date_of_birth: today(),
            sire_tag: Some("  ".to_string()),
            ..Default::default()
        });
        assert_eq!(animal.tag, "P-500");
        assert_eq!(animal.timeline.len(), 1);
        assert_eq!(animal.timeline[0].title, "Created");
        assert_eq!(animal.sire_tag, None);
    }

    #[test]
    fn test_duplicate_tag_is_tolerated() {
        let mut state = empty_state();
        state.add_animal(NewAnimal {
            tag: "P-1".to_string(),
            ..Default::default()
        });
        state.add_animal(NewAnimal {
            tag: "P-1".to_string(),
            ..Default::default()
        });
        assert_eq!(state.animals().len(), 2);
    }

    #[test]
    fn test_log_feeding_updates_animal_and_stock() {
        let mut state = empty_state();
        let animal_id = state
            .add_animal(NewAnimal {
                tag: "P-1".to_string(),
                ..Default::default()
            })
            .id
            .clone();
        let feed_id = state
            .add_feed(NewFeed {
                name: "Grower".to_string(),
                quantity: 10.0,
                reorder_level: 2.0,
                ..Default::default()
            })
            .id
            .clone();
        let at = Utc.with_ymd_and_hms(2026, 6, 1, 7, 30, 0).unwrap();

        state.log_feeding(&animal_id, Some(&feed_id), 4.0, at).unwrap();
        state.log_feeding(&animal_id, Some(&feed_id), 40.0, at).unwrap();

        let animal = state.animal(&animal_id).unwrap();
        assert_eq!(animal.last_fed.as_deref(), Some(at.to_rfc3339().as_str()));
        assert_eq!(animal.timeline.len(), 3);
        assert_eq!(animal.timeline[1].subtitle, "4.0 kg Grower");
        assert_eq!(state.feed()[0].quantity, 0.0);
    }

    #[test]
    fn test_log_feeding_unknown_feed_changes_nothing() {
        let mut state = empty_state();
        let animal_id = state.add_animal(NewAnimal::default()).id.clone();
        let at = Utc::now();
        let err = state.log_feeding(&animal_id, Some("nope"), 1.0, at);
        assert!(matches!(err, Err(FarmError::NotFound { kind: "feed", .. })));
        assert!(state.animal(&animal_id).unwrap().last_fed.is_none());
    }

    #[test]
    fn test_delete_animal_leaves_references() {
        let mut state = empty_state();
        let sire_id = state
            .add_animal(NewAnimal {
                tag: "B-1".to_string(),
                ..Default::default()
            })
            .id
            .clone();
        state.add_animal(NewAnimal {
            tag: "P-1".to_string(),
            sire_tag: Some("B-1".to_string()),
            ..Default::default()
        });

        state.delete_animal(&sire_id).unwrap();

        assert_eq!(state.animals().len(), 1);
        assert_eq!(state.animals()[0].sire_tag.as_deref(), Some("B-1"));
        assert!(state.delete_animal(&sire_id).is_err());
    }

    #[test]
    fn test_health_record_appends_timeline() {
        let mut state = empty_state();
        let id = state
            .add_animal(NewAnimal {
                tag: "S-1".to_string(),
                ..Default::default()
            })
            .id
            .clone();
        state.add_health_record(NewHealthRecord {
            animal_tag: "S-1".to_string(),
            record_type: HealthRecordType::Vaccination,
            description: "Erysipelas".to_string(),
            medication: Some("ERY vaccine".to_string()),
            date: today(),
            ..Default::default()
        });
        state.add_health_record(NewHealthRecord {
            animal_tag: "GHOST".to_string(),
            ..Default::default()
        });

        let animal = state.animal(&id).unwrap();
        assert_eq!(animal.timeline.len(), 2);
        assert_eq!(animal.timeline[1].title, "Vaccination");
        assert_eq!(animal.timeline[1].color, EventColor::Green);
        assert_eq!(state.health().len(), 2);
    }

    #[test]
    fn test_toggle_task() {
        let mut state = empty_state();
        let id = state
            .add_task(NewTask {
                title: "Fix fence".to_string(),
                ..Default::default()
            })
            .id
            .clone();
        assert_eq!(state.toggle_task(&id).unwrap(), TaskStatus::Completed);
        assert_eq!(state.toggle_task(&id).unwrap(), TaskStatus::Pending);
        assert!(state.toggle_task("missing").is_err());
    }

    #[test]
    fn test_restock_and_consume() {
        let mut state = empty_state();
        let id = state
            .add_feed(NewFeed {
                name: "Mash".to_string(),
                quantity: 100.0,
                reorder_level: 150.0,
                ..Default::default()
            })
            .id
            .clone();
        assert_eq!(state.low_stock_feed().len(), 1);
        assert_eq!(state.restock_feed(&id, 200.0, today()).unwrap(), 300.0);
        assert!(state.low_stock_feed().is_empty());
        assert_eq!(state.consume_feed(&id, 500.0).unwrap(), 0.0);
    }

    #[test]
    fn test_settle_finance_record() {
        let mut state = empty_state();
        let id = state
            .add_finance_record(NewFinanceRecord {
                amount: -75.0,
                status: Some(FinanceStatus::Scheduled),
                ..Default::default()
            })
            .id
            .clone();
        assert_eq!(state.finance()[0].amount, 75.0);
        state.settle_finance_record(&id).unwrap();
        assert!(state.finance()[0].is_settled());
    }

    #[test]
    fn test_authenticate_plaintext() {
        let state = FarmState::open(PersistentStore::in_memory(), today());
        assert!(state.authenticate("ADMIN@farmstead.local", "admin123").is_some());
        assert!(state.authenticate("admin@farmstead.local", "wrong").is_none());
    }

    #[test]
    fn test_mutations_are_mirrored_to_store() {
        let backend = MemoryBackend::default();
        let mut state = FarmState::open(PersistentStore::new(backend), today());
        let before = state.tasks().len();
        state.add_task(NewTask {
            title: "Check water".to_string(),
            ..Default::default()
        });

        let stored: Vec<Task> = state.store.load(TASKS_KEY, Vec::new());
        assert_eq!(stored.len(), before + 1);
        assert_eq!(stored, state.tasks());
    }

    #[test]
    fn test_factory_reset_restores_samples() {
        let mut state = FarmState::open(PersistentStore::in_memory(), today());
        let seeded = state.animals().len();
        let id = state.animals()[0].id.clone();
        state.delete_animal(&id).unwrap();
        state.factory_reset(today());
        assert_eq!(state.animals().len(), seeded);
    }

    /// Backend whose reads always fail. Writes land in a shared map.
    struct UnreadableBackend {
        entries: Arc<Mutex<std::collections::BTreeMap<String, String>>>,
    }

    impl crate::store::KvBackend for UnreadableBackend {
        fn get(&self, _key: &str) -> Result<Option<String>, crate::StoreError> {
            Err(crate::StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "database is locked",
            )))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), crate::StoreError> {
            self.entries.lock().insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), crate::StoreError> {
            self.entries.lock().remove(key);
            Ok(())
        }

        fn keys(&self) -> Result<Vec<String>, crate::StoreError> {
            Ok(self.entries.lock().keys().cloned().collect())
        }
    }

    #[test]
    fn test_read_error_does_not_overwrite_stored_data() {
        let entries = Arc::new(Mutex::new(std::collections::BTreeMap::new()));
        let stored = r#"[{"id":"real","tag":"REAL-1"}]"#.to_string();
        entries.lock().insert(ANIMALS_KEY.to_string(), stored.clone());

        let state = FarmState::open(
            PersistentStore::new(UnreadableBackend {
                entries: entries.clone(),
            }),
            today(),
        );

        // Session falls back to samples in memory, the stored herd is untouched.
        assert!(!state.animals().is_empty());
        let entries = entries.lock();
        assert_eq!(entries.get(ANIMALS_KEY), Some(&stored));
        assert!(!entries.contains_key(TASKS_KEY));
    }

    #[test]
    fn test_non_finite_inputs_are_zeroed() {
        let mut state = empty_state();
        let animal_id = state
            .add_animal(NewAnimal {
                tag: "P-1".to_string(),
                weight: f64::INFINITY,
                ..Default::default()
            })
            .id
            .clone();
        assert_eq!(state.animal(&animal_id).unwrap().weight, 0.0);

        state.record_weight(&animal_id, f64::NAN, today()).unwrap();
        assert_eq!(state.animal(&animal_id).unwrap().weight, 0.0);
        assert_eq!(state.animal(&animal_id).unwrap().timeline[1].subtitle, "0.0 kg");

        let feed_id = state
            .add_feed(NewFeed {
                name: "Mash".to_string(),
                quantity: f64::NAN,
                reorder_level: f64::NEG_INFINITY,
                ..Default::default()
            })
            .id
            .clone();
        assert_eq!(state.restock_feed(&feed_id, f64::NAN, today()).unwrap(), 0.0);
        assert_eq!(state.restock_feed(&feed_id, 10.0, today()).unwrap(), 10.0);
        assert_eq!(state.consume_feed(&feed_id, f64::NAN).unwrap(), 10.0);
        state
            .log_feeding(&animal_id, Some(&feed_id), f64::INFINITY, Utc::now())
            .unwrap();
        assert_eq!(state.feed()[0].quantity, 10.0);
        assert_eq!(state.feed()[0].reorder_level, 0.0);

        state.add_finance_record(NewFinanceRecord {
            amount: f64::NAN,
            ..Default::default()
        });
        assert_eq!(state.finance()[0].amount, 0.0);

        // Every collection still reads back from the store.
        let animals: Vec<Animal> = state.store.load(ANIMALS_KEY, Vec::new());
        let feed: Vec<FeedInventory> = state.store.load(FEED_KEY, Vec::new());
        let finance: Vec<FinanceRecord> = state.store.load(FINANCE_KEY, Vec::new());
        assert_eq!(animals, state.animals());
        assert_eq!(feed, state.feed());
        assert_eq!(finance, state.finance());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("checkup"), "Checkup");
        assert_eq!(capitalize(""), "");
    }
}
