//! Farm state persisted through the SQLite backend and reopened.

use chrono::{NaiveDate, TimeZone, Utc};
use farmstead::state::{
    NewAnimal, NewFeed, NewFinanceRecord, NewHealthRecord, NewTask, NewUser,
};
use farmstead::store::{
    PersistentStore, SqliteBackend, ANIMALS_KEY, FEED_KEY, FINANCE_KEY, HEALTH_KEY, TASKS_KEY,
    USERS_KEY,
};
use farmstead::types::{
    Animal, Enterprise, FeedInventory, FinanceRecord, FinanceStatus, FinanceType, HealthRecord,
    HealthRecordType, LifeStage, Role, Task, User,
};
use farmstead::{FarmConfig, FarmState};
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
}

fn open_state(dir: &TempDir) -> FarmState {
    let backend = SqliteBackend::open_at(&dir.path().join("farm.db")).unwrap();
    FarmState::open(PersistentStore::new(backend), today())
}

#[test]
fn test_mutations_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let animal_id = {
        let mut state = open_state(&dir);
        let id = state
            .add_animal(NewAnimal {
                tag: "P-900".to_string(),
                stage: LifeStage::Growing,
                weight: 41.0,
                ..Default::default()
            })
            .id
            .clone();
        state.update_stage(&id, LifeStage::Finishing).unwrap();
        state.add_task(NewTask {
            title: "Move P-900 to finisher".to_string(),
            due_date: today(),
            ..Default::default()
        });
        id
    };

    let state = open_state(&dir);
    let animal = state.animal(&animal_id).expect("animal persisted");
    assert_eq!(animal.tag, "P-900");
    assert_eq!(animal.stage, LifeStage::Finishing);
    assert!(state
        .tasks()
        .iter()
        .any(|t| t.title == "Move P-900 to finisher"));
}

#[test]
fn test_stored_empty_collection_is_not_reseeded() {
    let dir = TempDir::new().unwrap();
    {
        let mut state = open_state(&dir);
        let ids: Vec<String> = state.animals().iter().map(|a| a.id.clone()).collect();
        for id in ids {
            state.delete_animal(&id).unwrap();
        }
    }
    let state = open_state(&dir);
    assert!(state.animals().is_empty());
    assert!(!state.tasks().is_empty());
}

/// Adds one record with every optional field set to each collection.
fn add_full_records(state: &mut FarmState) {
    let worker = state
        .add_user(NewUser {
            name: "Sam Field".to_string(),
            email: "sam@farmstead.local".to_string(),
            role: Role::Worker,
            password: "pigs".to_string(),
        })
        .id
        .clone();
    let animal = state
        .add_animal(NewAnimal {
            tag: "RT-1".to_string(),
            breed: "Tamworth".to_string(),
            date_of_birth: today(),
            stage: LifeStage::Finishing,
            pen_location: "Finisher C".to_string(),
            weight: 88.5,
            sire_tag: Some("B-001".to_string()),
            dam_tag: Some("S-001".to_string()),
            notes: Some("Bright and eating well".to_string()),
            ..Default::default()
        })
        .id
        .clone();
    let feed = state
        .add_feed(NewFeed {
            name: "Round Trip Mix".to_string(),
            feed_type: "Finisher".to_string(),
            quantity: 250.0,
            reorder_level: 100.0,
            last_restocked: today(),
        })
        .id
        .clone();
    let at = Utc.with_ymd_and_hms(2026, 6, 1, 6, 45, 0).unwrap();
    state.log_feeding(&animal, Some(&feed), 3.5, at).unwrap();
    state.add_task(NewTask {
        title: "Weigh RT-1".to_string(),
        due_date: today(),
        category: "Weighing".to_string(),
        assignee_id: Some(worker),
        ..Default::default()
    });
    state.add_health_record(NewHealthRecord {
        animal_tag: "RT-1".to_string(),
        date: today(),
        record_type: HealthRecordType::Treatment,
        description: "Lameness".to_string(),
        medication: Some("Meloxicam".to_string()),
        administered_by: "Dr. Reyes".to_string(),
    });
    state.add_finance_record(NewFinanceRecord {
        date: today(),
        record_type: FinanceType::Expense,
        category: "Veterinary".to_string(),
        amount: 64.0,
        description: "Lameness call-out".to_string(),
        status: Some(FinanceStatus::Scheduled),
        enterprise: Some(Enterprise::Livestock),
        allocation_id: Some("ALLOC-7".to_string()),
        batch_id: Some("BATCH-RT".to_string()),
    });
}

fn reopen_store(dir: &TempDir) -> PersistentStore {
    let backend = SqliteBackend::open_at(&dir.path().join("farm.db")).unwrap();
    PersistentStore::new(backend)
}

#[test]
fn test_round_trip_equals_saved_collection() {
    let dir = TempDir::new().unwrap();
    let mut state = open_state(&dir);
    add_full_records(&mut state);

    let animals = state.animals().to_vec();
    let users = state.users().to_vec();
    let tasks = state.tasks().to_vec();
    let feed = state.feed().to_vec();
    let health = state.health().to_vec();
    let finance = state.finance().to_vec();
    drop(state);

    let store = reopen_store(&dir);
    assert_eq!(store.load::<Vec<Animal>>(ANIMALS_KEY, Vec::new()), animals);
    assert_eq!(store.load::<Vec<User>>(USERS_KEY, Vec::new()), users);
    assert_eq!(store.load::<Vec<Task>>(TASKS_KEY, Vec::new()), tasks);
    assert_eq!(store.load::<Vec<FeedInventory>>(FEED_KEY, Vec::new()), feed);
    assert_eq!(store.load::<Vec<HealthRecord>>(HEALTH_KEY, Vec::new()), health);
    assert_eq!(store.load::<Vec<FinanceRecord>>(FINANCE_KEY, Vec::new()), finance);

    let animal = animals.iter().find(|a| a.tag == "RT-1").unwrap();
    assert!(animal.last_fed.is_some());
    assert!(tasks.iter().any(|t| t.assignee_id.is_some()));
    assert!(health.iter().any(|h| h.medication.as_deref() == Some("Meloxicam")));
    assert!(finance
        .iter()
        .any(|f| f.allocation_id.as_deref() == Some("ALLOC-7") && f.enterprise.is_some()));
}

#[test]
fn test_non_finite_input_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let animal_id = {
        let mut state = open_state(&dir);
        let id = state
            .add_animal(NewAnimal {
                tag: "MINE-1".to_string(),
                ..Default::default()
            })
            .id
            .clone();
        state.record_weight(&id, f64::NAN, today()).unwrap();
        state.add_finance_record(NewFinanceRecord {
            amount: f64::NAN,
            description: "mine".to_string(),
            ..Default::default()
        });
        id
    };

    let state = open_state(&dir);
    assert_eq!(state.animal(&animal_id).unwrap().weight, 0.0);
    let record = state
        .finance()
        .iter()
        .find(|r| r.description == "mine")
        .expect("finance record kept");
    assert_eq!(record.amount, 0.0);
}

#[test]
fn test_factory_reset_reseeds_database() {
    let dir = TempDir::new().unwrap();
    let seeded = {
        let mut state = open_state(&dir);
        let seeded = state.animals().len();
        let id = state.animals()[0].id.clone();
        state.delete_animal(&id).unwrap();
        state.factory_reset(today());
        seeded
    };
    assert_eq!(open_state(&dir).animals().len(), seeded);
}

#[test]
fn test_open_with_config_uses_store_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("farm.db");
    let config = FarmConfig {
        store_path: Some(path.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let state = FarmState::open_with_config(&config, today());
    assert!(!state.animals().is_empty());
    assert!(path.exists());
}
