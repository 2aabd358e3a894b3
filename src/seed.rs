//! Built-in sample data.
//!
//! Used to reseed any collection missing from the store (first run, or after
//! a factory reset). Dates are relative to `today` so the calendar, forecast
//! and alerts have something current to show. Ids are fixed so reseeding
//! twice produces identical records.

use chrono::{Duration, NaiveDate};

use crate::types::{
    Animal, AnimalStatus, Enterprise, EventColor, EventStatus, FeedInventory, FinanceRecord,
    FinanceStatus, FinanceType, HealthRecord, HealthRecordType, LifeStage, Role, Sex, Task,
    TaskPriority, TaskStatus, TimelineEvent, User,
};

pub fn sample_users() -> Vec<User> {
    // (id, name, email, role, password)
    let rows: [(&str, &str, &str, Role, &str); 4] = [
        ("user-admin", "Farm Admin", "admin@farmstead.local", Role::Admin, "admin123"),
        ("user-manager", "Dana Reyes", "dana@farmstead.local", Role::Manager, "manager123"),
        ("user-vet", "Dr. Okafor", "vet@farmstead.local", Role::Veterinarian, "vet123"),
        ("user-worker", "Sam Lind", "sam@farmstead.local", Role::Worker, "worker123"),
    ];

    rows.iter()
        .map(|(id, name, email, role, password)| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: *role,
            password: password.to_string(),
        })
        .collect()
}

pub fn sample_animals(today: NaiveDate) -> Vec<Animal> {
    let days_ago = |n: i64| today - Duration::days(n);

    // (id, tag, breed, age_days, sex, stage, status, pen, weight, sire, dam)
    let rows: [(
        &str,
        &str,
        &str,
        i64,
        Sex,
        LifeStage,
        AnimalStatus,
        &str,
        f64,
        Option<&str>,
        Option<&str>,
    ); 6] = [
        ("seed-animal-1", "B-001", "Duroc", 900, Sex::Male, LifeStage::BreedingMale, AnimalStatus::Active, "Boar Pen", 260.0, None, None),
        ("seed-animal-2", "S-014", "Large White", 720, Sex::Female, LifeStage::BreedingFemale, AnimalStatus::Active, "Farrowing 1", 210.0, None, None),
        ("seed-animal-3", "P-101", "Duroc x LW", 160, Sex::Male, LifeStage::Finishing, AnimalStatus::Active, "Finisher A", 96.5, Some("B-001"), Some("S-014")),
        ("seed-animal-4", "P-102", "Duroc x LW", 150, Sex::Female, LifeStage::Finishing, AnimalStatus::Active, "Finisher A", 82.0, Some("B-001"), Some("S-014")),
        ("seed-animal-5", "P-103", "Duroc x LW", 150, Sex::Female, LifeStage::Finishing, AnimalStatus::Sick, "Hospital Pen", 78.0, Some("B-001"), Some("S-014")),
        ("seed-animal-6", "P-120", "Large White", 45, Sex::Male, LifeStage::Weaned, AnimalStatus::Active, "Nursery 2", 14.0, None, Some("S-014")),
    ];

    rows.iter()
        .map(
            |(id, tag, breed, age, sex, stage, status, pen, weight, sire, dam)| {
                let born = days_ago(*age);
                let mut timeline = vec![TimelineEvent {
                    id: format!("{}-created", id),
                    date: born,
                    title: "Created".to_string(),
                    subtitle: format!("Registered in {}", pen),
                    color: EventColor::Blue,
                    status: EventStatus::Completed,
                }];
                if *status == AnimalStatus::Sick {
                    timeline.push(TimelineEvent {
                        id: format!("{}-sick", id),
                        date: days_ago(2),
                        title: "Moved to hospital pen".to_string(),
                        subtitle: "Coughing, reduced intake".to_string(),
                        color: EventColor::Red,
                        status: EventStatus::Completed,
                    });
                }
                Animal {
                    id: id.to_string(),
                    tag: tag.to_string(),
                    breed: breed.to_string(),
                    date_of_birth: born,
                    sex: *sex,
                    stage: *stage,
                    status: *status,
                    pen_location: pen.to_string(),
                    weight: *weight,
                    sire_tag: sire.map(str::to_string),
                    dam_tag: dam.map(str::to_string),
                    notes: None,
                    last_fed: None,
                    timeline,
                }
            },
        )
        .collect()
}

pub fn sample_tasks(today: NaiveDate) -> Vec<Task> {
    let in_days = |n: i64| today + Duration::days(n);

    // (id, title, due, priority, status, category, assignee)
    let rows: [(&str, &str, i64, TaskPriority, TaskStatus, &str, Option<&str>); 5] = [
        ("seed-task-1", "Clean finisher pens", 0, TaskPriority::Medium, TaskStatus::Pending, "maintenance", Some("user-worker")),
        ("seed-task-2", "Vaccinate weaners", 3, TaskPriority::High, TaskStatus::Pending, "health", Some("user-vet")),
        ("seed-task-3", "Order grower feed", 1, TaskPriority::High, TaskStatus::Pending, "feed", Some("user-manager")),
        ("seed-task-4", "Repair waterer in Nursery 2", -2, TaskPriority::Low, TaskStatus::Pending, "maintenance", None),
        ("seed-task-5", "Weigh finishers", -5, TaskPriority::Medium, TaskStatus::Completed, "records", Some("user-worker")),
    ];

    rows.iter()
        .map(|(id, title, due, priority, status, category, assignee)| Task {
            id: id.to_string(),
            title: title.to_string(),
            due_date: in_days(*due),
            priority: *priority,
            status: *status,
            category: category.to_string(),
            assignee_id: assignee.map(str::to_string),
        })
        .collect()
}

pub fn sample_feed(today: NaiveDate) -> Vec<FeedInventory> {
    // (id, name, type, kg, reorder_kg, restocked_days_ago)
    let rows: [(&str, &str, &str, f64, f64, i64); 3] = [
        ("seed-feed-1", "Grower Pellets", "grower", 1200.0, 500.0, 10),
        ("seed-feed-2", "Finisher Mash", "finisher", 340.0, 400.0, 21),
        ("seed-feed-3", "Creep Feed", "starter", 150.0, 50.0, 4),
    ];

    rows.iter()
        .map(|(id, name, feed_type, qty, reorder, ago)| FeedInventory {
            id: id.to_string(),
            name: name.to_string(),
            feed_type: feed_type.to_string(),
            quantity: *qty,
            reorder_level: *reorder,
            last_restocked: today - Duration::days(*ago),
        })
        .collect()
}

pub fn sample_health(today: NaiveDate) -> Vec<HealthRecord> {
    vec![
        HealthRecord {
            id: "seed-health-1".to_string(),
            animal_tag: "P-103".to_string(),
            date: today - Duration::days(2),
            record_type: HealthRecordType::Treatment,
            description: "Respiratory infection".to_string(),
            medication: Some("Oxytetracycline".to_string()),
            administered_by: "Dr. Okafor".to_string(),
        },
        HealthRecord {
            id: "seed-health-2".to_string(),
            animal_tag: "S-014".to_string(),
            date: today - Duration::days(30),
            record_type: HealthRecordType::Vaccination,
            description: "Parvovirus booster".to_string(),
            medication: Some("PPV vaccine".to_string()),
            administered_by: "Dr. Okafor".to_string(),
        },
    ]
}

pub fn sample_finance(today: NaiveDate) -> Vec<FinanceRecord> {
    let on = |n: i64| today + Duration::days(n);

    // (id, day offset, type, category, amount, description, status, enterprise, batch)
    let rows: [(
        &str,
        i64,
        FinanceType,
        &str,
        f64,
        &str,
        FinanceStatus,
        Enterprise,
        Option<&str>,
    ); 6] = [
        ("seed-fin-1", -40, FinanceType::Income, "Livestock Sales", 2400.0, "Sold 8 finishers", FinanceStatus::Paid, Enterprise::Livestock, Some("BATCH-2026-01")),
        ("seed-fin-2", -60, FinanceType::Expense, "Feed", 950.0, "Grower pellets, 2t", FinanceStatus::Paid, Enterprise::Livestock, Some("BATCH-2026-01")),
        ("seed-fin-3", -20, FinanceType::Expense, "Veterinary", 180.0, "Herd check", FinanceStatus::Paid, Enterprise::Livestock, None),
        ("seed-fin-4", -10, FinanceType::Expense, "Fuel", 120.0, "Tractor diesel", FinanceStatus::Paid, Enterprise::Machinery, None),
        ("seed-fin-5", 12, FinanceType::Expense, "Feed", 780.0, "Finisher mash delivery", FinanceStatus::Scheduled, Enterprise::Livestock, Some("BATCH-2026-02")),
        ("seed-fin-6", 50, FinanceType::Expense, "Insurance", 600.0, "Annual farm policy", FinanceStatus::Scheduled, Enterprise::General, None),
    ];

    rows.iter()
        .map(
            |(id, day, kind, category, amount, description, status, enterprise, batch)| {
                FinanceRecord {
                    id: id.to_string(),
                    date: on(*day),
                    record_type: *kind,
                    category: category.to_string(),
                    amount: *amount,
                    description: description.to_string(),
                    status: Some(*status),
                    enterprise: Some(*enterprise),
                    allocation_id: None,
                    batch_id: batch.map(str::to_string),
                }
            },
        )
        .collect()
}
