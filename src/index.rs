//! Tag lookups for weak references.
//!
//! Pedigree (`sire_tag`/`dam_tag`) and health records point at animals by ear
//! tag, not id. Tags are not unique: the index resolves a tag to the first
//! animal carrying it (collection order) and reports the collisions. Nothing
//! cascades; a reference to a deleted or never-existing tag simply resolves to
//! `None`.

use std::collections::HashMap;

use serde::Serialize;

use crate::types::{Animal, HealthRecord};

/// A weak reference whose tag matches no animal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingReference {
    pub source_id: String,
    pub field: &'static str,
    pub tag: String,
}

pub struct TagIndex<'a> {
    animals: &'a [Animal],
    by_tag: HashMap<&'a str, usize>,
    duplicates: Vec<String>,
}

fn normalize(tag: &str) -> &str {
    tag.trim()
}

impl<'a> TagIndex<'a> {
    /// Build the index over the current animal collection.
    pub fn build(animals: &'a [Animal]) -> Self {
        let mut by_tag: HashMap<&'a str, usize> = HashMap::with_capacity(animals.len());
        let mut duplicates: Vec<String> = Vec::new();

        for (i, animal) in animals.iter().enumerate() {
            let tag = normalize(&animal.tag);
            if tag.is_empty() {
                continue;
            }
            if by_tag.contains_key(tag) {
                if !duplicates.iter().any(|d| d == tag) {
                    duplicates.push(tag.to_string());
                }
                continue;
            }
            by_tag.insert(tag, i);
        }

        Self {
            animals,
            by_tag,
            duplicates,
        }
    }

    pub fn get(&self, tag: &str) -> Option<&'a Animal> {
        self.by_tag
            .get(normalize(tag))
            .and_then(|&i| self.animals.get(i))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.by_tag.contains_key(normalize(tag))
    }

    pub fn sire_of(&self, animal: &Animal) -> Option<&'a Animal> {
        animal.sire_tag.as_deref().and_then(|tag| self.get(tag))
    }

    pub fn dam_of(&self, animal: &Animal) -> Option<&'a Animal> {
        animal.dam_tag.as_deref().and_then(|tag| self.get(tag))
    }

    /// Animals naming `tag` as sire or dam.
    pub fn offspring_of(&self, tag: &str) -> Vec<&'a Animal> {
        let tag = normalize(tag);
        if tag.is_empty() {
            return Vec::new();
        }
        self.animals
            .iter()
            .filter(|a| {
                a.sire_tag.as_deref().map(normalize) == Some(tag)
                    || a.dam_tag.as_deref().map(normalize) == Some(tag)
            })
            .collect()
    }

    /// Tags carried by more than one animal, in first-seen order.
    pub fn duplicate_tags(&self) -> &[String] {
        &self.duplicates
    }

    /// Pedigree and health references that resolve to no animal.
    pub fn dangling_references(&self, health: &[HealthRecord]) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();

        for animal in self.animals {
            for (field, tag) in [("sireTag", &animal.sire_tag), ("damTag", &animal.dam_tag)] {
                if let Some(tag) = tag {
                    if !normalize(tag).is_empty() && !self.contains(tag) {
                        dangling.push(DanglingReference {
                            source_id: animal.id.clone(),
                            field,
                            tag: tag.clone(),
                        });
                    }
                }
            }
        }

        for record in health {
            if !self.contains(&record.animal_tag) {
                dangling.push(DanglingReference {
                    source_id: record.id.clone(),
                    field: "animalTag",
                    tag: record.animal_tag.clone(),
                });
            }
        }

        dangling
    }
}

/// Health records referencing `tag`, in collection order.
pub fn health_records_for<'r>(tag: &str, records: &'r [HealthRecord]) -> Vec<&'r HealthRecord> {
    let tag = normalize(tag);
    records
        .iter()
        .filter(|r| normalize(&r.animal_tag) == tag)
        .collect()
}
