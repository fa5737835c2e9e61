//! Dog profile registry.

use crate::models::DogProfile;

/// Ordered profiles plus the active selection.
///
/// Never empty: construction seeds the default profile when given nothing.
/// If the active ID does not resolve, the first profile is active.
#[derive(Debug, Clone, PartialEq)]
pub struct DogRegistry {
    dogs: Vec<DogProfile>,
    active_id: String,
}

impl Default for DogRegistry {
    fn default() -> Self {
        let seeded = DogProfile::seeded_default();
        Self {
            active_id: seeded.id.clone(),
            dogs: vec![seeded],
        }
    }
}

impl DogRegistry {
    /// Build from loaded profiles and a possibly stale active ID.
    pub fn from_parts(dogs: Vec<DogProfile>, active_id: Option<String>) -> Self {
        if dogs.is_empty() {
            return Self::default();
        }
        let active_id = active_id.unwrap_or_else(|| dogs[0].id.clone());
        Self { dogs, active_id }
    }

    /// Append a profile and make it active.
    pub fn add(&mut self, dog: DogProfile) {
        self.active_id = dog.id.clone();
        self.dogs.push(dog);
    }

    /// Replace the profile with the same ID in place. Returns false if unknown.
    pub fn update(&mut self, dog: DogProfile) -> bool {
        match self.dogs.iter_mut().find(|d| d.id == dog.id) {
            Some(slot) => {
                *slot = dog;
                true
            }
            None => false,
        }
    }

    /// Make `id` active. Unknown IDs leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_some() {
            self.active_id = id.to_string();
            true
        } else {
            false
        }
    }

    /// The active profile, falling back to the first.
    pub fn active(&self) -> &DogProfile {
        self.get(&self.active_id).unwrap_or(&self.dogs[0])
    }

    /// ID of the profile actually in effect.
    pub fn active_id(&self) -> &str {
        &self.active().id
    }

    /// The stored selection, which may not resolve.
    pub fn stored_active_id(&self) -> &str {
        &self.active_id
    }

    pub fn get(&self, id: &str) -> Option<&DogProfile> {
        self.dogs.iter().find(|d| d.id == id)
    }

    pub fn all(&self) -> &[DogProfile] {
        &self.dogs
    }

    pub fn ids(&self) -> Vec<&str> {
        self.dogs.iter().map(|d| d.id.as_str()).collect()
    }
}
