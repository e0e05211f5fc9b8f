//! Local-only user preferences.
//!
//! These keys are never synced remotely.

use std::collections::BTreeSet;

use crate::cache::{keys, LocalCache};

/// Typed access to the preference keys of the local cache.
pub struct Settings<'a> {
    cache: &'a LocalCache,
}

impl<'a> Settings<'a> {
    pub fn new(cache: &'a LocalCache) -> Self {
        Self { cache }
    }

    pub fn dark_mode(&self) -> bool {
        self.cache.read(keys::DARK_MODE, false)
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        self.cache.write(keys::DARK_MODE, &enabled);
    }

    /// The view the user last had open.
    pub fn last_view(&self) -> Option<String> {
        self.cache.read(keys::LAST_VIEW, None)
    }

    pub fn set_last_view(&self, view: &str) {
        self.cache.write(keys::LAST_VIEW, view);
    }

    /// The brand the user last worked in.
    pub fn last_brand(&self) -> Option<String> {
        self.cache.read(keys::LAST_BRAND, None)
    }

    pub fn set_last_brand(&self, brand: Option<&str>) {
        match brand {
            Some(name) => self.cache.write(keys::LAST_BRAND, name),
            None => self.cache.remove(keys::LAST_BRAND),
        }
    }

    pub fn completed_steps(&self) -> BTreeSet<String> {
        self.cache.read_or_default(keys::ONBOARDING_STEPS)
    }

    /// Mark an onboarding step done. Returns false if it already was.
    pub fn complete_step(&self, step: &str) -> bool {
        let mut steps = self.completed_steps();
        let inserted = steps.insert(step.to_string());
        if inserted {
            self.cache.write(keys::ONBOARDING_STEPS, &steps);
        }
        inserted
    }

    pub fn reset_onboarding(&self) {
        self.cache.remove(keys::ONBOARDING_STEPS);
    }
}
