// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of configured drivers, keyed by provider type.

use std::collections::BTreeMap;

use crate::driver::AuthDriver;
use crate::types::{AuthDriverManifests, ProviderType};

/// The set of drivers enabled for a process, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct AuthDrivers {
    drivers: BTreeMap<ProviderType, AuthDriver>,
}

impl AuthDrivers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver under its manifest type, replacing any previous one.
    pub fn register(&mut self, driver: AuthDriver) {
        self.drivers.insert(driver.provider_type(), driver);
    }

    pub fn get(&self, provider_type: ProviderType) -> Option<&AuthDriver> {
        self.drivers.get(&provider_type)
    }

    /// Manifests of every registered driver, in provider order.
    pub fn manifests(&self) -> AuthDriverManifests {
        AuthDriverManifests(self.drivers.values().map(AuthDriver::manifest).collect())
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuthDriver> {
        self.drivers.values()
    }
}
