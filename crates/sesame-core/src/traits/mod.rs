// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions implemented by every authentication driver.
//!
//! Drivers implement [`Driver`] and opt into [`Redirectable`],
//! [`StateVerifiable`] and [`AccountFlows`] as their flow requires. All traits use `#[async_trait]`
//! where needed for dynamic dispatch compatibility.

pub mod auth;

pub use auth::{AccountFlows, Driver, Redirectable, StateVerifiable};
