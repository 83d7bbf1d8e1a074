// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitLab OAuth2 driver for Sesame.
//!
//! Works against gitlab.com or a self-managed instance: the authorize, token,
//! and `/api/v4/user` endpoints all hang off the configured instance URL.

pub mod driver;

pub use driver::{GitlabConfig, GitlabDriver, DEFAULT_URL};
