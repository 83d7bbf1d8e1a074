// SPDX-FileCopyrightText: 2026 Sesame Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GitHub OAuth2 driver for Sesame.
//!
//! Provides [`GithubDriver`], which sends users to GitHub's authorize page
//! with a signed state token, exchanges the callback `code` for an access
//! token, and maps the `/user` profile onto a [`sesame_core::UserInfo`].

pub mod driver;
pub mod types;

pub use driver::{GithubConfig, GithubDriver, DEFAULT_API_URL, DEFAULT_URL};
