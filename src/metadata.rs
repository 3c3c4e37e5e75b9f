// SPDX-FileCopyrightText: 2025-2026 The MoonBound authors
//
// SPDX-License-Identifier: Apache-2.0

use directories::ProjectDirs;
use inflector::Inflector;
use once_cell::sync::Lazy;

/// The production endpoint of the interpretation service. Overridable with
/// `--api-url` or `MOONBOUND_API_URL`.
pub(crate) const DEFAULT_API_URL: &str = "https://traductordesue-osai.onrender.com";

/// Fixed name under which the session token is persisted.
pub(crate) const SESSION_FILE: &str = "session.json";

pub(crate) static CLIENT_TYPE_ID: Lazy<String> =
    Lazy::new(|| option_env!("CARGO_PKG_NAME").unwrap_or("moonbound").to_owned());
pub(crate) static CLIENT_DISPLAY_NAME: Lazy<String> = Lazy::new(|| CLIENT_TYPE_ID.to_title_case());

pub(crate) static PROJECT_DIRS: Lazy<Option<ProjectDirs>> =
    Lazy::new(|| ProjectDirs::from("app", "MoonBound", &CLIENT_DISPLAY_NAME));
