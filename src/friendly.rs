// SPDX-License-Identifier: MIT
//! Collision-free path segments derived from identifiers

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("Invalid friendly name regex"));

/// Issues alphanumeric names, unique within one instance
#[derive(Debug, Default, Clone)]
pub struct FriendlyNamer {
    issued: HashSet<String>,
}

impl FriendlyNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// `http://example.com/AAS-a` becomes `http___example_com_AAS_a`; a
    /// repeated result gets the smallest free `_N` suffix
    pub fn name(&mut self, identifier: &str) -> String {
        let base = NON_ALPHANUMERIC.replace_all(identifier, "_").into_owned();
        let mut candidate = base.clone();
        let mut counter = 1;
        while self.issued.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.issued.insert(candidate.clone());
        candidate
    }
}
