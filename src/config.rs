// SPDX-License-Identifier: MIT
//! Environment configuration for the codecs and the package writer

use std::str::FromStr;

use crate::codec::{DecodeOptions, DocumentFormat, DuplicatePolicy, Mode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    pub failsafe: bool,
    pub stripped: bool,
    pub duplicate_policy: DuplicatePolicy,
    /// Format of document parts written into packages
    pub document_format: DocumentFormat,
    pub split_submodels: bool,
    /// Variables that were set but could not be parsed
    invalid: Vec<String>,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            failsafe: true,
            stripped: false,
            duplicate_policy: DuplicatePolicy::Skip,
            document_format: DocumentFormat::Json,
            split_submodels: true,
            invalid: Vec::new(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl CodecConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset variables keep their
    /// defaults, unparseable ones are reported by [`validate`](Self::validate)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let mut invalid = Vec::new();

        let mut read_bool = |key: &str, target: &mut bool| {
            if let Some(value) = lookup(key) {
                match parse_bool(&value) {
                    Some(parsed) => *target = parsed,
                    None => invalid.push(format!("{} must be a boolean, got {:?}", key, value)),
                }
            }
        };
        read_bool("AAS_FAILSAFE", &mut config.failsafe);
        read_bool("AAS_STRIPPED", &mut config.stripped);
        read_bool("AAS_SPLIT_SUBMODELS", &mut config.split_submodels);

        if let Some(value) = lookup("AAS_DUPLICATE_POLICY") {
            match DuplicatePolicy::from_str(&value) {
                Ok(policy) => config.duplicate_policy = policy,
                Err(e) => invalid.push(format!("AAS_DUPLICATE_POLICY: {}", e)),
            }
        }
        if let Some(value) = lookup("AAS_DOCUMENT_FORMAT") {
            match DocumentFormat::from_str(&value) {
                Ok(format) => config.document_format = format,
                Err(e) => invalid.push(format!("AAS_DOCUMENT_FORMAT: {}", e)),
            }
        }

        config.invalid = invalid;
        config
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if let Some(problem) = self.invalid.first() {
            return Err(problem.clone());
        }
        Ok(())
    }

    pub fn decode_options(&self) -> DecodeOptions {
        let options = if self.failsafe {
            DecodeOptions::failsafe()
        } else {
            DecodeOptions::strict()
        };
        options
            .with_stripped(self.stripped)
            .with_duplicate_policy(self.duplicate_policy)
    }

    pub fn mode(&self) -> Mode {
        self.decode_options().mode
    }
}
