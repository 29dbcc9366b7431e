// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The active rule set and its hot reload.
//!
//! Readers take a snapshot (`Arc<RuleSet>`) and evaluate against it; the
//! reload path parses the new text completely before a single pointer swap,
//! so an evaluation sees either the old set or the new one, never a mix.
//! A failed parse leaves the active set untouched.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use arc_swap::ArcSwap;
use tokio_util::sync::CancellationToken;

use crate::errors::RuleBookError;
use crate::model::Parcel;
use crate::observability::messages::rules::*;
use crate::observability::messages::StructuredLog;
use crate::rules::{DepartmentSet, RuleSet};

pub struct RuleBook {
    path: PathBuf,
    active: ArcSwap<RuleSet>,
    last_error: Mutex<Option<String>>,
}

type Fingerprint = (Option<SystemTime>, u64);

impl RuleBook {
    /// Read and parse the rule-book at `path`. Fails if the file is missing
    /// or does not parse.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let path = path.as_ref().to_path_buf();
        let rules = read_rule_set(&path).await?;

        RulesLoaded {
            path: &path.display().to_string(),
            rule_count: rules.len(),
            department_count: rules.groups().len(),
        }
        .log();

        Ok(Self::with_rules(path, rules))
    }

    /// Build a rule-book around an already parsed set.
    pub fn with_rules(path: impl Into<PathBuf>, rules: RuleSet) -> Self {
        Self {
            path: path.into(),
            active: ArcSwap::from_pointee(rules),
            last_error: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The currently active rule set.
    pub fn snapshot(&self) -> Arc<RuleSet> {
        self.active.load_full()
    }

    /// Evaluate the active rule set against `parcel`.
    pub fn departments(&self, parcel: &Parcel) -> DepartmentSet {
        self.active.load().departments(parcel)
    }

    /// The error of the most recent failed reload, cleared by a successful one.
    pub fn last_reload_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Re-read the file and swap in its rules if they parse.
    pub async fn reload(&self) -> Result<Arc<RuleSet>, RuleBookError> {
        let path = self.path.display().to_string();

        match read_rule_set(&self.path).await {
            Ok(rules) => Ok(self.install(&path, rules)),
            Err(err) => {
                RulesReloadRejected {
                    path: &path,
                    error: &err,
                }
                .log();
                self.set_last_error(Some(err.to_string()));
                Err(err)
            }
        }
    }

    /// Replace the rule-book text, as an editor would.
    ///
    /// The text is parsed first; on failure nothing is written and the
    /// structured parse error is returned to the caller.
    pub async fn replace_text(&self, text: &str) -> Result<Arc<RuleSet>, RuleBookError> {
        let rules = RuleSet::parse(text)?;

        tokio::fs::write(&self.path, text)
            .await
            .map_err(|source| RuleBookError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        Ok(self.install(&self.path.display().to_string(), rules))
    }

    /// Poll the file every `interval` and reload whenever its modification
    /// time or length changes. Runs until `cancel` fires.
    pub async fn watch(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        let path = self.path.display().to_string();
        let mut seen = self.fingerprint().await;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        RuleBookWatchStarted {
            path: &path,
            interval,
        }
        .log();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let current = self.fingerprint().await;
            if current == seen {
                continue;
            }
            seen = current;

            // Errors are logged and kept for the editor by reload().
            let _ = self.reload().await;
        }
    }

    fn install(&self, path: &str, rules: RuleSet) -> Arc<RuleSet> {
        let rules = Arc::new(rules);
        self.active.store(Arc::clone(&rules));
        self.set_last_error(None);

        RulesReloaded {
            path,
            rule_count: rules.len(),
            department_count: rules.groups().len(),
        }
        .log();

        rules
    }

    fn set_last_error(&self, error: Option<String>) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = error;
    }

    async fn fingerprint(&self) -> Option<Fingerprint> {
        tokio::fs::metadata(&self.path)
            .await
            .ok()
            .map(|meta| (meta.modified().ok(), meta.len()))
    }
}

async fn read_rule_set(path: &Path) -> Result<RuleSet, RuleBookError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RuleBookError::Io {
            path: path.display().to_string(),
            source,
        })?;
    Ok(RuleSet::parse(&text)?)
}
