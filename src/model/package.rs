// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::errors::PipelineError;
use crate::model::Parcel;

/// The unit of work threaded through the department chain.
///
/// The route only ever shrinks from the front and the metadata trail only
/// ever grows at the back; neither can be rewritten through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    id: String,
    parcel: Parcel,
    departments: VecDeque<String>,
    #[serde(default)]
    metadata: Vec<String>,
}

impl Package {
    /// Build a fresh package routed through `departments` in the given order.
    pub fn new<I, S>(parcel: Parcel, departments: I) -> Result<Self, PipelineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let departments: VecDeque<String> = departments.into_iter().map(Into::into).collect();

        if departments.is_empty() {
            return Err(PipelineError::EmptyRoute);
        }
        if departments.iter().any(|tag| tag.trim().is_empty()) {
            return Err(PipelineError::BlankDepartment);
        }

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            parcel,
            departments,
            metadata: Vec::new(),
        })
    }

    /// Decode a package from its stream payload.
    pub fn from_payload(payload: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Encode the package for a stream entry.
    pub fn to_payload(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parcel(&self) -> &Parcel {
        &self.parcel
    }

    /// Remaining departments, front first.
    pub fn departments(&self) -> &VecDeque<String> {
        &self.departments
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// The department the package should visit next, if any.
    pub fn next_department(&self) -> Option<&str> {
        self.departments.front().map(String::as_str)
    }

    /// Mark the front department as handled. A no-op once the route is empty.
    pub fn complete_current(&mut self) -> Option<String> {
        self.departments.pop_front()
    }

    pub fn append_metadata(&mut self, entry: impl Into<String>) {
        self.metadata.push(entry.into());
    }

    pub fn is_terminal(&self) -> bool {
        self.departments.is_empty()
    }
}
