// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::audit::AuditLog;
use crate::departments::*;
use crate::errors::PipelineError;

/// Creates department implementations from their rule-book tag.
pub struct DepartmentFactory;

impl DepartmentFactory {
    /// Create the department registered under `tag`.
    ///
    /// Tags are matched exactly, as they appear in the rule-book and in
    /// stream names:
    /// - "Mail", "Regular", "Heavy" -> HandlingDepartment
    /// - "Insurance" -> InsuranceDepartment
    pub fn create(tag: &str, audit: Arc<dyn AuditLog>) -> Result<Arc<dyn Department>, PipelineError> {
        match tag {
            "Mail" => Ok(Arc::new(HandlingDepartment::mail(audit))),
            "Regular" => Ok(Arc::new(HandlingDepartment::regular(audit))),
            "Heavy" => Ok(Arc::new(HandlingDepartment::heavy(audit))),
            "Insurance" => Ok(Arc::new(InsuranceDepartment::new(audit))),
            _ => Err(PipelineError::UnknownDepartment(tag.to_string())),
        }
    }

    /// Tags of every department implementation.
    pub fn list_available_departments() -> Vec<&'static str> {
        vec!["Mail", "Regular", "Heavy", "Insurance"]
    }

    pub fn is_department_available(tag: &str) -> bool {
        Self::list_available_departments().contains(&tag)
    }
}
