// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::{self, AuditLog};
use crate::departments::{timestamp, Department};
use crate::errors::PipelineError;
use crate::model::Package;

/// A department whose only work is to note that it handled the package.
///
/// Mail, Regular and Heavy differ only in their tag and the note they write.
pub struct HandlingDepartment {
    tag: &'static str,
    note: &'static str,
    audit: Arc<dyn AuditLog>,
}

impl HandlingDepartment {
    pub fn new(tag: &'static str, note: &'static str, audit: Arc<dyn AuditLog>) -> Self {
        Self { tag, note, audit }
    }

    pub fn mail(audit: Arc<dyn AuditLog>) -> Self {
        Self::new("Mail", "Handled by the mail department", audit)
    }

    pub fn regular(audit: Arc<dyn AuditLog>) -> Self {
        Self::new("Regular", "Handled by the regular department", audit)
    }

    pub fn heavy(audit: Arc<dyn AuditLog>) -> Self {
        Self::new("Heavy", "Handled by the heavy department", audit)
    }
}

#[async_trait]
impl Department for HandlingDepartment {
    async fn process(&self, package: &mut Package) -> Result<(), PipelineError> {
        package.append_metadata(format!("{} at {}", self.note, timestamp()));

        let payload = package.to_payload()?;
        audit::record(self.audit.as_ref(), self.tag, &payload).await;
        Ok(())
    }

    fn tag(&self) -> &'static str {
        self.tag
    }
}
