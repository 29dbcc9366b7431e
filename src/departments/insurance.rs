// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;

use crate::audit::{self, AuditLog};
use crate::departments::{timestamp, Department};
use crate::errors::PipelineError;
use crate::model::Package;

const TAG: &str = "Insurance";

/// Signs off high-value parcels before they continue to handling.
pub struct InsuranceDepartment {
    audit: Arc<dyn AuditLog>,
}

impl InsuranceDepartment {
    pub fn new(audit: Arc<dyn AuditLog>) -> Self {
        Self { audit }
    }
}

#[async_trait]
impl Department for InsuranceDepartment {
    async fn process(&self, package: &mut Package) -> Result<(), PipelineError> {
        package.append_metadata(format!(
            "Signed by the insurance department at {}",
            timestamp()
        ));

        let payload = package.to_payload()?;
        audit::record(self.audit.as_ref(), TAG, &payload).await;
        Ok(())
    }

    fn tag(&self) -> &'static str {
        TAG
    }
}
