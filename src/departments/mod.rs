// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Department processing stages.
//!
//! Every department shares the same contract: the pipeline consumer marks the
//! package's current department as handled, then hands the package to the
//! department's [`Department::process`] for its own side effects. Departments
//! must tolerate seeing the same package more than once.

use async_trait::async_trait;

use crate::errors::PipelineError;
use crate::model::Package;

mod factory;
mod handling;
mod insurance;

pub use factory::DepartmentFactory;
pub use handling::HandlingDepartment;
pub use insurance::InsuranceDepartment;

#[async_trait]
pub trait Department: Send + Sync {
    /// Apply this department's side effects to a package whose route has
    /// already moved past this department.
    async fn process(&self, package: &mut Package) -> Result<(), PipelineError>;

    /// Tag naming this department in the rule-book and in stream names.
    fn tag(&self) -> &'static str;
}

/// UTC timestamp used in metadata notes.
pub(crate) fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
