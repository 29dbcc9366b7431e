// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The routing pipeline: the router turning raw parcels into routed packages,
//! and the per-department consumer moving packages along their route.

mod consumer;
mod router;

#[cfg(test)]
mod integration_tests;

pub use consumer::PipelineConsumer;
pub use router::Router;
