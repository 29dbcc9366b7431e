// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod audit;          // audit-log sink
pub mod config;         // YAML config + constants
pub mod departments;    // department processing stages
pub mod errors;         // error handling
pub mod model;          // parcels and packages
pub mod observability;
pub mod pipeline;       // router + per-department consumer
pub mod queue;          // stream transport
pub mod rules;          // routing DSL + hot reload
