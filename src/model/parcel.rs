// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub house_number: i32,
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub address: Address,
}

/// A parcel as delivered by the ingestion endpoint.
///
/// Parcels are values: once constructed they are only ever read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Parcel {
    pub recipient: Recipient,
    pub weight: f64,
    pub value: f64,
}

impl Parcel {
    pub fn new(recipient: Recipient, weight: f64, value: f64) -> Self {
        Self {
            recipient,
            weight,
            value,
        }
    }
}
