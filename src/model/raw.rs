// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decoding of raw parcel records written to the entry stream.
//!
//! The ingestion endpoint dispatches one `<Parcel>` XML element per entry.
//! JSON objects with the [`Parcel`] field names are accepted as well.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;

use crate::errors::PipelineError;
use crate::model::{Address, Parcel, Recipient};

const PARCEL_ROOT: &str = "Parcel";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlAddress {
    #[serde(rename = "Street")]
    street: String,
    #[serde(rename = "HouseNumber")]
    house_number: i32,
    #[serde(rename = "PostalCode")]
    postal_code: String,
    #[serde(rename = "City")]
    city: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct XmlRecipient {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Address")]
    address: XmlAddress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename = "Parcel")]
struct XmlParcel {
    #[serde(rename = "Receipient", alias = "Recipient")]
    recipient: XmlRecipient,
    #[serde(rename = "Weight")]
    weight: f64,
    #[serde(rename = "Value")]
    value: f64,
}

impl From<XmlParcel> for Parcel {
    fn from(raw: XmlParcel) -> Self {
        Parcel {
            recipient: Recipient {
                name: raw.recipient.name,
                address: Address {
                    street: raw.recipient.address.street,
                    house_number: raw.recipient.address.house_number,
                    postal_code: raw.recipient.address.postal_code,
                    city: raw.recipient.address.city,
                },
            },
            weight: raw.weight,
            value: raw.value,
        }
    }
}

/// Decode a raw parcel record, XML or JSON, from the entry stream.
///
/// XML records must have a `<Parcel>` root. Weight and value must be finite
/// so the package built from the parcel survives its JSON round trip.
pub fn parse_raw_parcel(payload: &str) -> Result<Parcel, PipelineError> {
    let trimmed = payload.trim_start();

    let parcel: Parcel = match trimmed.chars().next() {
        Some('<') => {
            expect_parcel_root(trimmed)?;
            quick_xml::de::from_str::<XmlParcel>(trimmed)
                .map(Parcel::from)
                .map_err(|e| PipelineError::RawParcel(e.to_string()))?
        }
        Some('{') => {
            serde_json::from_str(trimmed).map_err(|e| PipelineError::RawParcel(e.to_string()))?
        }
        _ => {
            return Err(PipelineError::RawParcel(
                "payload is neither an XML element nor a JSON object".to_string(),
            ))
        }
    };

    if !parcel.weight.is_finite() || !parcel.value.is_finite() {
        return Err(PipelineError::RawParcel(format!(
            "weight and value must be finite, got weight={} value={}",
            parcel.weight, parcel.value
        )));
    }

    Ok(parcel)
}

fn expect_parcel_root(xml: &str) -> Result<(), PipelineError> {
    let mut reader = Reader::from_str(xml);

    loop {
        match reader.read_event() {
            Ok(Event::Start(element)) | Ok(Event::Empty(element)) => {
                let name = element.local_name();
                return if name.as_ref() == PARCEL_ROOT.as_bytes() {
                    Ok(())
                } else {
                    Err(PipelineError::RawParcel(format!(
                        "expected <{}> root element, found <{}>",
                        PARCEL_ROOT,
                        String::from_utf8_lossy(name.as_ref())
                    )))
                };
            }
            Ok(Event::Eof) => {
                return Err(PipelineError::RawParcel(
                    "XML payload has no root element".to_string(),
                ))
            }
            Ok(_) => {}
            Err(e) => return Err(PipelineError::RawParcel(e.to_string())),
        }
    }
}
