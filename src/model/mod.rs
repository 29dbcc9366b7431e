// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Data carried through the pipeline: the immutable [`Parcel`] and the
//! in-flight [`Package`] that wraps it with a route and a metadata trail.

mod package;
mod parcel;
mod raw;

pub use package::Package;
pub use parcel::{Address, Parcel, Recipient};
pub use raw::parse_raw_parcel;
