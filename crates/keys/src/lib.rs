// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod document;
mod error;
mod material;
mod provisioner;

pub use document::RelayerKeysPayload;
pub use error::KeyError;
pub use material::KeyMaterial;
pub use provisioner::{fetch_from_keyurl, fetch_from_proxy, KeyProvisioner, LiveKeySource};
