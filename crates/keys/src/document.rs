// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Wire shapes of the key distribution service. Everything is optional on
//! the way in and validated into descriptors before any bytes are fetched.

use crate::{KeyError, KeyMaterial};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
pub struct KeyUrlDocument {
    response: Option<KeyUrlResponse>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyUrlResponse {
    #[serde(default)]
    fhe_key_info: Vec<FheKeyInfo>,
    #[serde(default)]
    crs: HashMap<String, DataDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
struct FheKeyInfo {
    fhe_public_key: Option<DataDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
struct DataDescriptor {
    data_id: Option<String>,
    #[serde(default)]
    urls: Vec<String>,
}

/// A downloadable blob: its id and the url to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobDescriptor {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDescriptors {
    pub public_key: BlobDescriptor,
    pub public_params: BlobDescriptor,
}

impl DataDescriptor {
    fn validate(&self, what: &str) -> Result<BlobDescriptor, KeyError> {
        let id = self
            .data_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| KeyError::unavailable(format!("{what} id missing")))?;
        let url = self
            .urls
            .first()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| KeyError::unavailable(format!("{what} url missing")))?;
        Ok(BlobDescriptor {
            id: id.to_string(),
            url: url.clone(),
        })
    }
}

impl KeyUrlDocument {
    pub fn from_value(value: Value) -> Result<Self, KeyError> {
        serde_json::from_value(value)
            .map_err(|e| KeyError::unavailable(format!("malformed key url document: {e}")))
    }

    /// Checks both descriptors are complete for `params_class`.
    pub fn descriptors(&self, params_class: &str) -> Result<KeyDescriptors, KeyError> {
        let response = self
            .response
            .as_ref()
            .ok_or_else(|| KeyError::unavailable("missing key urls"))?;

        let public_key = response
            .fhe_key_info
            .first()
            .and_then(|info| info.fhe_public_key.as_ref())
            .ok_or_else(|| KeyError::unavailable("public key descriptor missing"))?
            .validate("public key")?;

        let public_params = response
            .crs
            .get(params_class)
            .ok_or_else(|| {
                KeyError::unavailable(format!("public params descriptor {params_class} missing"))
            })?
            .validate("public params")?;

        Ok(KeyDescriptors {
            public_key,
            public_params,
        })
    }
}

/// Flattened key payload served by the relayer key proxy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayerKeysPayload {
    pub public_key_id: Option<String>,
    #[serde(rename = "publicKeyB64")]
    pub public_key_b64: Option<String>,
    pub public_params_id: Option<String>,
    #[serde(rename = "publicParams2048B64")]
    pub public_params_b64: Option<String>,
}

impl RelayerKeysPayload {
    pub fn from_value(value: Value) -> Result<Self, KeyError> {
        serde_json::from_value(value)
            .map_err(|e| KeyError::unavailable(format!("malformed relayer keys payload: {e}")))
    }

    pub fn into_key_material(self) -> Result<KeyMaterial, KeyError> {
        fn field(value: Option<String>, name: &str) -> Result<String, KeyError> {
            value
                .filter(|v| !v.is_empty())
                .ok_or_else(|| KeyError::unavailable(format!("{name} missing")))
        }
        fn decode(value: String, name: &str) -> Result<Vec<u8>, KeyError> {
            STANDARD
                .decode(value)
                .map_err(|e| KeyError::unavailable(format!("{name} is not base64: {e}")))
        }

        Ok(KeyMaterial {
            public_key_id: field(self.public_key_id, "publicKeyId")?,
            public_key: decode(field(self.public_key_b64, "publicKeyB64")?, "publicKeyB64")?,
            public_params_id: field(self.public_params_id, "publicParamsId")?,
            public_params: decode(
                field(self.public_params_b64, "publicParams2048B64")?,
                "publicParams2048B64",
            )?,
        })
    }
}

impl From<&KeyMaterial> for RelayerKeysPayload {
    fn from(material: &KeyMaterial) -> Self {
        Self {
            public_key_id: Some(material.public_key_id.clone()),
            public_key_b64: Some(STANDARD.encode(&material.public_key)),
            public_params_id: Some(material.public_params_id.clone()),
            public_params_b64: Some(STANDARD.encode(&material.public_params)),
        }
    }
}
