// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use av_transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Key material unavailable: {0}")]
    Unavailable(String),
}

impl KeyError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        KeyError::Unavailable(reason.into())
    }
}
