// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod fixtures;
pub mod relayer;
pub mod signers;
pub mod transport;

pub use relayer::MockRelayer;
pub use signers::{PendingSigner, RejectingSigner};
pub use transport::{HttpMethod, MockTransport, RecordedRequest};
