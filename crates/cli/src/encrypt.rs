// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::Context;
use alloy::primitives::Address;
use anyhow::Result;

pub async fn execute(
    context: &Context,
    contract: Address,
    user: Address,
    vector: &[u64],
) -> Result<()> {
    let bundle = context.client.build_cipher(contract, user, vector).await?;
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}
