// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::helpers::Context;
use anyhow::Result;
use av_keys::KeyProvisioner;
use serde_json::json;

pub async fn execute(context: &Context) -> Result<()> {
    let mode = context.client.mode();
    let provisioner = KeyProvisioner::for_network(
        context.transport.clone(),
        context.coprocessor.fixture().clone(),
        &context.network,
    );
    let material = provisioner.fetch_key_material(mode).await?;

    let summary = json!({
        "network": context.network.name,
        "mode": mode,
        "publicKeyId": material.public_key_id,
        "publicKeyBytes": material.public_key.len(),
        "publicParamsId": material.public_params_id,
        "publicParamsBytes": material.public_params.len(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
