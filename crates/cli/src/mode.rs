// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use av_client::select_mode;

pub fn execute(chain_id: u64) {
    println!("{}", select_mode(chain_id));
}
