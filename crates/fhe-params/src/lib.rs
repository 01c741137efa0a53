// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Preset definitions and encoding for the BFV parameters that protect vote lanes.

pub mod builder;
pub mod constants;
pub mod encoding;
pub mod presets;

pub use builder::{build_bfv_params_arc, build_bfv_params_from_set_arc, BuildError};
pub use constants::LANE_MAX;
pub use encoding::{decode_bfv_params_arc, encode_bfv_params, EncodingError};
pub use presets::{BfvParamSet, LanePreset, PresetError};
