//! Constants for vote lane presets
//!
//! Every lane carries one 32 bit unsigned count, so the plaintext modulus of
//! each preset must exceed `2^32` with enough headroom for aggregation.

/// Insecure preset constants (degree 512) - DO NOT USE IN PRODUCTION
pub mod insecure_512 {
    pub const DEGREE: usize = 512;
    pub const PLAINTEXT_MODULUS: u64 = 0xffffee001;
    pub const MODULI: &[u64] = &[0x7fffffffe0001];
    pub const VARIANCE: usize = 3;
}

/// Secure preset constants (degree 8192)
pub mod secure_8192 {
    pub const DEGREE: usize = 8192;
    pub const PLAINTEXT_MODULUS: u64 = 18014398509481984;
    pub const MODULI: &[u64] = &[0x0100000002a20001, 0x0100000001760001];
    pub const VARIANCE: usize = 10;
}

/// Largest value a single lane may hold.
pub const LANE_MAX: u64 = u32::MAX as u64;

/// Default values for BFV parameters
pub mod defaults {
    /// Variance (and error1 variance) used by fhe.rs when none is set.
    pub const VARIANCE: usize = 10;
    pub const ERROR1_VARIANCE: u32 = 10;
}
