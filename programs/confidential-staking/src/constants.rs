/// Ciphertext type tag stored in the last byte of a handle.
pub const TYPE_BOOL: u8 = 0x00;
pub const TYPE_U64: u8 = 0x05;

/// BLAKE3 derive-key contexts.
pub const HANDLE_DOMAIN: &str = "confidential-staking 2024 ciphertext handle";
pub const INPUT_PROOF_DOMAIN: &str = "confidential-staking 2024 input proof key";

/// Default lifetime of an operator approval on the reference token.
pub const DEFAULT_OPERATOR_WINDOW_SECS: i64 = 3600;
