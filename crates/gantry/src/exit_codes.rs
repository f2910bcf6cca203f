//! Exit codes for the CLI

/// Success
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// Fatal stage or configuration failure
pub const ERROR: i32 = 1;
