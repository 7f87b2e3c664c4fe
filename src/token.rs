// src/token.rs
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt::Write;

pub const TOKEN_BYTES: usize = 16;

// 128 bits from the OS CSPRNG. Collisions are treated as negligible; there
// is no lookup-and-retry against the registry.
pub fn issue_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    let mut token = String::with_capacity(TOKEN_BYTES * 2);
    for byte in bytes {
        write!(&mut token, "{:02x}", byte).unwrap();
    }
    token
}
