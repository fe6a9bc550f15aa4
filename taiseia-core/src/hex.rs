//! Comma-separated hex byte lists
//!
//! The operator console and the logs both use the `06,04,80,00,01,83` form.

use crate::error::{TaiseiaError, TaiseiaResult};

/// Parse a comma-separated list of hex bytes
///
/// Tokens are trimmed and may carry an optional `0x` prefix. Any token that is
/// not a valid byte fails the whole list.
pub fn parse_hex_list(s: &str) -> TaiseiaResult<Vec<u8>> {
    s.split(',')
        .map(|token| {
            let token = token.trim();
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            if digits.is_empty() || digits.len() > 2 {
                return Err(TaiseiaError::Format(format!(
                    "'{}' is not a hex byte",
                    token
                )));
            }
            u8::from_str_radix(digits, 16)
                .map_err(|e| TaiseiaError::Format(format!("'{}' is not a hex byte: {}", token, e)))
        })
        .collect()
}

/// Render bytes as a lower-case comma-separated hex list
pub fn to_hex_list(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(",")
}
