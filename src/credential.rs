//! Credential codec: reversible transform between a mailbox address and an
//! opaque password token.
//!
//! The token is the address XORed with a repeating secret and rendered as
//! lowercase hex. Decoding inverts the transform exactly, so the service
//! never has to store credentials. A display variant groups the hex in
//! blocks of four uppercase characters for readability; `decode` accepts
//! either form.

use crate::{Result, TempboxError};

/// Encode a mailbox address into a hex password token.
///
/// Returns an error when the secret is empty, since XOR with an empty key
/// would leave the address in the clear.
pub fn encode(address: &str, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(TempboxError::Validation(
            "credential secret must not be empty".to_string(),
        ));
    }

    let key = secret.as_bytes();
    let mut out = String::with_capacity(address.len() * 2);
    for (i, byte) in address.bytes().enumerate() {
        let mixed = byte ^ key[i % key.len()];
        out.push_str(&format!("{mixed:02x}"));
    }
    Ok(out)
}

/// Decode a password token back into the mailbox address it encodes.
///
/// Accepts raw hex or the display form produced by [`format_token`]
/// (dashes and uppercase are normalized away). Any input that is not valid
/// hex of even length, or that decodes to a non-UTF-8 or non-address
/// string, yields a `Validation` error.
pub fn decode(token: &str, secret: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(TempboxError::Validation(
            "credential secret must not be empty".to_string(),
        ));
    }

    let normalized: String = token
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if normalized.is_empty() || normalized.len() % 2 != 0 {
        return Err(TempboxError::Validation(
            "invalid credential".to_string(),
        ));
    }

    let key = secret.as_bytes();
    let mut bytes = Vec::with_capacity(normalized.len() / 2);
    for (i, chunk) in normalized.as_bytes().chunks(2).enumerate() {
        let pair = std::str::from_utf8(chunk)
            .ok()
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .ok_or_else(|| TempboxError::Validation("invalid credential".to_string()))?;
        bytes.push(pair ^ key[i % key.len()]);
    }

    let address = String::from_utf8(bytes)
        .map_err(|_| TempboxError::Validation("invalid credential".to_string()))?;

    if !is_valid_address(&address) {
        return Err(TempboxError::Validation(
            "invalid credential".to_string(),
        ));
    }

    Ok(address)
}

/// Render a token in display form: uppercase, dash every four characters.
pub fn format_token(token: &str) -> String {
    let upper = token.to_ascii_uppercase();
    let mut out = String::with_capacity(upper.len() + upper.len() / 4);
    for (i, c) in upper.chars().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push('-');
        }
        out.push(c);
    }
    out
}

/// Minimal shape check for a decoded mailbox address: printable ASCII with
/// exactly one `@` separating two non-empty parts.
pub fn is_valid_address(address: &str) -> bool {
    if !address
        .bytes()
        .all(|b| (0x21..=0x7e).contains(&b))
    {
        return false;
    }
    let mut parts = address.splitn(2, '@');
    match (parts.next(), parts.next()) {
        (Some(local), Some(domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        _ => false,
    }
}
