fn plausible_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' '
}

/// Cheap sanity check on a decryption: right length, only letters, digits
/// and spaces. Garbage can still pass.
pub fn is_plausible(text: &str, expected_len: usize) -> bool {
    text.chars().count() == expected_len && text.chars().all(plausible_char)
}
