pub mod claims;
pub mod policies;
pub mod ratings;
pub mod testimonials;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

/// Keeps only ASCII digits, the form the client table stores national ids in.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
