use std::fmt;

/// Number of digits in a CPF.
pub const CPF_LEN: usize = 11;

/// A Brazilian taxpayer identifier, held as its 11 bare digits.
///
/// Parsing accepts either the bare digits (`12345678901`) or the punctuated
/// display form (`123.456.789-01`). `Display` always prints the punctuated form,
/// while [`Cpf::as_str`] returns the digits as they are stored in the database.
///
/// Only the shape is checked; check digits are not verified.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cpf(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CPF must contain exactly {} digits", CPF_LEN)]
pub struct InvalidCpf;

impl Cpf {
    pub fn parse(input: &str) -> Result<Self, InvalidCpf> {
        let input = input.trim();

        if input.len() == CPF_LEN && input.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Self(input.to_string()));
        }

        // ddd.ddd.ddd-dd
        let bytes = input.as_bytes();
        let punctuated = bytes.len() == CPF_LEN + 3
            && bytes[3] == b'.'
            && bytes[7] == b'.'
            && bytes[11] == b'-'
            && bytes
                .iter()
                .enumerate()
                .filter(|(i, _)| !matches!(i, 3 | 7 | 11))
                .all(|(_, b)| b.is_ascii_digit());

        if punctuated {
            let digits = input.chars().filter(char::is_ascii_digit).collect();
            return Ok(Self(digits));
        }

        Err(InvalidCpf)
    }

    /// The bare 11 digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cpf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.0;
        write!(f, "{}.{}.{}-{}", &d[0..3], &d[3..6], &d[6..9], &d[9..11])
    }
}

/// Format a raw CPF for display, e.g. `12345678901` becomes `123.456.789-01`.
///
/// Input that is not a CPF comes back unchanged, so this is safe to use on
/// whatever a client put in a URL.
pub fn format_cpf(raw: &str) -> String {
    match Cpf::parse(raw) {
        Ok(cpf) => cpf.to_string(),
        Err(_) => raw.to_string(),
    }
}
