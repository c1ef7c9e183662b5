//! Validated, normalized email addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an email address failed to parse.
#[derive(thiserror::Error, Debug, Clone)]
pub enum EmailError {
    /// Nothing left after trimming.
    #[error("email is empty")]
    Empty,
    /// Longer than the RFC 5321 limit of 254 characters.
    #[error("email is {0} characters, the maximum is 254")]
    TooLong(usize),
    /// Structurally not an address.
    #[error("malformed email: {0}")]
    Malformed(&'static str),
}

/// A customer or admin email address.
///
/// Parsing trims surrounding whitespace and lowercases the address, so two
/// spellings of the same mailbox compare equal and a single unique index on
/// the column is enough. Validation is structural only: something before an
/// `@`, something after it, no embedded whitespace, at most 254 characters.
/// Deliverability is the mail server's problem.
///
/// ```
/// use roastline_core::Email;
///
/// let email = Email::parse(" Roaster@Example.COM ")?;
/// assert_eq!(email.as_str(), "roaster@example.com");
///
/// assert!(Email::parse("not-an-address").is_err());
/// assert!(Email::parse("@example.com").is_err());
/// # Ok::<(), roastline_core::EmailError>(())
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

/// RFC 5321 maximum address length.
const MAX_LEN: usize = 254;

impl Email {
    /// Parse and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] when the trimmed input is empty, over 254
    /// characters, missing either side of the `@`, or contains whitespace.
    pub fn parse(input: &str) -> Result<Self, EmailError> {
        let trimmed = input.trim();

        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > MAX_LEN {
            return Err(EmailError::TooLong(trimmed.len()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::Malformed("contains whitespace"));
        }

        match trimmed.split_once('@') {
            None => Err(EmailError::Malformed("missing @")),
            Some(("", _)) => Err(EmailError::Malformed("nothing before the @")),
            Some((_, "")) => Err(EmailError::Malformed("nothing after the @")),
            Some((_, _)) => Ok(Self(trimmed.to_lowercase())),
        }
    }

    /// The normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Stored as TEXT. Rows were written through parse(), so decoding takes the
// stored value as-is.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <String as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_shapes() {
        for input in [
            "user@example.com",
            "user.name@example.com",
            "user+tag@example.com",
            "user@subdomain.example.co.uk",
            "a@b.c",
        ] {
            assert!(Email::parse(input).is_ok(), "rejected {input}");
        }
    }

    #[test]
    fn test_normalizes_case_and_whitespace() {
        let email = Email::parse("  Roaster@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "roaster@example.com");
        assert_eq!(email, Email::parse("roaster@example.com").unwrap());
    }

    #[test]
    fn test_rejects_empty_and_blank() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
        assert!(matches!(Email::parse("   "), Err(EmailError::Empty)));
    }

    #[test]
    fn test_rejects_overlong() {
        let input = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(Email::parse(&input), Err(EmailError::TooLong(262))));
    }

    #[test]
    fn test_rejects_malformed() {
        for input in ["no-at-symbol", "@example.com", "user@", "two words@example.com"] {
            assert!(
                matches!(Email::parse(input), Err(EmailError::Malformed(_))),
                "accepted {input}"
            );
        }
    }

    #[test]
    fn test_display_and_from_str() {
        let email: Email = "user@example.com".parse().unwrap();
        assert_eq!(email.to_string(), "user@example.com");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"user@example.com\"");

        let parsed: Email = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(parsed, email);
    }
}
