//! Shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a hostname.
    #[error("shop domain contains invalid character {0:?}")]
    InvalidCharacter(char),
    /// The input has no dot, so it cannot be a storefront hostname.
    #[error("shop domain must be a fully qualified hostname")]
    NotQualified,
}

/// A storefront domain such as `my-store.myshopify.com`.
///
/// Parsing trims surrounding whitespace and lowercases the input, so two
/// spellings of the same shop compare equal.
///
/// ## Constraints
///
/// - Length: 1-255 characters
/// - Characters: `a-z`, `0-9`, `-` and `.`
/// - Must contain at least one dot, not at either end
///
/// ## Examples
///
/// ```
/// use shopify_app_core::ShopDomain;
///
/// let shop = ShopDomain::parse(" My-Store.myshopify.com ").unwrap();
/// assert_eq!(shop.as_str(), "my-store.myshopify.com");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("localhost").is_err());
/// assert!(ShopDomain::parse("evil.com/path").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname.
    pub const MAX_LENGTH: usize = 255;

    /// Parse a `ShopDomain` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than 255
    /// characters, contains a non-hostname character, or is not dotted.
    pub fn parse(s: &str) -> Result<Self, ShopDomainError> {
        let normalized = s.trim().to_ascii_lowercase();

        if normalized.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if normalized.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if let Some(c) = normalized
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        if !normalized.contains('.') || normalized.starts_with('.') || normalized.ends_with('.') {
            return Err(ShopDomainError::NotQualified);
        }

        Ok(Self(normalized))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `ShopDomain` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ShopDomain> for String {
    fn from(domain: ShopDomain) -> Self {
        domain.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for ShopDomain {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for ShopDomain {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for ShopDomain {
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
    fn test_parse_valid_domains() {
        assert!(ShopDomain::parse("my-store.myshopify.com").is_ok());
        assert!(ShopDomain::parse("shop1.example.co.uk").is_ok());
        assert!(ShopDomain::parse("a.b").is_ok());
    }

    #[test]
    fn test_parse_normalizes() {
        let shop = ShopDomain::parse("  Store.MyShopify.com\n").unwrap();
        assert_eq!(shop.as_str(), "store.myshopify.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(ShopDomain::parse("   "), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}.myshopify.com", "a".repeat(250));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_url_characters() {
        assert_eq!(
            ShopDomain::parse("https://store.myshopify.com"),
            Err(ShopDomainError::InvalidCharacter(':'))
        );
        assert_eq!(
            ShopDomain::parse("store.myshopify.com?x=1"),
            Err(ShopDomainError::InvalidCharacter('?'))
        );
    }

    #[test]
    fn test_parse_not_qualified() {
        assert_eq!(
            ShopDomain::parse("localhost"),
            Err(ShopDomainError::NotQualified)
        );
        assert_eq!(
            ShopDomain::parse(".myshopify.com"),
            Err(ShopDomainError::NotQualified)
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let shop: ShopDomain = serde_json::from_str("\"Store.myshopify.com\"").unwrap();
        assert_eq!(shop.as_str(), "store.myshopify.com");
        assert!(serde_json::from_str::<ShopDomain>("\"not a shop\"").is_err());
    }

    #[test]
    fn test_serialize_as_string() {
        let shop = ShopDomain::parse("store.myshopify.com").unwrap();
        assert_eq!(
            serde_json::to_string(&shop).unwrap(),
            "\"store.myshopify.com\""
        );
    }
}
