//! Database identity of an installed shop.

use serde::{Deserialize, Serialize};

/// Primary key of a row in `shops`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
pub struct ShopId(i32);

impl ShopId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for ShopId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ShopId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shop_id_conversions() {
        let id = ShopId::new(42);
        assert_eq!(id.as_i32(), 42);
        assert_eq!(ShopId::from(42), id);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_shop_id_serializes_transparently() {
        let json = serde_json::to_string(&ShopId::new(7)).unwrap();
        assert_eq!(json, "7");
        let parsed: ShopId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, ShopId::new(7));
    }
}
