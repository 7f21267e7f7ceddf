//! Variant Keys

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::ProductId;

/// Placeholder used for an absent size or color.
pub const DEFAULT_VARIANT: &str = "default";

/// Identity of a cart line: product, size and color.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VariantKey(String);

impl VariantKey {
    /// Derives the key for a product in the given size and color.
    pub fn new(product_id: &ProductId, size: Option<&str>, color: Option<&str>) -> Self {
        Self(format!(
            "{product_id}-{}-{}",
            size.unwrap_or(DEFAULT_VARIANT),
            color.unwrap_or(DEFAULT_VARIANT)
        ))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VariantKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_attributes_use_default() {
        let key = VariantKey::new(&ProductId::numeric(7), None, None);

        assert_eq!(key.as_str(), "7-default-default");
    }

    #[test]
    fn size_and_color_are_part_of_the_key() {
        let medium = VariantKey::new(&ProductId::numeric(7), Some("M"), Some("Black"));
        let large = VariantKey::new(&ProductId::numeric(7), Some("L"), Some("Black"));

        assert_eq!(medium.as_str(), "7-M-Black");
        assert_ne!(medium, large);
    }
}
