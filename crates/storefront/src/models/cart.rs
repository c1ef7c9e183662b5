//! Session cart model.
//!
//! The cart is a plain value serialized into the session. All mutation
//! rules live here so they can be tested without HTTP or a database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use roastline_core::{Price, TasteProfile};

/// One cart line: a blend customization at a captured unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// The blend being ordered.
    pub profile: TasteProfile,
    /// Number of bags.
    pub quantity: u32,
    /// Unit price captured when the line was created.
    pub unit_price: Price,
}

impl CartLine {
    /// Quantity times the captured unit price.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.line_total(self.quantity)
    }
}

/// The session cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// Add a blend to the cart.
    ///
    /// If an existing line holds a field-identical profile the quantities
    /// merge into that line; otherwise a new line is appended with the
    /// given unit price. Returns the index of the affected line.
    pub fn add(&mut self, profile: TasteProfile, quantity: u32, unit_price: Price) -> usize {
        if let Some((index, line)) = self
            .lines
            .iter_mut()
            .enumerate()
            .find(|(_, line)| line.profile == profile)
        {
            line.quantity = line.quantity.saturating_add(quantity);
            return index;
        }

        self.lines.push(CartLine {
            profile,
            quantity,
            unit_price,
        });
        self.lines.len() - 1
    }

    /// Set a line's quantity. Quantity 0 removes the line.
    ///
    /// Returns `false` if the index is out of range.
    pub fn set_quantity(&mut self, index: usize, quantity: u32) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        if quantity == 0 {
            self.lines.remove(index);
        } else if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity;
        }
        true
    }

    /// Remove a line by index. Returns `false` if the index is out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        true
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of bags across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines
            .iter()
            .map(|line| line.line_total().amount)
            .sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use roastline_core::{CurrencyCode, GrindType, RoastLevel, TasteScore};

    use super::*;

    fn profile(bitterness: u8, flavour: &str) -> TasteProfile {
        TasteProfile {
            bitterness: TasteScore::new(bitterness).unwrap(),
            acidity: TasteScore::new(3).unwrap(),
            body: TasteScore::new(3).unwrap(),
            flavour: flavour.to_owned(),
            roast_level: RoastLevel::Medium,
            grind_type: GrindType::WholeBean,
        }
    }

    fn unit_price() -> Price {
        Price::new(Decimal::new(1450, 2), CurrencyCode::USD)
    }

    #[test]
    fn test_adding_identical_profiles_merges_into_one_line() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 1, unit_price());
        cart.add(profile(3, "fruity"), 1, unit_price());

        assert_eq!(cart.lines.len(), 1);
        let line = cart.lines.first().unwrap();
        assert_eq!(line.quantity, 2);
        assert_eq!(line.line_total().amount, Decimal::new(2900, 2));
    }

    #[test]
    fn test_adding_different_profile_appends_line() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 1, unit_price());
        cart.add(profile(4, "fruity"), 1, unit_price());
        cart.add(profile(3, "nutty"), 1, unit_price());

        assert_eq!(cart.lines.len(), 3);
        assert!(cart.lines.iter().all(|line| line.quantity == 1));
    }

    #[test]
    fn test_merge_keeps_original_unit_price() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 1, unit_price());

        // Pricing changed between adds; the existing line keeps its price
        let newer = Price::new(Decimal::new(1600, 2), CurrencyCode::USD);
        let index = cart.add(profile(3, "fruity"), 2, newer);

        assert_eq!(index, 0);
        let line = cart.lines.first().unwrap();
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price, unit_price());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 2, unit_price());

        assert!(cart.set_quantity(0, 0));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_out_of_range() {
        let mut cart = Cart::default();
        assert!(!cart.set_quantity(0, 1));

        cart.add(profile(3, "fruity"), 1, unit_price());
        assert!(!cart.set_quantity(5, 1));
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 1, unit_price());
        cart.add(profile(4, "nutty"), 1, unit_price());

        assert!(cart.remove(0));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines.first().unwrap().profile, profile(4, "nutty"));
        assert!(!cart.remove(7));
    }

    #[test]
    fn test_item_count_and_subtotal() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 2, unit_price());
        cart.add(profile(5, "smoky"), 1, unit_price());

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.subtotal(), Decimal::new(4350, 2));
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::default();
        cart.add(profile(3, "fruity"), 2, unit_price());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_cart_session_roundtrip() {
        let mut cart = Cart::default();
        cart.add(profile(2, "chocolatey"), 2, unit_price());

        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }
}
