//! Cart items.
//!
//! The gateway shows at most two cart lines to the customer. Their order is
//! significant: it is part of the signed request.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::ValidationError;
use crate::text;

/// Maximum number of items in a single payment.
pub const MAX_CART_ITEMS: usize = 2;

const NAME_MAX_LEN: usize = 20;
const DESCRIPTION_MAX_LEN: usize = 40;

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItem {
    name: String,
    quantity: u32,
    amount: i64,
    description: String,
}

impl CartItem {
    /// Creates a cart line.
    ///
    /// `amount` is the total price of the line in hundredths of the currency
    /// unit. It is rounded half away from zero, so `10.5` becomes `11`. The
    /// name is shortened to 20 characters and the description to 40.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidQuantity`] if `quantity` is zero.
    pub fn new(
        name: &str,
        quantity: u32,
        amount: Decimal,
        description: &str,
    ) -> Result<Self, ValidationError> {
        if quantity < 1 {
            return Err(ValidationError::InvalidQuantity(quantity));
        }
        Ok(Self {
            name: text::shorten(name, NAME_MAX_LEN),
            quantity,
            amount: round_amount(amount),
            description: text::shorten(description, DESCRIPTION_MAX_LEN),
        })
    }

    /// Name shown to the customer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantity of the line.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Total price of the line in hundredths of the currency unit.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.amount
    }

    /// Auxiliary description, empty if none was given.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Rounds to whole hundredths, half away from zero. Out-of-range amounts
/// saturate.
fn round_amount(amount: Decimal) -> i64 {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_i64().unwrap_or(if rounded.is_sign_negative() {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Sum of the line amounts.
#[must_use]
pub fn total_amount(items: &[CartItem]) -> i64 {
    items
        .iter()
        .fold(0, |sum, item| sum.saturating_add(item.amount))
}
