//! Order lifecycle, payment state and user roles.
//!
//! [`OrderStatus`] is the only authority on which status changes are legal.
//! Both the admin screens and the status callback go through
//! [`OrderStatus::transition`], so the list of statuses is never repeated
//! elsewhere.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Implements text-column `sqlx` support via `as_str`/`FromStr`.
macro_rules! text_column {
    ($name:ident) => {
        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(s.parse::<Self>()?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Error for a string that names no known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
///
/// ```text
/// pending -> verified -> production -> shipping -> delivered -> completed
///    \          \
///     +----------+--> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, waiting for the booking amount.
    #[default]
    Pending,
    /// Booking amount received and the order confirmed.
    Verified,
    /// Garments are being printed.
    Production,
    /// Handed to the courier.
    Shipping,
    /// Received by the customer.
    Delivered,
    /// Closed out; nothing further happens.
    Completed,
    /// Abandoned before production started.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 7] = [
        Self::Pending,
        Self::Verified,
        Self::Production,
        Self::Shipping,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Wire and column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Production => "production",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Statuses reachable in one step from `self`.
    #[must_use]
    pub const fn next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Verified, Self::Cancelled],
            Self::Verified => &[Self::Production, Self::Cancelled],
            Self::Production => &[Self::Shipping],
            Self::Shipping => &[Self::Delivered],
            Self::Delivered => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Whether no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.next_states().is_empty()
    }

    /// Whether `self -> to` is a legal single step.
    #[must_use]
    pub fn can_transition_to(self, to: Self) -> bool {
        self.next_states().contains(&to)
    }

    /// Validate `self -> to`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Illegal`] if the step is not in the lifecycle.
    pub fn transition(self, to: Self) -> Result<Self, TransitionError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(TransitionError::Illegal { from: self, to })
        }
    }

    /// Validate `self -> to` for an order with the given amounts.
    ///
    /// Verification additionally requires the booking amount to be collected.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Illegal`] for steps outside the lifecycle
    /// and [`TransitionError::BookingUnpaid`] when verifying too early.
    pub fn transition_with_payment(
        self,
        to: Self,
        paid_amount: Decimal,
        booking_amount: Decimal,
    ) -> Result<Self, TransitionError> {
        let next = self.transition(to)?;
        if next == Self::Verified && paid_amount < booking_amount {
            return Err(TransitionError::BookingUnpaid {
                required: booking_amount,
                paid: paid_amount,
            });
        }
        Ok(next)
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "order status",
                value: s.to_owned(),
            })
    }
}

text_column!(OrderStatus);

/// A rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The step is not part of the lifecycle.
    #[error("cannot move an order from {from} to {to}")]
    Illegal {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },
    /// Verification requested before the booking amount was collected.
    #[error("booking amount {required} not collected (paid {paid})")]
    BookingUnpaid {
        /// Booking amount on the order.
        required: Decimal,
        /// Amount collected so far.
        paid: Decimal,
    },
}

// =============================================================================
// Payment Status
// =============================================================================

/// Collection state of an order, derived from its amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing collected.
    #[default]
    Unpaid,
    /// Something collected, but less than the booking amount.
    PartiallyPaid,
    /// At least the booking amount collected.
    BookingPaid,
    /// Fully paid.
    Paid,
}

impl PaymentStatus {
    /// Every payment status.
    pub const ALL: [Self; 4] = [
        Self::Unpaid,
        Self::PartiallyPaid,
        Self::BookingPaid,
        Self::Paid,
    ];

    /// Wire and column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::PartiallyPaid => "partially_paid",
            Self::BookingPaid => "booking_paid",
            Self::Paid => "paid",
        }
    }

    /// Derive the status from collected, booking and total amounts.
    #[must_use]
    pub fn derive(paid: Decimal, booking: Decimal, total: Decimal) -> Self {
        if paid <= Decimal::ZERO {
            Self::Unpaid
        } else if paid >= total {
            Self::Paid
        } else if paid >= booking {
            Self::BookingPaid
        } else {
            Self::PartiallyPaid
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "payment status",
                value: s.to_owned(),
            })
    }
}

text_column!(PaymentStatus);

// =============================================================================
// Roles
// =============================================================================

/// A role row in `user_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Back-office access.
    Admin,
    /// Regular shopper.
    Customer,
}

impl Role {
    /// Wire and column representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(UnknownVariant {
                kind: "role",
                value: s.to_owned(),
            }),
        }
    }
}

text_column!(Role);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    #[test]
    fn test_happy_path_is_legal() {
        let mut status = OrderStatus::Pending;
        for next in [
            OrderStatus::Verified,
            OrderStatus::Production,
            OrderStatus::Shipping,
            OrderStatus::Delivered,
            OrderStatus::Completed,
        ] {
            status = status.transition(next).unwrap();
        }
        assert!(status.is_terminal());
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipping));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Production));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert_eq!(
            OrderStatus::Shipping.transition(OrderStatus::Cancelled),
            Err(TransitionError::Illegal {
                from: OrderStatus::Shipping,
                to: OrderStatus::Cancelled
            })
        );
    }

    #[test]
    fn test_terminal_states_accept_nothing() {
        for terminal in [OrderStatus::Completed, OrderStatus::Cancelled] {
            assert!(terminal.is_terminal());
            for to in OrderStatus::ALL {
                assert!(terminal.transition(to).is_err());
            }
        }
    }

    #[test]
    fn test_cancel_only_before_production() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Verified.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Production.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_verification_needs_booking() {
        let err = OrderStatus::Pending
            .transition_with_payment(OrderStatus::Verified, dec(100), dec(500))
            .unwrap_err();
        assert!(matches!(err, TransitionError::BookingUnpaid { .. }));

        let ok = OrderStatus::Pending.transition_with_payment(
            OrderStatus::Verified,
            dec(500),
            dec(500),
        );
        assert_eq!(ok, Ok(OrderStatus::Verified));

        // Cancelling never needs money.
        assert!(
            OrderStatus::Pending
                .transition_with_payment(OrderStatus::Cancelled, dec(0), dec(500))
                .is_ok()
        );
    }

    #[test]
    fn test_status_strings_roundtrip() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        for status in PaymentStatus::ALL {
            assert_eq!(status.as_str().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_matches_column_strings() {
        let json = serde_json::to_string(&OrderStatus::Production).unwrap();
        assert_eq!(json, "\"production\"");
        let json = serde_json::to_string(&PaymentStatus::BookingPaid).unwrap();
        assert_eq!(json, "\"booking_paid\"");
    }

    #[test]
    fn test_payment_status_derivation() {
        let total = dec(90_000);
        let booking = dec(45_000);
        assert_eq!(
            PaymentStatus::derive(dec(0), booking, total),
            PaymentStatus::Unpaid
        );
        assert_eq!(
            PaymentStatus::derive(dec(10_000), booking, total),
            PaymentStatus::PartiallyPaid
        );
        assert_eq!(
            PaymentStatus::derive(dec(45_000), booking, total),
            PaymentStatus::BookingPaid
        );
        assert_eq!(
            PaymentStatus::derive(dec(90_000), booking, total),
            PaymentStatus::Paid
        );
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }
}
