//! Value Objects for the cart domain

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Session owner. Unauthenticated sessions share the `guest` partition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub const GUEST: &'static str = "guest";

    pub fn new(value: impl Into<String>) -> Self { Self(value.into()) }
    pub fn guest() -> Self { Self(Self::GUEST.to_string()) }

    /// Identity provider contract: an authenticated uid, or the guest sentinel.
    pub fn from_session(uid: Option<&str>) -> Self {
        match uid.map(str::trim) {
            Some(uid) if !uid.is_empty() => Self::new(uid),
            _ => Self::guest(),
        }
    }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_guest(&self) -> bool { self.0 == Self::GUEST }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Rupiah amount
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self { Self(amount) }
    pub fn from_rupiah(amount: i64) -> Self { Self(Decimal::from(amount)) }
    pub fn amount(&self) -> Decimal { self.0 }

    /// Saturates at the `Decimal` bounds instead of overflowing.
    pub fn add(&self, other: &Money) -> Money {
        Money(self.0.checked_add(other.0).unwrap_or_else(|| Self::bound(self.0)))
    }

    pub fn multiply(&self, qty: u32) -> Money {
        Money(self.0.checked_mul(Decimal::from(qty)).unwrap_or_else(|| Self::bound(self.0)))
    }

    fn bound(sign_of: Decimal) -> Decimal {
        if sign_of.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self { iter.fold(Money::ZERO, |acc, m| acc.add(&m)) }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.0.normalize();
        let sign = if amount.is_sign_negative() { "-" } else { "" };
        let abs = amount.abs();
        let whole = abs.trunc().to_string();
        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 { grouped.push('.'); }
            grouped.push(ch);
        }
        let fract = abs.fract();
        if fract.is_zero() {
            write!(f, "{sign}Rp {grouped}")
        } else {
            let digits = fract.to_string();
            write!(f, "{sign}Rp {grouped},{}", digits.trim_start_matches("0."))
        }
    }
}

/// Quantity of one cart line; never below one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> Option<Self> { (value >= 1).then_some(Self(value)) }

    /// Maps a requested quantity from the +/- controls. `None` means the line must go.
    pub fn from_requested(value: i64) -> Option<Self> {
        if value <= 0 { None } else { Some(Self(u32::try_from(value).unwrap_or(u32::MAX))) }
    }

    pub fn value(&self) -> u32 { self.0 }
}

/// The fixed set of manual payment methods offered at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    BankBca,
    BankMandiri,
    BankBri,
    BankBni,
    GoPay,
    Ovo,
    Dana,
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 8] = [
        Self::BankBca, Self::BankMandiri, Self::BankBri, Self::BankBni,
        Self::GoPay, Self::Ovo, Self::Dana, Self::CashOnDelivery,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BankBca => "Transfer Bank BCA",
            Self::BankMandiri => "Transfer Bank Mandiri",
            Self::BankBri => "Transfer Bank BRI",
            Self::BankBni => "Transfer Bank BNI",
            Self::GoPay => "E-Wallet (GoPay)",
            Self::Ovo => "E-Wallet (OVO)",
            Self::Dana => "E-Wallet (Dana)",
            Self::CashOnDelivery => "COD (Cash on Delivery)",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::BankBca => "BCA",
            Self::BankMandiri => "MANDIRI",
            Self::BankBri => "BRI",
            Self::BankBni => "BNI",
            Self::GoPay => "GOPAY",
            Self::Ovo => "OVO",
            Self::Dana => "DANA",
            Self::CashOnDelivery => "COD",
        }
    }

    /// Accepts either the display label or the short code, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, PaymentMethodError> {
        let value = value.trim();
        if value.is_empty() { return Err(PaymentMethodError::Empty); }
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(value) || m.code().eq_ignore_ascii_case(value))
            .ok_or_else(|| PaymentMethodError::Unknown(value.to_string()))
    }

    /// Manual payment steps shown before the buyer confirms they have paid.
    pub fn instructions(&self) -> &'static str {
        match self {
            Self::BankBca => "1. Transfer to BCA account 1234567890\n2. Account name: UMKM Connect\n3. Amount: the order total\n4. Send the transfer receipt via WhatsApp",
            Self::BankMandiri => "1. Transfer to Mandiri account 9876543210\n2. Account name: UMKM Connect\n3. Amount: the order total\n4. Send the transfer receipt via WhatsApp",
            Self::GoPay => "1. Open the Gojek app\n2. Choose GoPay\n3. Transfer to 081234567890\n4. Amount: the order total",
            Self::Ovo => "1. Open the OVO app\n2. Choose Transfer\n3. Transfer to 081234567890\n4. Amount: the order total",
            Self::CashOnDelivery => "1. Prepare cash for the order total\n2. Pay when the goods arrive\n3. Have exact change ready if possible",
            Self::BankBri | Self::BankBni | Self::Dana => "Complete the payment with the selected method, then confirm your payment.",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PaymentMethodError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self { value.label().to_string() }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum PaymentMethodError { Empty, Unknown(String) }
impl std::error::Error for PaymentMethodError {}
impl fmt::Display for PaymentMethodError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "payment method missing"),
            Self::Unknown(v) => write!(f, "unknown payment method '{v}'"),
        }
    }
}
