use serde::{Deserialize, Serialize};

/// Closed set of payment methods (spec §6). `Unknown` is the adapter's
/// fallback when a provider reports something outside this set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankAccount,
    DebitCard,
    CreditCard,
    Balance,
    OpenBanking,
    Card,
    Cash,
    MobileWallet,
    Unknown,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Closed set of delivery methods (spec §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    BankDeposit,
    CashPickup,
    MobileWallet,
    DebitCardDeposit,
    HomeDelivery,
    Unknown,
}

impl Default for DeliveryMethod {
    fn default() -> Self {
        Self::Unknown
    }
}
