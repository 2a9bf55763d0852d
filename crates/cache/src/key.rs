//! Cache key construction (spec §4.G). Amounts are expressed in integer
//! micro-units so that `1000` and `1000.00` (differing only by how the
//! caller formatted the decimal) produce the same quote key.

pub fn quote_key(
    source_country: &str,
    dest_country: &str,
    source_currency: &str,
    dest_currency: &str,
    amount_micros: i128,
) -> String {
    format!(
        "v1:fee:{}:{}:{}:{}:{}",
        source_country.to_ascii_uppercase(),
        dest_country.to_ascii_uppercase(),
        source_currency.to_ascii_uppercase(),
        dest_currency.to_ascii_uppercase(),
        amount_micros
    )
}

pub fn corridor_key(source_country: &str, dest_country: &str) -> String {
    format!(
        "corridor:{}:{}",
        source_country.to_ascii_uppercase(),
        dest_country.to_ascii_uppercase()
    )
}

pub fn provider_key(provider_id: &str) -> String {
    format!("provider:{provider_id}")
}

/// The corridor prefix shared by every quote key for a given corridor,
/// used by `invalidate_corridor` (spec §4.G) to sweep matching entries.
pub fn quote_corridor_prefix(source_country: &str, dest_country: &str) -> String {
    format!(
        "v1:fee:{}:{}:",
        source_country.to_ascii_uppercase(),
        dest_country.to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_zero_amounts_share_a_key_once_scaled_to_micros() {
        // 1000 and 1000.00 both scale to the same micro-unit integer
        // before reaching `quote_key`; this test documents the contract
        // the caller (the coordinator, via `QuoteRequest::amount_micros`)
        // relies on.
        let a = quote_key("US", "MX", "USD", "MXN", 1_000_000_000);
        let b = quote_key("us", "mx", "usd", "mxn", 1_000_000_000);
        assert_eq!(a, b);
    }

    #[test]
    fn corridor_prefix_matches_its_own_quote_keys() {
        let prefix = quote_corridor_prefix("US", "MX");
        let key = quote_key("US", "MX", "USD", "MXN", 1_000_000_000);
        assert!(key.starts_with(&prefix));
    }
}
