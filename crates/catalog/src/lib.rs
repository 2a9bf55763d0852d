//! Corridor/Currency Catalog (spec §4.A): immutable, process-lifetime ISO
//! lookup tables with no I/O after load, built once the way
//! `contracts::alloy::DEPLOYMENT_INFO` builds its static deployment table.

use std::{
    collections::{HashMap, HashSet},
    sync::LazyLock,
};

use quote_model::ErrorKind;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Country {
    pub iso2: &'static str,
    pub iso3: &'static str,
    pub default_currency: &'static str,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Currency {
    pub iso4217: &'static str,
}

#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct CatalogError {
    pub kind: ErrorKind,
    pub message: String,
}

impl CatalogError {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::InvalidParameter,
            message: message.into(),
        }
    }
}

/// (iso2, iso3, default currency) — a representative set of corridors
/// remittance providers actually serve, not an exhaustive ISO-3166 table.
const COUNTRIES: &[(&str, &str, &str)] = &[
    ("US", "USA", "USD"),
    ("MX", "MEX", "MXN"),
    ("GB", "GBR", "GBP"),
    ("IN", "IND", "INR"),
    ("PH", "PHL", "PHP"),
    ("NG", "NGA", "NGN"),
    ("FR", "FRA", "EUR"),
    ("DE", "DEU", "EUR"),
    ("ES", "ESP", "EUR"),
    ("CA", "CAN", "CAD"),
    ("AU", "AUS", "AUD"),
    ("PK", "PAK", "PKR"),
    ("BD", "BGD", "BDT"),
    ("KE", "KEN", "KES"),
    ("GH", "GHA", "GHS"),
    ("CO", "COL", "COP"),
    ("BR", "BRA", "BRL"),
    ("CN", "CHN", "CNY"),
    ("JP", "JPN", "JPY"),
    ("KR", "KOR", "KRW"),
    ("VN", "VNM", "VND"),
    ("ID", "IDN", "IDR"),
    ("AE", "ARE", "AED"),
    ("ZA", "ZAF", "ZAR"),
];

/// ISO-4217 codes recognized by the catalog, beyond what's already a
/// country's default currency above (kept distinct so a currency can be
/// valid without being any single country's *default*, e.g. USD used
/// across many corridors as a settlement currency).
const EXTRA_CURRENCIES: &[&str] = &["USD", "EUR"];

static COUNTRIES_BY_ISO2: LazyLock<HashMap<&'static str, Country>> = LazyLock::new(|| {
    COUNTRIES
        .iter()
        .map(|(iso2, iso3, currency)| {
            (
                *iso2,
                Country {
                    iso2,
                    iso3,
                    default_currency: currency,
                },
            )
        })
        .collect()
});

static VALID_CURRENCIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    COUNTRIES
        .iter()
        .map(|(_, _, currency)| *currency)
        .chain(EXTRA_CURRENCIES.iter().copied())
        .collect()
});

static COUNTRIES_BY_CURRENCY: LazyLock<HashMap<&'static str, Vec<&'static str>>> =
    LazyLock::new(|| {
        let mut map: HashMap<&'static str, Vec<&'static str>> = HashMap::new();
        for (iso2, _, currency) in COUNTRIES {
            map.entry(currency).or_default().push(iso2);
        }
        map
    });

/// Pure lookup surface over the static tables above. Cheap to construct
/// (holds no owned data); callers are free to keep one around for the
/// process lifetime or build one per use.
#[derive(Clone, Copy, Debug, Default)]
pub struct Catalog;

impl Catalog {
    pub fn new() -> Self {
        Self
    }

    pub fn is_valid_iso_country(&self, code: &str) -> bool {
        COUNTRIES_BY_ISO2.contains_key(code.to_ascii_uppercase().as_str())
    }

    pub fn is_valid_iso_currency(&self, code: &str) -> bool {
        VALID_CURRENCIES.contains(code.to_ascii_uppercase().as_str())
    }

    pub fn default_currency(&self, country: &str) -> Result<&'static str, CatalogError> {
        let country = country.to_ascii_uppercase();
        COUNTRIES_BY_ISO2
            .get(country.as_str())
            .map(|c| c.default_currency)
            .ok_or_else(|| CatalogError::invalid(format!("unknown country {country}")))
    }

    pub fn country(&self, iso2: &str) -> Result<Country, CatalogError> {
        let code = iso2.to_ascii_uppercase();
        COUNTRIES_BY_ISO2
            .get(code.as_str())
            .copied()
            .ok_or_else(|| CatalogError::invalid(format!("unknown country {code}")))
    }

    pub fn country_for_currency(&self, currency: &str) -> Vec<&'static str> {
        COUNTRIES_BY_CURRENCY
            .get(currency.to_ascii_uppercase().as_str())
            .cloned()
            .unwrap_or_default()
    }

    pub fn all_countries(&self) -> impl Iterator<Item = Country> + 'static {
        COUNTRIES_BY_ISO2.values().copied()
    }

    pub fn all_currencies(&self) -> impl Iterator<Item = &'static str> + 'static {
        VALID_CURRENCIES.iter().copied()
    }

    /// Amounts smaller than this scale are not meaningful for the currency
    /// (spec §4.D): JPY/KRW/VND/IDR have no minor unit in everyday
    /// remittance pricing.
    pub fn decimal_places(&self, currency: &str) -> u32 {
        match currency.to_ascii_uppercase().as_str() {
            "JPY" | "KRW" | "VND" | "IDR" => 0,
            _ => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_known_country_and_currency() {
        let catalog = Catalog::new();
        assert!(catalog.is_valid_iso_country("us"));
        assert!(catalog.is_valid_iso_currency("usd"));
        assert_eq!(catalog.default_currency("MX").unwrap(), "MXN");
    }

    #[test]
    fn rejects_unknown_country() {
        let catalog = Catalog::new();
        assert!(!catalog.is_valid_iso_country("ZZ"));
        assert!(catalog.country("ZZ").is_err());
    }

    #[test]
    fn looks_up_countries_sharing_a_currency() {
        let catalog = Catalog::new();
        let mut countries = catalog.country_for_currency("EUR");
        countries.sort_unstable();
        assert_eq!(countries, vec!["DE", "ES", "FR"]);
    }

    #[test]
    fn zero_decimal_currencies_match_spec_table() {
        let catalog = Catalog::new();
        assert_eq!(catalog.decimal_places("JPY"), 0);
        assert_eq!(catalog.decimal_places("USD"), 2);
    }
}
