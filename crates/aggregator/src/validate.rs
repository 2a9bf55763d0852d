//! Request validation (spec §4.H step 1): the only point at which the
//! aggregate call itself reports `success=false` (spec §7 policy).

use catalog::Catalog;
use quote_model::QuoteRequest;
use rust_decimal::Decimal;

pub fn validate(catalog: &Catalog, request: &QuoteRequest, max_amount: Decimal) -> Result<(), String> {
    if !catalog.is_valid_iso_country(&request.source_country) {
        return Err(format!("invalid source_country {:?}", request.source_country));
    }
    if !catalog.is_valid_iso_country(&request.dest_country) {
        return Err(format!("invalid dest_country {:?}", request.dest_country));
    }
    if !catalog.is_valid_iso_currency(&request.source_currency) {
        return Err(format!("invalid source_currency {:?}", request.source_currency));
    }
    if let Some(dest_currency) = &request.dest_currency {
        if !catalog.is_valid_iso_currency(dest_currency) {
            return Err(format!("invalid dest_currency {dest_currency:?}"));
        }
    } else if catalog.default_currency(&request.dest_country).is_err() {
        return Err(format!(
            "dest_currency omitted and {:?} has no default currency",
            request.dest_country
        ));
    }
    if request.amount.is_sign_negative() || request.amount.is_zero() {
        return Err(format!("amount must be positive, got {}", request.amount));
    }
    if request.amount > max_amount {
        return Err(format!("amount {} exceeds the configured cap {max_amount}", request.amount));
    }
    Ok(())
}
