//! Price rules.
//!
//! Prices are whole currency units. The server always computes the price; the
//! client only picks the options.

use common::Money;
use serde::{Deserialize, Serialize};

use crate::order::Tier;

const MEMBER_RATE_PERCENT: i64 = 70;
const EXPRESS_SURCHARGE: i64 = 50;
const NEAR_DISTANCE_KM: f64 = 5.0;
const NEAR_SURCHARGE: i64 = 20;
const FAR_DISTANCE_KM: f64 = 15.0;
const FAR_SURCHARGE: i64 = 40;
const PROMO_CODE: &str = "PROMO10";
const PROMO_DISCOUNT: i64 = 10;

/// Optional extras chosen at booking time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceOptions {
    pub express: bool,
    pub distance_km: Option<f64>,
    pub promo_code: Option<String>,
}

/// Base price of a tier before any discount.
pub fn base_rate(tier: Tier) -> Money {
    Money::from_major(match tier {
        Tier::Small => 200,
        Tier::Medium => 300,
        Tier::Large => 400,
    })
}

/// Computes the price a customer pays for a tier with the given options.
///
/// Members pay 70% of the base, rounded to whole units. Surcharges and the
/// promo discount are applied on top; the result never drops below zero.
pub fn compute_price(tier: Tier, is_member: bool, options: &PriceOptions) -> Money {
    let base = base_rate(tier).major();
    let mut major = if is_member {
        (base * MEMBER_RATE_PERCENT + 50) / 100
    } else {
        base
    };

    if options.express {
        major += EXPRESS_SURCHARGE;
    }
    if let Some(km) = options.distance_km {
        if km > FAR_DISTANCE_KM {
            major += FAR_SURCHARGE;
        } else if km > NEAR_DISTANCE_KM {
            major += NEAR_SURCHARGE;
        }
    }
    if options
        .promo_code
        .as_deref()
        .is_some_and(|code| code.trim().eq_ignore_ascii_case(PROMO_CODE))
    {
        major -= PROMO_DISCOUNT;
    }

    Money::from_major(major).floor_zero()
}

/// Maps a measured weight to a tier.
pub fn tier_for_weight(weight_kg: f64) -> Tier {
    if weight_kg <= 5.0 {
        Tier::Small
    } else if weight_kg <= 15.0 {
        Tier::Medium
    } else {
        Tier::Large
    }
}
