//! Tier and price precedence.
//!
//! Tier: unit (row/table/object) -> section/ring -> descriptor default -> policy default.
//! Price: unit -> section/ring -> descriptor default -> policy price for the
//! resolved tier -> policy default. Non-finite or negative prices never win.

use crate::models::layout::LayoutDefaults;
use crate::models::PricingPolicy;

use super::labels::given;

pub(crate) struct Resolver<'a> {
    defaults: &'a LayoutDefaults,
    policy: &'a PricingPolicy,
}

impl<'a> Resolver<'a> {
    pub fn new(defaults: &'a LayoutDefaults, policy: &'a PricingPolicy) -> Self {
        Self { defaults, policy }
    }

    pub fn tier(&self, unit: Option<&str>, section: Option<&str>) -> String {
        given(unit)
            .or_else(|| given(section))
            .or_else(|| given(self.defaults.default_tier.as_deref()))
            .or_else(|| given(Some(self.policy.default_tier.as_str())))
            .unwrap_or(PricingPolicy::GLOBAL_DEFAULT_TIER)
            .to_string()
    }

    pub fn price(&self, unit: Option<f64>, section: Option<f64>, tier: &str) -> f64 {
        usable(unit)
            .or_else(|| usable(section))
            .or_else(|| usable(self.defaults.default_price))
            .or_else(|| usable(self.policy.tier_prices.get(tier).copied()))
            .or_else(|| usable(Some(self.policy.default_price)))
            .unwrap_or(0.0)
    }
}

fn usable(price: Option<f64>) -> Option<f64> {
    price.filter(|p| p.is_finite() && *p >= 0.0)
}
