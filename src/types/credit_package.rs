/// A purchasable credit bundle. Static client-side configuration, not
/// persisted state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CreditPackage {
    /// Price in cents.
    pub amount_cents: i64,

    /// Credits granted by the purchase.
    pub credits: i64,

    /// Short marketing description.
    pub description: &'static str,

    /// Highlighted as the recommended option.
    pub popular: bool,
}

impl CreditPackage {
    /// The price formatted as dollars, e.g. `$15.00`.
    pub fn price_display(&self) -> String {
        format!("${:.2}", self.amount_cents as f64 / 100.0)
    }
}

/// The fixed package catalog offered to every account.
pub const PACKAGES: &[CreditPackage] = &[
    CreditPackage {
        amount_cents: 500,
        credits: 50,
        description: "Perfect for getting started",
        popular: false,
    },
    CreditPackage {
        amount_cents: 1500,
        credits: 120,
        description: "Great value for regular users",
        popular: true,
    },
    CreditPackage {
        amount_cents: 2500,
        credits: 260,
        description: "Best value for power users",
        popular: false,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_three_tiers() {
        assert_eq!(PACKAGES.len(), 3);
        assert_eq!(PACKAGES.iter().filter(|p| p.popular).count(), 1);
    }

    #[test]
    fn price_display() {
        assert_eq!(PACKAGES[0].price_display(), "$5.00");
        assert_eq!(PACKAGES[2].price_display(), "$25.00");
    }
}
