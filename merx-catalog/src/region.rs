use std::collections::{HashMap, HashSet};

/// Which currencies a market accepts. Built once from configuration at
/// startup and passed around as an immutable value; there is no process-wide
/// mutable table behind this.
#[derive(Debug, Clone)]
pub struct RegionCurrencyMap {
    entries: HashMap<String, HashSet<String>>,
}

impl RegionCurrencyMap {
    pub fn new<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, C)>,
        C: IntoIterator<Item = String>,
    {
        let entries = entries
            .into_iter()
            .map(|(region, currencies)| {
                (
                    region.trim().to_uppercase(),
                    currencies
                        .into_iter()
                        .map(|c| c.trim().to_uppercase())
                        .collect(),
                )
            })
            .collect();
        Self { entries }
    }

    /// The shipped market table, used when configuration does not override it.
    pub fn builtin() -> Self {
        let apac = [
            "SGD", "JPY", "AUD", "HKD", "CNY", "KRW", "THB", "MYR", "IDR", "PHP", "VND", "INR",
        ];
        let table: [(&str, &[&str]); 10] = [
            ("EU", &["EUR"]),
            ("EUROPE", &["EUR"]),
            ("US", &["USD"]),
            ("USA", &["USD"]),
            ("UNITED STATES", &["USD"]),
            ("APAC", &apac),
            ("ASIA", &apac),
            ("LATAM", &["USD", "BRL", "MXN", "ARS", "CLP", "COP", "PEN"]),
            ("AFRICA", &["USD", "EUR", "ZAR", "NGN", "EGP", "KES", "GHS"]),
            (
                "MIDDLE EAST",
                &["USD", "EUR", "AED", "SAR", "QAR", "KWD", "BHD", "OMR"],
            ),
        ];
        Self::new(
            table
                .into_iter()
                .map(|(r, cs)| (r.to_string(), cs.iter().map(|c| c.to_string()))),
        )
    }

    pub fn is_valid(&self, region: &str, currency: &str) -> bool {
        self.currencies_for(region)
            .map(|currencies| currencies.contains(&currency.trim().to_uppercase()))
            .unwrap_or(false)
    }

    pub fn currencies_for(&self, region: &str) -> Option<&HashSet<String>> {
        self.entries.get(&region.trim().to_uppercase())
    }

    pub fn supported_regions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
