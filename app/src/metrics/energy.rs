use std::collections::HashMap;

use super::energy_table::LANGUAGE_ENERGY_JOULES;

/// Byte-weighted average of the per-language energy constants, rounded to
/// two decimals. Languages absent from the constant table contribute zero
/// to the sum but their bytes still count toward the total, so unknown
/// languages dilute the average rather than dropping out of it.
pub fn weighted_energy(language_usage: &HashMap<String, u64>) -> f64 {
    weighted_energy_with(language_usage, LANGUAGE_ENERGY_JOULES)
}

pub(crate) fn weighted_energy_with(
    language_usage: &HashMap<String, u64>,
    table: &[(&str, f64)],
) -> f64 {
    let total_bytes: u64 = language_usage.values().sum();
    if total_bytes == 0 {
        return 0.0;
    }

    let mut weighted_joules = 0.0;
    for (lang, bytes) in language_usage {
        let weight = *bytes as f64 / total_bytes as f64;
        if let Some((_, energy)) = table.iter().find(|(name, _)| name == lang) {
            weighted_joules += weight * energy;
        }
    }

    (weighted_joules * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries
            .iter()
            .map(|(lang, bytes)| (lang.to_string(), *bytes))
            .collect()
    }

    #[test]
    fn weights_by_byte_share() {
        let table = &[("JavaScript", 1.5), ("Python", 2.0)];
        let result = weighted_energy_with(&usage(&[("JavaScript", 800), ("Python", 200)]), table);
        // 0.8 * 1.5 + 0.2 * 2.0
        assert_eq!(result, 1.6);
    }

    #[test]
    fn unknown_languages_dilute_the_average() {
        let table = &[("Rust", 1.0)];
        let result = weighted_energy_with(&usage(&[("Rust", 500), ("Klingon", 500)]), table);
        assert_eq!(result, 0.5);
    }

    #[test]
    fn empty_usage_yields_zero() {
        assert_eq!(weighted_energy(&HashMap::new()), 0.0);
    }

    #[test]
    fn zero_byte_entries_yield_zero() {
        assert_eq!(weighted_energy(&usage(&[("Rust", 0), ("C", 0)])), 0.0);
    }

    #[test]
    fn uses_the_shipped_constant_table() {
        let result = weighted_energy(&usage(&[("C", 100)]));
        assert_eq!(result, 1.0);
    }
}
