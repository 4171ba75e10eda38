//! Ecosystem search over the statistics records.

use crate::stats::EcosystemStat;

/// The single ecosystem whose name equals `term`, ignoring case.
///
/// This is the only lookup the cross-filter engine accepts: it never works
/// with a list of candidates.
pub fn resolve_exact<'a>(stats: &'a [EcosystemStat], term: &str) -> Option<&'a EcosystemStat> {
    if term.is_empty() {
        return None;
    }
    let needle = term.to_lowercase();
    stats.iter().find(|s| s.name.to_lowercase() == needle)
}

/// Records shown in the statistics view for a search term.
///
/// Empty term → everything. An exact name match wins over substring matches,
/// so searching "P7" shows only "P7" and not "P74".
pub fn filter_subset<'a>(stats: &'a [EcosystemStat], term: &str) -> Vec<&'a EcosystemStat> {
    if term.is_empty() {
        return stats.iter().collect();
    }
    if let Some(exact) = resolve_exact(stats, term) {
        return vec![exact];
    }
    let needle = term.to_lowercase();
    stats
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}

/// Search term that selects the ecosystem with code `code` (catalog pick).
pub fn search_term_for_code<'a>(stats: &'a [EcosystemStat], code: &str) -> Option<&'a str> {
    stats.iter().find(|s| s.id == code).map(|s| s.name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(id: &str, name: &str) -> EcosystemStat {
        EcosystemStat {
            id: id.into(),
            name: name.into(),
            total_has: 0.0,
            protected_has: 0.0,
            sp_net_has: 0.0,
            pct_protected: 0.0,
            pct_sp_contribution: 0.0,
            pct_total_potential: 0.0,
        }
    }

    fn sample() -> Vec<EcosystemStat> {
        vec![stat("E7", "P7"), stat("E74", "P74"), stat("E1", "Bosque Templado")]
    }

    #[test]
    fn exact_match_shadows_substring_matches() {
        let stats = sample();
        let hits = filter_subset(&stats, "p7");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "E7");
    }

    #[test]
    fn substring_search_is_case_insensitive() {
        let stats = sample();
        let hits: Vec<_> = filter_subset(&stats, "templ").iter().map(|s| s.id.as_str()).collect();
        assert_eq!(hits, ["E1"]);
        assert_eq!(filter_subset(&stats, "").len(), 3);
        assert!(filter_subset(&stats, "zzz").is_empty());
    }

    #[test]
    fn resolves_exact_names_only() {
        let stats = sample();
        assert_eq!(resolve_exact(&stats, "bosque templado").map(|s| s.id.as_str()), Some("E1"));
        assert!(resolve_exact(&stats, "Bosque").is_none());
        assert!(resolve_exact(&stats, "").is_none());
        assert!(resolve_exact(&[], "P7").is_none());
    }

    #[test]
    fn catalog_pick_maps_code_to_name() {
        let stats = sample();
        assert_eq!(search_term_for_code(&stats, "E74"), Some("P74"));
        assert_eq!(search_term_for_code(&stats, "nope"), None);
    }
}
