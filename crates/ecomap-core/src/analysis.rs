//! Representativeness analysis: which priority sites touch ecosystems above
//! or below the coverage target.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::relations::RelationIndex;
use crate::stats::EcosystemStat;
use crate::text::{locale_cmp, natural_cmp};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThresholdMode {
    /// Ecosystems at or above the target (over-represented).
    Over,
    /// Ecosystems below the target (under-represented).
    Under,
}

impl ThresholdMode {
    /// Whether an ecosystem with the given status qualifies under this mode.
    pub fn qualifies(self, meets_threshold: bool) -> bool {
        match self {
            Self::Over => meets_threshold,
            Self::Under => !meets_threshold,
        }
    }

    pub fn title(self, threshold: f64) -> String {
        match self {
            Self::Over => format!(
                "Sitios Prioritarios en Ecosistemas Sobrerepresentados (>= {threshold}%)"
            ),
            Self::Under => format!(
                "Sitios Prioritarios en Ecosistemas Subrepresentados (< {threshold}%)"
            ),
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Over => "OVER",
            Self::Under => "UNDER",
        })
    }
}

impl FromStr for ThresholdMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OVER" => Ok(Self::Over),
            "UNDER" => Ok(Self::Under),
            other => Err(format!("unknown threshold mode `{other}` (expected OVER or UNDER)")),
        }
    }
}

/// One ecosystem touched by a site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteEcosystem {
    pub name: String,
    /// Total potential coverage (AP + SP) of the ecosystem.
    pub pct: f64,
    pub meets_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAnalysis {
    pub site_id: String,
    /// Qualifying ecosystems first, then the rest, each group by name.
    pub associated_ecosystems: Vec<SiteEcosystem>,
}

/// Sites with at least one ecosystem qualifying under `mode`.
///
/// Sites are ordered by id, numeric-aware ("SP2" before "SP10").
pub fn find_sites_by_threshold(
    mode: ThresholdMode,
    stats: &[EcosystemStat],
    relations: &RelationIndex,
    threshold: f64,
) -> Vec<SiteAnalysis> {
    let mut by_site: HashMap<&str, Vec<SiteEcosystem>> = HashMap::new();
    for eco in stats {
        let meets_threshold = eco.meets(threshold);
        for site in relations.sps_for(&eco.id) {
            by_site.entry(site.as_str()).or_default().push(SiteEcosystem {
                name: eco.name.clone(),
                pct: eco.pct_total_potential,
                meets_threshold,
            });
        }
    }

    let mut sites: Vec<SiteAnalysis> = by_site
        .into_iter()
        .filter(|(_, ecos)| ecos.iter().any(|e| mode.qualifies(e.meets_threshold)))
        .map(|(site_id, mut ecos)| {
            ecos.sort_by(|a, b| {
                let (qa, qb) = (mode.qualifies(a.meets_threshold), mode.qualifies(b.meets_threshold));
                match (qa, qb) {
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    _ => locale_cmp(&a.name, &b.name),
                }
            });
            SiteAnalysis { site_id: site_id.to_string(), associated_ecosystems: ecos }
        })
        .collect();
    sites.sort_by(|a, b| natural_cmp(&a.site_id, &b.site_id));

    debug!(%mode, threshold, sites = sites.len(), "threshold analysis complete");
    sites
}

/// Analysis result with its display title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdReport {
    pub mode: ThresholdMode,
    pub threshold: f64,
    pub title: String,
    pub items: Vec<SiteAnalysis>,
}

pub fn threshold_report(
    mode: ThresholdMode,
    stats: &[EcosystemStat],
    relations: &RelationIndex,
    threshold: f64,
) -> ThresholdReport {
    ThresholdReport {
        mode,
        threshold,
        title: mode.title(threshold),
        items: find_sites_by_threshold(mode, stats, relations, threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eco(id: &str, name: &str, pct: f64) -> EcosystemStat {
        EcosystemStat {
            id: id.into(),
            name: name.into(),
            total_has: 100.0,
            protected_has: pct,
            sp_net_has: 0.0,
            pct_protected: pct,
            pct_sp_contribution: 0.0,
            pct_total_potential: pct,
        }
    }

    fn fixture() -> (Vec<EcosystemStat>, RelationIndex) {
        let stats = vec![
            eco("E1", "Matorral", 20.0),
            eco("E2", "Bosque", 45.0),
            eco("E3", "Estepa", 30.0),
            eco("E4", "Humedal", 5.0),
        ];
        let relations = RelationIndex::from_json(
            r#"{
                "E1": {"aps": [], "sps": ["SP1", "SP10"]},
                "E2": {"aps": [], "sps": ["SP1", "SP2"]},
                "E3": {"aps": [], "sps": ["SP10"]},
                "E4": {"aps": ["A1"], "sps": []}
            }"#,
        )
        .unwrap();
        (stats, relations)
    }

    #[test]
    fn over_includes_site_touching_one_qualifying_ecosystem() {
        let (stats, rel) = fixture();
        let sites = find_sites_by_threshold(ThresholdMode::Over, &stats, &rel, 30.0);
        let sp1 = sites.iter().find(|s| s.site_id == "SP1").expect("SP1 included");
        let names: Vec<_> = sp1.associated_ecosystems.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Bosque", "Matorral"], "the 45% ecosystem first, then the 20% one");
        assert!(sp1.associated_ecosystems[0].meets_threshold);
        assert!(!sp1.associated_ecosystems[1].meets_threshold);
    }

    #[test]
    fn threshold_boundary_counts_as_met() {
        let (stats, rel) = fixture();
        let sites = find_sites_by_threshold(ThresholdMode::Over, &stats, &rel, 30.0);
        let ids: Vec<_> = sites.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(ids, ["SP1", "SP2", "SP10"], "numeric-aware order, SP10 via Estepa at exactly 30%");
    }

    #[test]
    fn under_mode_orders_under_represented_first() {
        let (stats, rel) = fixture();
        let sites = find_sites_by_threshold(ThresholdMode::Under, &stats, &rel, 30.0);
        let ids: Vec<_> = sites.iter().map(|s| s.site_id.as_str()).collect();
        assert_eq!(ids, ["SP1", "SP10"], "SP2 only touches a 45% ecosystem");
        let sp10: Vec<_> = sites[1].associated_ecosystems.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(sp10, ["Matorral", "Estepa"]);
    }

    #[test]
    fn ecosystems_without_sites_contribute_nothing() {
        let (stats, rel) = fixture();
        let sites = find_sites_by_threshold(ThresholdMode::Under, &stats, &rel, 100.0);
        assert!(sites.iter().all(|s| s.associated_ecosystems.iter().all(|e| e.name != "Humedal")));
        assert!(find_sites_by_threshold(ThresholdMode::Over, &[], &rel, 30.0).is_empty());
        assert!(find_sites_by_threshold(ThresholdMode::Over, &stats, &RelationIndex::default(), 30.0).is_empty());
    }

    #[test]
    fn report_titles_and_mode_parsing() {
        let (stats, rel) = fixture();
        let report = threshold_report(ThresholdMode::Under, &stats, &rel, 30.0);
        assert_eq!(report.title, "Sitios Prioritarios en Ecosistemas Subrepresentados (< 30%)");
        assert_eq!("over".parse::<ThresholdMode>(), Ok(ThresholdMode::Over));
        assert!("sideways".parse::<ThresholdMode>().is_err());
    }
}
