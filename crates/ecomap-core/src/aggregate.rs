//! Coverage aggregates at three scopes: one ecosystem, the current subset,
//! and the whole country.
//!
//! Percentages over several ecosystems are always derived from hectare sums,
//! never averaged from per-ecosystem percentages, so large ecosystems weigh
//! in proportion to their area.

use serde::Serialize;

use crate::stats::EcosystemStat;

/// `part / total` as a percentage; 0 when the total is 0.
fn pct_of(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

// ── Subset aggregate ──────────────────────────────────────────────────────────

/// Summed coverage over a set of ecosystems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CoverageAggregate {
    pub ecosystems: usize,
    pub total_has: f64,
    pub protected_has: f64,
    pub sp_has: f64,
    /// AP + SP.
    pub consolidated_has: f64,
    /// `total - protected - sp`.
    pub gap_has: f64,
    pub pct_protected: f64,
    pub pct_sp: f64,
    pub pct_consolidated: f64,
    /// `100 - pct_protected - pct_sp`; agrees with `gap_has / total`.
    pub pct_gap: f64,
}

/// Aggregate over the given records (typically the filtered subset).
pub fn global_aggregate<'a, I>(stats: I) -> CoverageAggregate
where
    I: IntoIterator<Item = &'a EcosystemStat>,
{
    let mut agg = CoverageAggregate::default();
    for s in stats {
        agg.ecosystems += 1;
        agg.total_has += s.total_has;
        agg.protected_has += s.protected_has;
        agg.sp_has += s.sp_net_has;
    }
    agg.consolidated_has = agg.protected_has + agg.sp_has;
    agg.gap_has = agg.total_has - agg.consolidated_has;
    agg.pct_protected = pct_of(agg.protected_has, agg.total_has);
    agg.pct_sp = pct_of(agg.sp_has, agg.total_has);
    agg.pct_consolidated = pct_of(agg.consolidated_has, agg.total_has);
    agg.pct_gap = if agg.total_has > 0.0 {
        100.0 - agg.pct_protected - agg.pct_sp
    } else {
        0.0
    };
    agg
}

// ── National benchmark ────────────────────────────────────────────────────────

/// Country-wide reference line, independent of any search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NationalBenchmark {
    /// AP + SP share of all ecosystem area.
    pub pct_total_protected: f64,
    pub coverage: CoverageAggregate,
}

/// Benchmark over the complete dataset. Callers pass the full store; the
/// session never hands it a filtered subset.
pub fn national_benchmark(full_stats: &[EcosystemStat]) -> NationalBenchmark {
    let coverage = global_aggregate(full_stats);
    NationalBenchmark {
        pct_total_protected: coverage.pct_consolidated,
        coverage,
    }
}

// ── Per-ecosystem breakdown ───────────────────────────────────────────────────

/// A share of one ecosystem, as a percentage and in hectares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Share {
    pub pct: f64,
    pub ha: f64,
}

impl Share {
    fn of(pct: f64, total_has: f64) -> Self {
        Self { pct, ha: pct / 100.0 * total_has }
    }
}

/// Distance from the target threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdGap {
    pub pct: f64,
    pub ha: f64,
    pub target: f64,
    /// True exactly when no coverage is missing.
    pub met: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcosystemBreakdown {
    pub id: String,
    pub name: String,
    pub total_has: f64,
    pub ap: Share,
    pub sp: Share,
    pub total: Share,
    pub gap: ThresholdGap,
}

/// Coverage of one ecosystem against `threshold`.
pub fn per_ecosystem_breakdown(stat: &EcosystemStat, threshold: f64) -> EcosystemBreakdown {
    let total_has = stat.total_has;
    let gap_pct = (threshold - stat.pct_total_potential).max(0.0);
    EcosystemBreakdown {
        id: stat.id.clone(),
        name: stat.name.clone(),
        total_has,
        ap: Share::of(stat.pct_protected, total_has),
        sp: Share::of(stat.pct_sp_contribution, total_has),
        total: Share::of(stat.pct_total_potential, total_has),
        gap: ThresholdGap {
            pct: gap_pct,
            ha: gap_pct / 100.0 * total_has,
            target: threshold,
            met: gap_pct == 0.0,
        },
    }
}

// ── Chart data ────────────────────────────────────────────────────────────────

/// One bar of the stacked representativeness chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    pub id: String,
    pub name: String,
    pub pct_protected: f64,
    pub pct_sp: f64,
    pub pct_gap: f64,
    pub pct_total_potential: f64,
}

/// Chart rows sorted by total potential coverage, highest first.
pub fn gap_chart_rows<'a, I>(stats: I) -> Vec<ChartRow>
where
    I: IntoIterator<Item = &'a EcosystemStat>,
{
    let mut rows: Vec<ChartRow> = stats
        .into_iter()
        .map(|s| ChartRow {
            id: s.id.clone(),
            name: s.name.clone(),
            pct_protected: s.pct_protected,
            pct_sp: s.pct_sp_contribution,
            pct_gap: s.pct_gap(),
            pct_total_potential: s.pct_total_potential,
        })
        .collect();
    rows.sort_by(|a, b| b.pct_total_potential.total_cmp(&a.pct_total_potential));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageSlice {
    pub label: &'static str,
    pub value: f64,
}

/// AP / SP / gap slices for one ecosystem's pie chart.
pub fn coverage_slices(stat: &EcosystemStat) -> [CoverageSlice; 3] {
    [
        CoverageSlice { label: "AP", value: stat.pct_protected },
        CoverageSlice { label: "SP", value: stat.pct_sp_contribution },
        CoverageSlice { label: "Brecha", value: stat.pct_gap() },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stat(id: &str, total: f64, protected: f64, sp: f64) -> EcosystemStat {
        let pct_protected = pct_of(protected, total);
        let pct_sp = pct_of(sp, total);
        EcosystemStat {
            id: id.into(),
            name: format!("Eco {id}"),
            total_has: total,
            protected_has: protected,
            sp_net_has: sp,
            pct_protected,
            pct_sp_contribution: pct_sp,
            pct_total_potential: pct_protected + pct_sp,
        }
    }

    #[test]
    fn percentages_come_from_hectare_sums() {
        // A tiny, fully protected ecosystem next to a large unprotected one.
        let stats = [stat("A", 10.0, 10.0, 0.0), stat("B", 990.0, 0.0, 0.0)];
        let agg = global_aggregate(&stats);
        assert_relative_eq!(agg.pct_protected, 1.0, epsilon = 1e-9);
        assert_eq!(agg.ecosystems, 2);
    }

    #[test]
    fn gap_hectares_and_gap_percentage_reconcile() {
        let stats = [stat("A", 400.0, 100.0, 60.0), stat("B", 600.0, 30.0, 10.0)];
        let agg = global_aggregate(&stats);
        assert_relative_eq!(agg.gap_has, 800.0);
        assert_relative_eq!(agg.pct_gap, agg.gap_has / agg.total_has * 100.0, epsilon = 1e-9);
        assert_relative_eq!(agg.pct_protected + agg.pct_sp + agg.pct_gap, 100.0, epsilon = 1e-9);
        assert_relative_eq!(agg.pct_consolidated, 20.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_total_yields_zero_not_nan() {
        let agg = global_aggregate(&[stat("Z", 0.0, 0.0, 0.0)]);
        assert_eq!(agg.pct_protected, 0.0);
        assert_eq!(agg.pct_gap, 0.0);
        let empty = global_aggregate(std::iter::empty());
        assert_eq!(empty, CoverageAggregate::default());
        assert!(!national_benchmark(&[]).pct_total_protected.is_nan());
    }

    #[test]
    fn national_benchmark_ignores_the_displayed_subset() {
        let full = [stat("A", 400.0, 100.0, 60.0), stat("B", 600.0, 30.0, 10.0)];
        let subset = global_aggregate(&full[..1]);
        let national = national_benchmark(&full);
        assert_relative_eq!(national.pct_total_protected, 20.0, epsilon = 1e-9);
        assert!((subset.pct_consolidated - national.pct_total_protected).abs() > 1.0);
    }

    #[test]
    fn breakdown_gap_to_threshold() {
        let s = stat("A", 1000.0, 100.0, 50.0); // 15 %
        let b = per_ecosystem_breakdown(&s, 30.0);
        assert_relative_eq!(b.gap.pct, 15.0, epsilon = 1e-9);
        assert_relative_eq!(b.gap.ha, 150.0, epsilon = 1e-6);
        assert!(!b.gap.met);
        assert_relative_eq!(b.ap.ha, 100.0, epsilon = 1e-6);
        assert_relative_eq!(b.total.ha, 150.0, epsilon = 1e-6);

        let met = per_ecosystem_breakdown(&s, 10.0);
        assert_eq!(met.gap.pct, 0.0);
        assert!(met.gap.met);
    }

    #[test]
    fn chart_rows_sorted_by_total_potential() {
        let stats = [stat("A", 100.0, 5.0, 0.0), stat("B", 100.0, 40.0, 5.0), stat("C", 100.0, 20.0, 0.0)];
        let ids: Vec<_> = gap_chart_rows(&stats).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["B", "C", "A"]);
    }

    #[test]
    fn pie_slices_cover_the_whole() {
        let slices = coverage_slices(&stat("A", 200.0, 50.0, 20.0));
        let sum: f64 = slices.iter().map(|s| s.value).sum();
        assert_relative_eq!(sum, 100.0, epsilon = 1e-9);
        assert_eq!(slices[2].label, "Brecha");
    }
}
