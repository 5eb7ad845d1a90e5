//! # Dashboard Module
//!
//! Table-filter derivation for the vegetation dashboard. A parameter snapshot
//! (index, region, week range, year range, sort order) selects and orders rows
//! of the source table, builds the trend series for the line chart and the
//! per-region comparison for the bar chart.
//!
//! All three views are rebuilt from the shared table on every cycle; derived
//! columns such as the trend dates live only in the returned frame.

use crate::error::{LabError, Result};
use crate::params::{ControlSpec, ParameterStore};
use crate::session::Derivation;
use crate::vegetation::{IndexKind, IndexRecord, VegetationTable, week_start_date};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Control identifiers of the dashboard.
pub mod controls {
    pub const INDEX_KIND: &str = "index_kind";
    pub const REGION: &str = "region";
    pub const WEEK_RANGE: &str = "week_range";
    pub const YEAR_RANGE: &str = "year_range";
    pub const SORT_ORDER: &str = "sort_order";
}

/// Ordering applied to the filtered rows and to the comparison bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Unsorted,
    Ascending,
    Descending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 3] = [SortOrder::Unsorted, SortOrder::Ascending, SortOrder::Descending];

    /// Identifier stored in the parameter store.
    pub fn key(&self) -> &'static str {
        match self {
            SortOrder::Unsorted => "unsorted",
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }

    /// Text shown next to the radio button.
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Unsorted => "Don't sort",
            SortOrder::Ascending => "Ascending sort",
            SortOrder::Descending => "Descending sort",
        }
    }

    /// Orders two index values; missing (NaN) values go last in both
    /// directions. `Unsorted` treats everything as equal.
    pub fn compare(&self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self {
                SortOrder::Unsorted => Ordering::Equal,
                SortOrder::Ascending => a.total_cmp(&b),
                SortOrder::Descending => b.total_cmp(&a),
            },
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SortOrder {
    type Err = LabError;

    fn from_str(s: &str) -> Result<Self> {
        SortOrder::ALL
            .into_iter()
            .find(|o| o.key() == s)
            .ok_or_else(|| LabError::invalid(controls::SORT_ORDER, format!("unknown sort order '{}'", s)))
    }
}

/// Builds the dashboard controls for `table`: region choices come from the
/// data, range controls are bounded by the data's min and max.
pub fn dashboard_store(table: &VegetationTable) -> Result<ParameterStore> {
    use controls::*;
    let (week_min, week_max) = table.week_bounds();
    let (year_min, year_max) = table.year_bounds();
    ParameterStore::new(vec![
        ControlSpec::choice(
            INDEX_KIND,
            "Select the index",
            IndexKind::ALL.iter().map(|k| k.name().to_string()).collect(),
        ),
        ControlSpec::choice(REGION, "Select the region", table.regions()),
        ControlSpec::range(WEEK_RANGE, "Select the week range", week_min, week_max),
        ControlSpec::range(YEAR_RANGE, "Select the year range", year_min, year_max),
        ControlSpec::choice(
            SORT_ORDER,
            "Sorting for index",
            SortOrder::ALL.iter().map(|o| o.key().to_string()).collect(),
        ),
    ])
}

/// A snapshot of the dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardParams {
    pub index_kind: IndexKind,
    pub region: String,
    pub week_range: (i64, i64),
    pub year_range: (i64, i64),
    pub sort_order: SortOrder,
}

impl DashboardParams {
    pub fn from_store(store: &ParameterStore) -> Result<Self> {
        use controls::*;
        Ok(Self {
            index_kind: store.choice(INDEX_KIND)?.parse()?,
            region: store.choice(REGION)?.to_string(),
            week_range: store.range(WEEK_RANGE)?,
            year_range: store.range(YEAR_RANGE)?,
            sort_order: store.choice(SORT_ORDER)?.parse()?,
        })
    }

    fn in_period(&self, row: &IndexRecord) -> bool {
        (self.week_range.0..=self.week_range.1).contains(&row.week)
            && (self.year_range.0..=self.year_range.1).contains(&row.year)
    }
}

/// Rows of the selected region inside both ranges, ordered by `sort_order`.
/// Unsorted keeps the source order.
pub fn filter_rows(table: &VegetationTable, params: &DashboardParams) -> Vec<IndexRecord> {
    let mut rows: Vec<IndexRecord> = table
        .rows()
        .iter()
        .filter(|r| r.region_name == params.region && params.in_period(r))
        .cloned()
        .collect();
    let kind = params.index_kind;
    if params.sort_order != SortOrder::Unsorted {
        rows.sort_by(|a, b| params.sort_order.compare(a.index(kind), b.index(kind)));
    }
    rows
}

/// X coordinate of a trend point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrendX {
    /// Start of the row's week; used while rows are in source order.
    Date(NaiveDate),
    /// 1-based position in the sorted rows.
    Row(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub x: TrendX,
    pub value: f64,
}

/// Builds the line-chart series over already filtered `rows`.
///
/// Unsorted rows are plotted against their week dates; sorted rows against
/// their row number, since their order no longer follows time. Rows with a
/// missing value leave a gap.
pub fn trend_series(rows: &[IndexRecord], params: &DashboardParams) -> Result<Vec<TrendPoint>> {
    let kind = params.index_kind;
    rows.iter()
        .enumerate()
        .map(|(i, row)| -> Result<Option<TrendPoint>> {
            let x = match params.sort_order {
                SortOrder::Unsorted => TrendX::Date(week_start_date(row.year, row.week).ok_or_else(|| {
                    LabError::degenerate(format!("no calendar date for week {} of {}", row.week, row.year))
                })?),
                SortOrder::Ascending | SortOrder::Descending => TrendX::Row(i + 1),
            };
            Ok(Some(TrendPoint { x, value: row.index(kind) }).filter(|p| !p.value.is_nan()))
        })
        .filter_map(Result::transpose)
        .collect()
}

/// One bar of the region comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonBar {
    pub region: String,
    pub mean: f64,
    /// Set for the currently selected region.
    pub highlight: bool,
}

/// Mean of the selected index per region over the week/year ranges.
///
/// The region selection does not filter here; it only marks the highlighted
/// bar. Unsorted output is alphabetical by region. Missing (NaN) values are
/// left out of the means; a region with none left gets no bar.
pub fn compare_regions(table: &VegetationTable, params: &DashboardParams) -> Vec<ComparisonBar> {
    let kind = params.index_kind;
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in table.rows().iter().filter(|r| params.in_period(r)) {
        let value = row.index(kind);
        if value.is_nan() {
            continue;
        }
        let entry = groups.entry(row.region_name.as_str()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }
    let mut bars: Vec<ComparisonBar> = groups
        .into_iter()
        .map(|(region, (sum, count))| ComparisonBar {
            region: region.to_string(),
            mean: sum / count as f64,
            highlight: region == params.region,
        })
        .collect();
    if params.sort_order != SortOrder::Unsorted {
        bars.sort_by(|a, b| params.sort_order.compare(a.mean, b.mean));
    }
    bars
}

/// Everything the dashboard shows for one parameter snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFrame {
    pub params: DashboardParams,
    pub rows: Vec<IndexRecord>,
    pub trend: Vec<TrendPoint>,
    pub comparison: Vec<ComparisonBar>,
}

/// Table-filter derivation over the process-wide vegetation table.
#[derive(Debug)]
pub struct DashboardDerivation {
    table: VegetationTable,
}

impl DashboardDerivation {
    pub fn new(table: VegetationTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VegetationTable {
        &self.table
    }

    pub fn compute(&self, params: &DashboardParams) -> Result<DashboardFrame> {
        let rows = filter_rows(&self.table, params);
        let trend = trend_series(&rows, params)?;
        let comparison = compare_regions(&self.table, params);
        Ok(DashboardFrame { params: params.clone(), rows, trend, comparison })
    }
}

impl Derivation for DashboardDerivation {
    type Output = DashboardFrame;

    fn derive(&self, store: &ParameterStore) -> Result<DashboardFrame> {
        self.compute(&DashboardParams::from_store(store)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(region: &str, week: i64, year: i64, vci: f64) -> IndexRecord {
        IndexRecord { region_name: region.into(), week, year, vci, tci: vci / 2.0, vhi: vci / 4.0 }
    }

    fn table() -> VegetationTable {
        VegetationTable::from_rows(
            "mem",
            vec![
                row("Kyiv", 1, 2020, 40.0),
                row("Lviv", 1, 2020, 10.0),
                row("Kyiv", 2, 2020, 20.0),
                row("Lviv", 2, 2020, 30.0),
                row("Kyiv", 1, 2021, 60.0),
            ],
        )
        .unwrap()
    }

    fn params(order: SortOrder) -> DashboardParams {
        DashboardParams {
            index_kind: IndexKind::Vci,
            region: "Kyiv".into(),
            week_range: (1, 2),
            year_range: (2020, 2021),
            sort_order: order,
        }
    }

    #[test]
    fn test_store_defaults_follow_the_data() {
        let store = dashboard_store(&table()).unwrap();
        let p = DashboardParams::from_store(&store).unwrap();
        assert_eq!(p, params(SortOrder::Unsorted));
    }

    #[test]
    fn test_filter_keeps_selected_region_in_order() {
        let rows = filter_rows(&table(), &params(SortOrder::Unsorted));
        let vci: Vec<f64> = rows.iter().map(|r| r.vci).collect();
        assert_eq!(vci, vec![40.0, 20.0, 60.0]);
    }

    #[test]
    fn test_trend_axis_depends_on_sorting() {
        let p = params(SortOrder::Unsorted);
        let trend = trend_series(&filter_rows(&table(), &p), &p).unwrap();
        assert_eq!(trend[0].x, TrendX::Date(NaiveDate::from_ymd_opt(2020, 1, 6).unwrap()));

        let p = params(SortOrder::Descending);
        let trend = trend_series(&filter_rows(&table(), &p), &p).unwrap();
        let xs: Vec<TrendX> = trend.iter().map(|t| t.x).collect();
        assert_eq!(xs, vec![TrendX::Row(1), TrendX::Row(2), TrendX::Row(3)]);
        assert_eq!(trend[0].value, 60.0);
    }

    #[test]
    fn test_comparison_means_and_highlight() {
        let mut p = params(SortOrder::Unsorted);
        p.year_range = (2020, 2020);
        let bars = compare_regions(&table(), &p);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0], ComparisonBar { region: "Kyiv".into(), mean: 30.0, highlight: true });
        assert_eq!(bars[1], ComparisonBar { region: "Lviv".into(), mean: 20.0, highlight: false });

        p.sort_order = SortOrder::Ascending;
        let bars = compare_regions(&table(), &p);
        assert_eq!(bars[0].region, "Lviv");
    }

    #[test]
    fn test_comparison_uses_selected_index() {
        let mut p = params(SortOrder::Unsorted);
        p.index_kind = IndexKind::Tci;
        let bars = compare_regions(&table(), &p);
        assert_eq!(bars[0].mean, 20.0);
    }

    #[test]
    fn test_missing_values_sort_last_and_skip_means() {
        let mut rows = table().rows().to_vec();
        rows.push(row("Kyiv", 2, 2021, f64::NAN));
        rows.push(row("Odesa", 1, 2020, f64::NAN));
        let table = VegetationTable::from_rows("mem", rows).unwrap();

        for order in [SortOrder::Ascending, SortOrder::Descending] {
            let sorted = filter_rows(&table, &params(order));
            assert_eq!(sorted.len(), 4);
            assert!(sorted[3].vci.is_nan(), "{:?}", order);
            assert!(sorted[..3].iter().all(|r| !r.vci.is_nan()));
        }

        let p = params(SortOrder::Unsorted);
        let trend = trend_series(&filter_rows(&table, &p), &p).unwrap();
        assert_eq!(trend.len(), 3);

        let bars = compare_regions(&table, &p);
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].mean, 40.0);
    }

    #[test]
    fn test_empty_selection_yields_empty_views() {
        let mut p = params(SortOrder::Unsorted);
        p.week_range = (5, 6);
        let frame = DashboardDerivation::new(table()).compute(&p).unwrap();
        assert!(frame.rows.is_empty());
        assert!(frame.trend.is_empty());
        assert!(frame.comparison.is_empty());
    }
}
