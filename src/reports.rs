use crate::geo::{color_scale, map_view, marker_radius};
use crate::types::{
    DailyTrendRow, DayOfWeekRow, DistrictSummaryRow, JoinedRecord, MapExport, MapPoint,
    OverviewStats, ProvinceShareRow,
};
use crate::util::{average, format_number, median, std_dev};
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Thai weekday names, Monday first, matching `Datelike::weekday` numbering.
const THAI_DAYS: [&str; 7] = [
    "จันทร์",
    "อังคาร",
    "พุธ",
    "พฤหัสบดี",
    "ศุกร์",
    "เสาร์",
    "อาทิตย์",
];

const UNKNOWN_AREA: &str = "ไม่ทราบพื้นที่";

/// Per-district totals, still numeric, shared by the table report, the map
/// export, and the overview statistics.
#[derive(Debug, Clone)]
pub struct DistrictTotal {
    pub am_id: String,
    pub amphoe: String,
    pub changwat: String,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    pub total_cases: f64,
}

/// Group the joined rows by district and sum predicted cases, highest first.
///
/// Rows that never matched the coordinate table are folded into a single
/// "unknown area" district keyed by their raw rcode (or the sentinel), so no
/// forecast mass silently disappears from the totals.
pub fn district_totals(data: &[JoinedRecord]) -> Vec<DistrictTotal> {
    struct Acc {
        amphoe: String,
        changwat: String,
        lat: Option<f64>,
        long: Option<f64>,
        total: f64,
    }
    let mut map: HashMap<String, Acc> = HashMap::new();
    for row in data {
        let (key, amphoe, changwat, lat, long) = match &row.coord {
            Some(c) => (
                c.am_id.clone(),
                c.amphoe.clone(),
                c.changwat.clone(),
                Some(c.lat),
                Some(c.long),
            ),
            None => (
                row.record
                    .rcode_key
                    .clone()
                    .unwrap_or_else(|| row.record.district_code.clone()),
                UNKNOWN_AREA.to_string(),
                UNKNOWN_AREA.to_string(),
                None,
                None,
            ),
        };
        let acc = map.entry(key).or_insert(Acc {
            amphoe,
            changwat,
            lat,
            long,
            total: 0.0,
        });
        acc.total += row.record.predicted_cases;
    }
    let mut totals: Vec<DistrictTotal> = map
        .into_iter()
        .map(|(am_id, acc)| DistrictTotal {
            am_id,
            amphoe: acc.amphoe,
            changwat: acc.changwat,
            lat: acc.lat,
            long: acc.long,
            total_cases: acc.total,
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total_cases
            .partial_cmp(&a.total_cases)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.am_id.cmp(&b.am_id))
    });
    totals
}

/// Render district totals into the Thai-headed table/export rows.
pub fn district_summary_rows(totals: &[DistrictTotal]) -> Vec<DistrictSummaryRow> {
    totals
        .iter()
        .map(|t| DistrictSummaryRow {
            changwat: t.changwat.clone(),
            amphoe: t.amphoe.clone(),
            total_cases: format_number(t.total_cases, 0),
            lat: t.lat.map(|v| format!("{:.4}", v)).unwrap_or_default(),
            long: t.long.map(|v| format!("{:.4}", v)).unwrap_or_default(),
        })
        .collect()
}

/// First `n` districts of the descending summary.
pub fn top_districts(totals: &[DistrictTotal], n: usize) -> Vec<DistrictTotal> {
    totals.iter().take(n).cloned().collect()
}

/// Sum cases per calendar day, ascending by date.
pub fn daily_trend(data: &[JoinedRecord]) -> Vec<DailyTrendRow> {
    let mut by_day: HashMap<chrono::NaiveDate, f64> = HashMap::new();
    for row in data {
        *by_day.entry(row.record.adate).or_insert(0.0) += row.record.predicted_cases;
    }
    let mut days: Vec<_> = by_day.into_iter().collect();
    days.sort_by_key(|(d, _)| *d);
    days.into_iter()
        .map(|(d, total)| DailyTrendRow {
            date: d.format("%Y-%m-%d").to_string(),
            total_cases: format_number(total, 0),
        })
        .collect()
}

/// Sum cases per weekday, Monday through Sunday, Thai day names.
pub fn day_of_week_distribution(data: &[JoinedRecord]) -> Vec<DayOfWeekRow> {
    let mut sums = [0.0f64; 7];
    for row in data {
        sums[row.record.adate.weekday().num_days_from_monday() as usize] +=
            row.record.predicted_cases;
    }
    THAI_DAYS
        .iter()
        .zip(sums)
        .map(|(day, total)| DayOfWeekRow {
            day: day.to_string(),
            total_cases: format_number(total, 0),
        })
        .collect()
}

/// Sum cases per province, descending, with each province's share of the
/// grand total. `top_n` limits the output (the dashboard charts ten).
pub fn province_totals(data: &[JoinedRecord], top_n: usize) -> Vec<ProvinceShareRow> {
    let mut by_province: HashMap<String, f64> = HashMap::new();
    for row in data {
        let name = row
            .coord
            .as_ref()
            .map(|c| c.changwat.clone())
            .unwrap_or_else(|| UNKNOWN_AREA.to_string());
        *by_province.entry(name).or_insert(0.0) += row.record.predicted_cases;
    }
    let grand_total: f64 = by_province.values().sum();
    let mut provinces: Vec<_> = by_province.into_iter().collect();
    provinces.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    provinces
        .into_iter()
        .take(top_n)
        .map(|(changwat, total)| ProvinceShareRow {
            changwat,
            total_cases: format_number(total, 0),
            share_pct: if grand_total > 0.0 {
                format_number(total / grand_total * 100.0, 1)
            } else {
                format_number(0.0, 1)
            },
        })
        .collect()
}

/// The metric row and "deep statistics" row of the analysis tab.
pub fn overview_stats(data: &[JoinedRecord], totals: &[DistrictTotal]) -> OverviewStats {
    let total_cases: f64 = data.iter().map(|r| r.record.predicted_cases).sum();
    let mut by_day: HashMap<chrono::NaiveDate, f64> = HashMap::new();
    for row in data {
        *by_day.entry(row.record.adate).or_insert(0.0) += row.record.predicted_cases;
    }
    let daily: Vec<f64> = by_day.values().copied().collect();
    let district_cases: Vec<f64> = totals.iter().map(|t| t.total_cases).collect();
    OverviewStats {
        total_cases,
        district_count: totals.len(),
        top_district: totals.first().map(|t| t.amphoe.clone()),
        avg_cases_per_day: average(&daily),
        median_district_cases: median(district_cases.clone()),
        std_dev_district_cases: std_dev(&district_cases),
        distinct_days: by_day.len(),
    }
}

/// Build the full map export: fitted view, colored and sized markers, and
/// heat-layer triples. Districts without coordinates cannot be plotted and
/// are left out here (they still appear in the table report).
pub fn map_export(totals: &[DistrictTotal]) -> MapExport {
    let plotted: Vec<&DistrictTotal> = totals
        .iter()
        .filter(|t| t.lat.is_some() && t.long.is_some())
        .collect();

    let cases: Vec<f64> = plotted.iter().map(|t| t.total_cases).collect();
    let min = cases.iter().copied().fold(f64::MAX, f64::min);
    let max = cases.iter().copied().fold(f64::MIN, f64::max);
    let colors = color_scale(&cases);

    let points: Vec<MapPoint> = plotted
        .iter()
        .zip(colors)
        .map(|(t, color)| MapPoint {
            amphoe: t.amphoe.clone(),
            changwat: t.changwat.clone(),
            lat: t.lat.unwrap_or(0.0),
            long: t.long.unwrap_or(0.0),
            cases: t.total_cases,
            radius: marker_radius(t.total_cases, min, max),
            color: color.to_string(),
        })
        .collect();

    let coords: Vec<(f64, f64)> = points.iter().map(|p| (p.lat, p.long)).collect();
    let heat: Vec<(f64, f64, f64)> = points.iter().map(|p| (p.lat, p.long, p.cases)).collect();
    MapExport {
        view: map_view(&coords),
        points,
        heat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DistrictCoord, ForecastRecord};
    use chrono::NaiveDate;

    fn joined(
        ymd: (i32, u32, u32),
        cases: f64,
        coord: Option<(&str, &str, &str, f64, f64)>,
    ) -> JoinedRecord {
        JoinedRecord {
            record: ForecastRecord {
                adate: NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).unwrap(),
                rcode_key: coord.map(|c| c.0.to_string()),
                district_code: "01".to_string(),
                predicted_cases: cases,
            },
            coord: coord.map(|(am_id, amphoe, changwat, lat, long)| DistrictCoord {
                am_id: am_id.to_string(),
                ch_id: am_id[..2].to_string(),
                amphoe: amphoe.to_string(),
                changwat: changwat.to_string(),
                lat,
                long,
            }),
        }
    }

    fn sample() -> Vec<JoinedRecord> {
        vec![
            joined((2025, 12, 29), 5.0, Some(("1001", "เขตพระนคร", "กรุงเทพมหานคร", 13.76, 100.50))),
            joined((2025, 12, 30), 3.0, Some(("1001", "เขตพระนคร", "กรุงเทพมหานคร", 13.76, 100.50))),
            joined((2025, 12, 29), 2.0, Some(("5001", "เมืองเชียงใหม่", "เชียงใหม่", 18.79, 98.98))),
            joined((2025, 12, 30), 1.0, None),
        ]
    }

    #[test]
    fn district_totals_sum_and_sort() {
        let totals = district_totals(&sample());
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].amphoe, "เขตพระนคร");
        assert_eq!(totals[0].total_cases, 8.0);
        assert_eq!(totals[1].total_cases, 2.0);
        // Unmatched rows survive as an unknown-area bucket.
        assert_eq!(totals[2].changwat, UNKNOWN_AREA);
        assert_eq!(totals[2].total_cases, 1.0);
        let grand: f64 = totals.iter().map(|t| t.total_cases).sum();
        assert_eq!(grand, 11.0);
    }

    #[test]
    fn daily_trend_is_date_sorted() {
        let rows = daily_trend(&sample());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2025-12-29");
        assert_eq!(rows[0].total_cases, "7");
        assert_eq!(rows[1].date, "2025-12-30");
        assert_eq!(rows[1].total_cases, "4");
    }

    #[test]
    fn weekday_distribution_uses_thai_names() {
        let rows = day_of_week_distribution(&sample());
        assert_eq!(rows.len(), 7);
        assert_eq!(rows[0].day, "จันทร์");
        // 2025-12-29 is a Monday, 2025-12-30 a Tuesday.
        assert_eq!(rows[0].total_cases, "7");
        assert_eq!(rows[1].total_cases, "4");
        assert_eq!(rows[2].total_cases, "0");
    }

    #[test]
    fn province_totals_rank_and_share() {
        let rows = province_totals(&sample(), 10);
        assert_eq!(rows[0].changwat, "กรุงเทพมหานคร");
        assert_eq!(rows[0].total_cases, "8");
        // 8 of 11 total.
        assert_eq!(rows[0].share_pct, "72.7");
        assert_eq!(province_totals(&sample(), 1).len(), 1);
    }

    #[test]
    fn overview_metrics() {
        let data = sample();
        let totals = district_totals(&data);
        let stats = overview_stats(&data, &totals);
        assert_eq!(stats.total_cases, 11.0);
        assert_eq!(stats.district_count, 3);
        assert_eq!(stats.top_district.as_deref(), Some("เขตพระนคร"));
        assert_eq!(stats.distinct_days, 2);
        assert_eq!(stats.avg_cases_per_day, 5.5);
        assert_eq!(stats.median_district_cases, 2.0);
    }

    #[test]
    fn map_export_skips_unlocated_districts() {
        let totals = district_totals(&sample());
        let export = map_export(&totals);
        assert_eq!(export.points.len(), 2);
        assert_eq!(export.heat.len(), 2);
        // Two located districts span Bangkok to Chiang Mai (about 5 degrees).
        assert_eq!(export.view.zoom, 7);
        for p in &export.points {
            assert!(p.radius >= 8.0 && p.radius <= 25.0);
        }
        // Largest district draws largest.
        assert_eq!(export.points[0].cases, 8.0);
        assert_eq!(export.points[0].radius, 25.0);
        assert_eq!(export.points[1].radius, 8.0);
    }
}
