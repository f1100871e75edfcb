use crate::filters::{DateSource, FieldValue};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One raw row of the forecast CSV, exactly as exported by the model
/// pipeline. Every field is optional text; cleaning happens in the loader.
#[derive(Debug, Deserialize)]
pub struct RawForecastRow {
    pub adate: Option<String>,
    pub rcode: Option<String>,
    pub aampur: Option<String>,
    pub predicted_cases: Option<String>,
}

/// One raw row of the tambon coordinate table.
#[derive(Debug, Deserialize)]
pub struct RawTambonRow {
    #[serde(rename = "AM_ID")]
    pub am_id: Option<String>,
    #[serde(rename = "CH_ID")]
    pub ch_id: Option<String>,
    #[serde(rename = "AMPHOE_T")]
    pub amphoe: Option<String>,
    #[serde(rename = "CHANGWAT_T")]
    pub changwat: Option<String>,
    #[serde(rename = "LAT")]
    pub lat: Option<String>,
    #[serde(rename = "LONG")]
    pub long: Option<String>,
}

/// A cleaned, typed forecast row.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRecord {
    pub adate: NaiveDate,
    /// Four-digit join key into the coordinate table (`AM_ID`).
    pub rcode_key: Option<String>,
    /// Two-digit amphoe sub-code, `"99"` when unknown.
    pub district_code: String,
    pub predicted_cases: f64,
}

impl DateSource for ForecastRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        (name == "adate").then_some(FieldValue::Date(self.adate))
    }
}

/// Per-district coordinates, one row per amphoe, averaged over its tambons.
#[derive(Debug, Clone)]
pub struct DistrictCoord {
    pub am_id: String,
    pub ch_id: String,
    pub amphoe: String,
    pub changwat: String,
    pub lat: f64,
    pub long: f64,
}

/// A forecast row joined (left) against the coordinate table.
#[derive(Debug, Clone)]
pub struct JoinedRecord {
    pub record: ForecastRecord,
    pub coord: Option<DistrictCoord>,
}

impl DateSource for JoinedRecord {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.record.field(name)
    }
}

// Report rows keep the Thai column headers of the dashboard's data table and
// its two CSV download buttons.

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistrictSummaryRow {
    #[serde(rename = "จังหวัด")]
    #[tabled(rename = "จังหวัด")]
    pub changwat: String,
    #[serde(rename = "อำเภอ")]
    #[tabled(rename = "อำเภอ")]
    pub amphoe: String,
    #[serde(rename = "จำนวนอุบัติเหตุ")]
    #[tabled(rename = "จำนวนอุบัติเหตุ")]
    pub total_cases: String,
    #[serde(rename = "ละติจูด")]
    #[tabled(rename = "ละติจูด")]
    pub lat: String,
    #[serde(rename = "ลองจิจูด")]
    #[tabled(rename = "ลองจิจูด")]
    pub long: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DailyTrendRow {
    #[serde(rename = "วันที่")]
    #[tabled(rename = "วันที่")]
    pub date: String,
    #[serde(rename = "จำนวนอุบัติเหตุ")]
    #[tabled(rename = "จำนวนอุบัติเหตุ")]
    pub total_cases: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DayOfWeekRow {
    #[serde(rename = "วัน")]
    #[tabled(rename = "วัน")]
    pub day: String,
    #[serde(rename = "จำนวนอุบัติเหตุ")]
    #[tabled(rename = "จำนวนอุบัติเหตุ")]
    pub total_cases: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ProvinceShareRow {
    #[serde(rename = "จังหวัด")]
    #[tabled(rename = "จังหวัด")]
    pub changwat: String,
    #[serde(rename = "จำนวนอุบัติเหตุ")]
    #[tabled(rename = "จำนวนอุบัติเหตุ")]
    pub total_cases: String,
    #[serde(rename = "สัดส่วน (%)")]
    #[tabled(rename = "สัดส่วน (%)")]
    pub share_pct: String,
}

/// Overview metrics shown at the top of the analysis tab, serialized to
/// `summary.json`.
#[derive(Debug, Serialize)]
pub struct OverviewStats {
    pub total_cases: f64,
    pub district_count: usize,
    pub top_district: Option<String>,
    pub avg_cases_per_day: f64,
    pub median_district_cases: f64,
    pub std_dev_district_cases: f64,
    pub distinct_days: usize,
}

/// One map marker, ready for a front-end to draw: position, min-max scaled
/// radius, quantile bucket color, and the raw count for the tooltip.
#[derive(Debug, Serialize, Clone)]
pub struct MapPoint {
    pub amphoe: String,
    pub changwat: String,
    pub lat: f64,
    pub long: f64,
    pub cases: f64,
    pub radius: f64,
    pub color: String,
}

/// Map center and zoom fitted to the plotted points.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center_lat: f64,
    pub center_long: f64,
    pub zoom: u8,
}

/// Everything the map tab needs, serialized to `map_points.json`.
#[derive(Debug, Serialize)]
pub struct MapExport {
    pub view: MapView,
    pub points: Vec<MapPoint>,
    /// (lat, long, weight) triples for the heat layer.
    pub heat: Vec<(f64, f64, f64)>,
}
