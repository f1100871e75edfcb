use crate::types::{DistrictCoord, ForecastRecord, JoinedRecord, RawForecastRow, RawTambonRow};
use crate::util::{
    normalize_district_code, parse_date_safe, parse_f64_safe, zero_pad_code, UNKNOWN_DISTRICT,
};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::error::Error;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub parse_errors: usize,
    /// Rows whose amphoe sub-code normalized to the "99" sentinel.
    pub sentinel_districts: usize,
}

/// Load and clean the forecast CSV.
///
/// A row survives when its date parses as `YYYY-MM-DD` and its predicted
/// case count parses as a non-negative number. The district sub-code is
/// normalized unconditionally (the sentinel is valid data, it just gets
/// counted), and the four-digit coordinate join key is derived from `rcode`
/// where possible.
pub fn load_forecast(path: &str) -> Result<(Vec<ForecastRecord>, LoadReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut sentinel_districts = 0usize;
    let mut records: Vec<ForecastRecord> = Vec::new();

    for result in rdr.deserialize::<RawForecastRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };

        let adate = match parse_date_safe(row.adate.as_deref()) {
            Some(d) => d,
            None => {
                parse_errors += 1;
                continue;
            }
        };
        let predicted_cases = match parse_f64_safe(row.predicted_cases.as_deref()) {
            Some(v) if v >= 0.0 => v,
            _ => {
                parse_errors += 1;
                continue;
            }
        };

        let rcode_key = zero_pad_code(row.rcode.as_deref(), 4);
        let district_code = normalize_district_code(row.aampur.as_deref());
        if district_code == UNKNOWN_DISTRICT {
            sentinel_districts += 1;
        }

        records.push(ForecastRecord {
            adate,
            rcode_key,
            district_code,
            predicted_cases,
        });
    }

    let report = LoadReport {
        total_rows,
        kept_rows: records.len(),
        parse_errors,
        sentinel_districts,
    };
    Ok((records, report))
}

/// Load the tambon coordinate table and collapse it to one row per amphoe.
///
/// The source file has one row per tambon (sub-district); the dashboard
/// plots at amphoe granularity, so tambons are grouped by their four-digit
/// `AM_ID` and the coordinates averaged. `CH_ID` is constant within an
/// amphoe, so the first value wins.
pub fn load_district_coords(path: &str) -> Result<Vec<DistrictCoord>, Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;

    struct Acc {
        ch_id: String,
        amphoe: String,
        changwat: String,
        lat_sum: f64,
        long_sum: f64,
        n: usize,
    }
    let mut by_amphoe: HashMap<String, Acc> = HashMap::new();
    // Remember first-seen order so output is deterministic.
    let mut order: Vec<String> = Vec::new();

    for result in rdr.deserialize::<RawTambonRow>() {
        let row = match result {
            Ok(r) => r,
            Err(_) => continue,
        };
        let Some(am_id) = zero_pad_code(row.am_id.as_deref(), 4) else {
            continue;
        };
        let (Some(lat), Some(long)) = (
            parse_f64_safe(row.lat.as_deref()),
            parse_f64_safe(row.long.as_deref()),
        ) else {
            continue;
        };

        let acc = by_amphoe.entry(am_id.clone()).or_insert_with(|| {
            order.push(am_id.clone());
            Acc {
                ch_id: row.ch_id.as_deref().unwrap_or("").trim().to_string(),
                amphoe: row.amphoe.as_deref().unwrap_or("").trim().to_string(),
                changwat: row.changwat.as_deref().unwrap_or("").trim().to_string(),
                lat_sum: 0.0,
                long_sum: 0.0,
                n: 0,
            }
        });
        acc.lat_sum += lat;
        acc.long_sum += long;
        acc.n += 1;
    }

    let coords = order
        .into_iter()
        .filter_map(|am_id| {
            let acc = by_amphoe.remove(&am_id)?;
            if acc.n == 0 {
                return None;
            }
            Some(DistrictCoord {
                am_id,
                ch_id: acc.ch_id,
                amphoe: acc.amphoe,
                changwat: acc.changwat,
                lat: acc.lat_sum / acc.n as f64,
                long: acc.long_sum / acc.n as f64,
            })
        })
        .collect();
    Ok(coords)
}

/// Left-join forecast rows against the amphoe coordinate table.
///
/// Forecast rows are never dropped; rows without a matching `AM_ID` simply
/// carry no coordinates. The second return value counts the unmatched rows.
pub fn join_coords(records: &[ForecastRecord], coords: &[DistrictCoord]) -> (Vec<JoinedRecord>, usize) {
    let by_id: HashMap<&str, &DistrictCoord> =
        coords.iter().map(|c| (c.am_id.as_str(), c)).collect();
    let mut unmatched = 0usize;
    let joined = records
        .iter()
        .map(|r| {
            let coord = r
                .rcode_key
                .as_deref()
                .and_then(|k| by_id.get(k))
                .map(|c| (*c).clone());
            if coord.is_none() {
                unmatched += 1;
            }
            JoinedRecord {
                record: r.clone(),
                coord,
            }
        })
        .collect();
    (joined, unmatched)
}
