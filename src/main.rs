// Entry point and high-level CLI flow.
//
// The binary replaces the interactive dashboard with a menu-driven console
// tool over the same data:
// - Option [1] loads the forecast CSV and the tambon coordinate table,
//   printing load diagnostics.
// - Option [2] asks for a date window (and optionally a province), then
//   writes the summary/daily CSV exports, summary.json, and map_points.json,
//   previewing each table on the console.
mod filters;
mod geo;
mod loader;
mod output;
mod reports;
mod types;
mod util;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::JoinedRecord;

const FORECAST_PATH: &str = "forecast_2025_2026.csv";
const COORD_PATH: &str = "coordinate/tambon.csv";

// Simple in-memory app state so we only load and join the CSVs once but can
// generate reports for several windows in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<JoinedRecord>>,
}

/// Read a single line of input after printing a prompt.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask the user whether to go back to the report selection menu after
/// generating reports.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Keep prompting until the user types a valid `YYYY-MM-DD` date.
fn prompt_date(label: &str) -> NaiveDate {
    loop {
        let input = read_line(&format!("{} (YYYY-MM-DD): ", label));
        if let Some(d) = util::parse_date_safe(Some(&input)) {
            return d;
        }
        println!("Invalid date. Please use YYYY-MM-DD.");
    }
}

/// Handle option [1]: load, clean, and join the two CSV files.
///
/// On success the joined rows are stored in `APP_STATE` and a short textual
/// summary of the load is printed.
fn handle_load() {
    let (records, load_report) = match loader::load_forecast(FORECAST_PATH) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load forecast file: {}\n", e);
            return;
        }
    };
    let coords = match loader::load_district_coords(COORD_PATH) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Failed to load coordinate file: {}\n", e);
            return;
        }
    };
    let (joined, unmatched) = loader::join_coords(&records, &coords);

    println!(
        "Processing dataset... ({} rows loaded, {} kept after cleaning)",
        util::format_int(load_report.total_rows as i64),
        util::format_int(load_report.kept_rows as i64)
    );
    println!(
        "Note: {} rows skipped due to parse/validation errors.",
        util::format_int(load_report.parse_errors as i64)
    );
    if load_report.sentinel_districts > 0 {
        println!(
            "Info: {} rows carry the unknown district code ({}).",
            util::format_int(load_report.sentinel_districts as i64),
            util::UNKNOWN_DISTRICT
        );
    }
    if unmatched > 0 {
        println!(
            "Info: {} rows had no match in the coordinate table.",
            util::format_int(unmatched as i64)
        );
    }
    println!("");

    let mut state = APP_STATE.lock().unwrap();
    state.data = Some(joined);
}

/// Ask which date window to report on and apply it.
///
/// Returns `None` when filtering fails (which the menu reports and swallows,
/// leaving the loaded data intact).
fn apply_window(data: &[JoinedRecord]) -> Option<(Vec<JoinedRecord>, &'static str)> {
    println!("Select date window:");
    println!("[1] All dates");
    println!("[2] Seven dangerous days (Dec 20 - Jan 7)");
    println!("[3] Recent years (2022 onward)");
    println!("[4] Custom range");
    let (result, label) = match read_line("Enter choice: ").as_str() {
        "1" => (Ok(data.to_vec()), "All dates"),
        "2" => (
            filters::filter_dangerous_days(data, "adate"),
            "Seven dangerous days (Dec 20 - Jan 7)",
        ),
        "3" => (
            filters::filter_recent_years(data, "adate"),
            "Recent years (2022 onward)",
        ),
        "4" => {
            let start = prompt_date("Start date");
            let end = prompt_date("End date");
            (
                filters::filter_date_range(data, "adate", start, end),
                "Custom range",
            )
        }
        _ => {
            println!("Invalid choice. Using all dates.\n");
            (Ok(data.to_vec()), "All dates")
        }
    };
    match result {
        Ok(rows) => Some((rows, label)),
        Err(e) => {
            eprintln!("Data format error: {}\n", e);
            None
        }
    }
}

/// Optionally narrow the rows to one province (blank keeps all).
fn apply_province_filter(rows: Vec<JoinedRecord>) -> Vec<JoinedRecord> {
    let input = read_line("Province filter (blank for all): ");
    if input.is_empty() {
        return rows;
    }
    let narrowed: Vec<JoinedRecord> = rows
        .iter()
        .filter(|r| r.coord.as_ref().is_some_and(|c| c.changwat == input))
        .cloned()
        .collect();
    if narrowed.is_empty() {
        println!("No rows for province '{}'; keeping all provinces.\n", input);
        rows
    } else {
        narrowed
    }
}

/// Handle option [2]: generate all reports and the JSON exports.
///
/// This function is intentionally side-effectful:
/// - writes the two datestamped CSV exports,
/// - writes summary.json and map_points.json,
/// - and prints markdown previews of each report to the console.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV files first (option 1).\n");
        return;
    };

    let Some((windowed, window_label)) = apply_window(&data) else {
        return;
    };
    let windowed = apply_province_filter(windowed);
    if windowed.is_empty() {
        println!("No rows in the selected window.\n");
        return;
    }

    println!("\nGenerating reports... ({})", window_label);
    println!(
        "{} rows in window.\n",
        util::format_int(windowed.len() as i64)
    );

    let totals = reports::district_totals(&windowed);
    let summary_rows = reports::district_summary_rows(&totals);
    let summary_file = output::stamped_filename("accident_summary");
    if let Err(e) = output::write_csv(&summary_file, &summary_rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: District Forecast Summary");
    println!("(Sorted by predicted cases, descending)\n");
    output::preview_table_rows(&summary_rows, 5);
    println!("(Full table exported to {})\n", summary_file);

    let daily = reports::daily_trend(&windowed);
    let daily_file = output::stamped_filename("accident_daily");
    if let Err(e) = output::write_csv(&daily_file, &daily) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Daily Forecast Trend\n");
    output::preview_table_rows(&daily, 5);
    println!("(Full table exported to {})\n", daily_file);

    let weekday = reports::day_of_week_distribution(&windowed);
    println!("Report 3: Day-of-Week Distribution\n");
    output::preview_table_rows(&weekday, 7);

    let provinces = reports::province_totals(&windowed, 10);
    println!("Report 4: Top 10 Provinces\n");
    output::preview_table_rows(&provinces, 10);

    let stats = reports::overview_stats(&windowed, &totals);
    if let Err(e) = output::write_json("summary.json", &stats) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "Total predicted cases: {} across {} districts over {} days.",
        util::format_number(stats.total_cases, 0),
        util::format_int(stats.district_count as i64),
        util::format_int(stats.distinct_days as i64)
    );
    if let Some(top) = &stats.top_district {
        println!("Highest-risk district: {}", top);
    }
    println!(
        "Average per day: {}\n",
        util::format_number(stats.avg_cases_per_day, 1)
    );

    let map = reports::map_export(&totals);
    if let Err(e) = output::write_json("map_points.json", &map) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Map data: {} markers, center ({:.4}, {:.4}), zoom {} (map_points.json)\n",
        util::format_int(map.points.len() as i64),
        map.view.center_lat,
        map.view.center_long,
        map.view.zoom
    );
}

fn main() {
    loop {
        println!("Thailand Road-Accident Forecast Reports");
        println!("[1] Load the data files");
        println!("[2] Generate Reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!("");
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
}
