//! Terminal rendering of dashboard rows: a data table, two bar charts and a
//! conditions overview.

use std::fmt::Write;

use weather_archive::DashboardRow;

const BAR_WIDTH: usize = 40;

pub fn dashboard(rows: &[DashboardRow]) -> String {
    let mut out = String::new();

    section(&mut out, "Weather Data", &weather_table(rows));
    section(&mut out, "Temperature Comparison", &temperature_chart(rows));
    section(&mut out, "Humidity Comparison", &humidity_chart(rows));
    section(&mut out, "Conditions Overview", &conditions_table(rows));

    out
}

fn section(out: &mut String, title: &str, body: &str) {
    let _ = writeln!(out, "{title}\n{}", "=".repeat(title.chars().count()));
    let _ = writeln!(out, "{body}");
}

fn city_width(rows: &[DashboardRow]) -> usize {
    rows.iter().map(|r| r.city.chars().count()).max().unwrap_or(0).max("City".len())
}

pub fn weather_table(rows: &[DashboardRow]) -> String {
    let cw = city_width(rows);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{:<cw$}  {:>16}  {:>15}  {:>12}  {:<24}  {}",
        "City", "Temperature (°F)", "Feels Like (°F)", "Humidity (%)", "Conditions", "Timestamp"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<cw$}  {:>16.1}  {:>15.1}  {:>12}  {:<24}  {}",
            row.city,
            row.temperature,
            row.feels_like,
            row.humidity,
            row.conditions,
            row.fetched_at_display()
        );
    }

    out
}

pub fn temperature_chart(rows: &[DashboardRow]) -> String {
    let cw = city_width(rows);
    let max = rows.iter().flat_map(|r| [r.temperature, r.feels_like]).fold(0.0_f64, f64::max);
    let mut out = String::new();

    for row in rows {
        let temp = bar(row.temperature, max, '#');
        let feels = bar(row.feels_like, max, '+');
        let _ = writeln!(out, "{:<cw$}  temp  {temp} {:.1}", row.city, row.temperature);
        let _ = writeln!(out, "{:<cw$}  feels {feels} {:.1}", "", row.feels_like);
    }

    out
}

pub fn humidity_chart(rows: &[DashboardRow]) -> String {
    let cw = city_width(rows);
    let mut out = String::new();

    for row in rows {
        let humidity = bar(f64::from(row.humidity), 100.0, '#');
        let _ = writeln!(out, "{:<cw$}  {humidity} {}%", row.city, row.humidity);
    }

    out
}

pub fn conditions_table(rows: &[DashboardRow]) -> String {
    let cw = city_width(rows);
    let mut out = String::new();

    let _ = writeln!(out, "{:<cw$}  Conditions", "City");
    for row in rows {
        let _ = writeln!(out, "{:<cw$}  {}", row.city, row.conditions);
    }

    out
}

/// Fixed-width bar; values at or below zero render empty.
fn bar(value: f64, max: f64, fill: char) -> String {
    let len = if max > 0.0 && value > 0.0 {
        ((value / max) * BAR_WIDTH as f64).round().min(BAR_WIDTH as f64) as usize
    } else {
        0
    };

    let mut bar: String = std::iter::repeat_n(fill, len).collect();
    bar.extend(std::iter::repeat_n(' ', BAR_WIDTH - len));
    bar
}
