//! Console presentation of predicted passes.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::predict::Pass;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// How worthwhile a pass is, judged by its peak elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Low,
    Moderate,
    Good,
}

impl Severity {
    pub fn from_elevation(peak_deg: f64) -> Self {
        if peak_deg <= 5.0 {
            Severity::Low
        } else if peak_deg <= 15.0 {
            Severity::Moderate
        } else {
            Severity::Good
        }
    }

    fn color(&self) -> &'static str {
        match self {
            Severity::Low => RED,
            Severity::Moderate => YELLOW,
            Severity::Good => GREEN,
        }
    }
}

pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

pub fn colorize_elevation(peak_deg: f64) -> String {
    let severity = Severity::from_elevation(peak_deg);
    format!("{}{:.2}{}", severity.color(), peak_deg, RESET)
}

pub fn separator(symbol: char, length: usize) -> String {
    std::iter::repeat(symbol).take(length).collect()
}

pub fn format_pass_line(number: usize, pass: &Pass, tz: Tz) -> String {
    let mut line = format!(
        "{}. ISS will appear at {}, max elevation: {}, and disappear at {}",
        number,
        format_local(pass.start, tz),
        colorize_elevation(pass.peak_elevation_deg),
        format_local(pass.end, tz)
    );
    if pass.truncated {
        line.push_str(" (clipped by prediction window)");
    }
    line
}

pub fn print_passes(passes: &[Pass], tz: Tz) {
    if passes.is_empty() {
        println!("No passes found.");
        println!("{}", separator('-', 40));
        return;
    }

    println!("{}", separator('#', 40));
    println!("All calculated passes (local time):");
    println!("{}", separator('#', 40));
    for (i, pass) in passes.iter().enumerate() {
        println!("{}", format_pass_line(i + 1, pass, tz));
    }
}
