use owo_colors::{OwoColorize, Stream, Style};
use serde_json::{Map, Value};

use crate::types::{OutputFormat, Stat, TimeUnit};

/// Label and value styles for one report line.
fn style_for(label: &str) -> (Style, Style) {
    let value = match label {
        "Best" => Style::new().green(),
        "Worst" => Style::new().red(),
        "Average" => Style::new().yellow(),
        "Median" => Style::new().cyan(),
        _ => Style::new().blue(),
    };
    (value.bold(), value)
}

/// Render `stats` in the requested format. Every format ends with a newline.
pub fn render(stats: &[Stat], unit: TimeUnit, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_text(stats, unit),
        OutputFormat::Json => format_json(stats, unit),
        OutputFormat::Csv => format_csv(stats, unit),
    }
}

/// One `Label: value unit` line per statistic, colored when stdout allows it.
pub fn format_text(stats: &[Stat], unit: TimeUnit) -> String {
    let mut out = String::new();

    for stat in stats {
        let (label_style, value_style) = style_for(stat.label);

        let label = format!("{}:", stat.label);
        let label_colored = label
            .if_supports_color(Stream::Stdout, |s| s.style(label_style))
            .to_string();

        let value = format!("{:.6}", unit.convert(stat.value));
        let value_colored = value
            .if_supports_color(Stream::Stdout, |s| s.style(value_style))
            .to_string();

        out.push_str(&format!(
            "{} {} {}\n",
            label_colored,
            value_colored,
            unit.name()
        ));
    }

    out
}

/// Six decimal places, matching the text and CSV renderings.
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// JSON object mapping each label to its value, in report order.
pub fn format_json(stats: &[Stat], unit: TimeUnit) -> String {
    let mut object = Map::new();
    for stat in stats {
        let value = serde_json::Number::from_f64(round6(unit.convert(stat.value)))
            .map(Value::Number)
            .unwrap_or(Value::Null);
        object.insert(stat.label.to_string(), value);
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(object))
        .unwrap_or_else(|_| "{}".to_string());
    out.push('\n');
    out
}

pub fn format_csv(stats: &[Stat], unit: TimeUnit) -> String {
    let mut out = String::from("Label,Value\n");
    for stat in stats {
        out.push_str(&format!("{},{:.6}\n", stat.label, unit.convert(stat.value)));
    }
    out
}

/// Trailer for sessions with failed trials, written to stderr by the caller.
pub fn format_failure_summary(failures: usize, runs: usize) -> Option<String> {
    if failures == 0 {
        return None;
    }
    let line = format!("{} of {} trials failed", failures, runs);
    Some(
        line.if_supports_color(Stream::Stderr, |s| s.red())
            .to_string(),
    )
}
