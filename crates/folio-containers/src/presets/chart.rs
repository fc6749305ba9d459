//! Chart blocks.
//!
//! ```text
//! ::: chart bar {"title": "Downloads"}
//! Jan: 120
//! Feb: 200
//! :::
//! ```
//!
//! The body is data, not markdown. It is parsed according to the chart type
//! into [`ChartData`], turned into an `ECharts` option object and rendered as
//! a self-closing `VChart` component.
//!
//! Body formats:
//!
//! - `line`, `bar`, `area`: `Category: value` lines for one series, or
//!   `Series | Cat1: v1, Cat2: v2` lines for several
//! - `pie`, `doughnut`, `funnel`: `Name: value` lines
//! - `scatter`: `x, y[, ...]` lines
//! - `gauge`: a single value
//! - `radar`: `Series | Axis1: v1, Axis2: v2` lines

use std::collections::HashMap;

use folio_markdown::{
    BlockConfig, BlockRule, BlockState, ChartSpec, ConfigValue, MarkdownEngine, Plugin, TokenMeta, rules,
};
use serde_json::{Map, Value, json};

use crate::attrs::{AttrFragment, AttributeSet};
use crate::scan::{MIN_MARKER_LEN, find_block_end, marker_len, strip_name};

/// Block name and token kind.
const CHART: &str = "chart";

/// Config keys read by the renderer or the option builder instead of being
/// copied into the option. A string `title` is consumed as well.
const RESERVED_KEYS: &[&str] = &["subtitle", "width", "height", "theme", "smooth", "legend"];

/// One named row of values.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: Vec<f64>,
}

/// One named value.
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub name: String,
    pub value: f64,
}

/// Parsed body of a chart block.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ChartData {
    /// Category axis with one or more series.
    Categories { categories: Vec<String>, series: Vec<Series> },
    /// Named values.
    Items(Vec<Item>),
    /// Numeric tuples.
    Points(Vec<Vec<f64>>),
    /// A single reading.
    Gauge(f64),
    /// Indicator axes with one value row per series.
    Radar { indicators: Vec<String>, series: Vec<Series> },
    /// Chart type without a body format.
    #[default]
    Empty,
}

impl ChartData {
    /// Parse the body lines of a `chart_type` block. Blank lines are skipped.
    pub fn parse(chart_type: &str, body: &str) -> Self {
        let lines: Vec<&str> = body.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        match chart_type {
            "line" | "bar" | "area" => parse_categories(&lines),
            "pie" | "doughnut" | "funnel" => Self::Items(
                lines
                    .iter()
                    .filter_map(|line| line.split_once(':'))
                    .map(|(name, value)| Item {
                        name: name.trim().to_owned(),
                        value: parse_number(value),
                    })
                    .collect(),
            ),
            "scatter" => Self::Points(
                lines
                    .iter()
                    .map(|line| line.split(',').map(parse_number).collect::<Vec<_>>())
                    .filter(|point| point.len() >= 2)
                    .collect(),
            ),
            "gauge" => Self::Gauge(lines.first().map_or(0.0, |line| parse_number(line))),
            "radar" => parse_radar(&lines),
            _ => Self::Empty,
        }
    }
}

fn parse_categories(lines: &[&str]) -> ChartData {
    let mut categories: Vec<String> = Vec::new();
    let mut rows: Vec<(Series, Option<HashMap<String, f64>>)> = Vec::new();

    for line in lines {
        if line.contains('|') {
            let mut parts = line.split('|');
            let name = parts.next().unwrap_or_default().trim();
            let points = keyed_points(parts.next().unwrap_or_default(), &mut categories);
            rows.push((named_series(name, Vec::new()), Some(points)));
        } else if let Some((category, value)) = line.split_once(':') {
            categories.push(category.trim().to_owned());
            if rows.is_empty() {
                rows.push((named_series("Series 1", Vec::new()), None));
            }
            if let Some((first, _)) = rows.first_mut() {
                first.data.push(parse_number(value));
            }
        }
    }

    // Keyed rows are laid out along the full category axis.
    let series = rows
        .into_iter()
        .map(|(mut row, points)| {
            if let Some(points) = points {
                row.data = lookup_all(&categories, &points);
            }
            row
        })
        .collect();

    ChartData::Categories { categories, series }
}

fn parse_radar(lines: &[&str]) -> ChartData {
    let mut indicators: Vec<String> = Vec::new();
    let mut rows: Vec<(String, HashMap<String, f64>)> = Vec::new();

    for line in lines {
        let mut parts = line.split('|');
        let (Some(name), Some(pairs)) = (parts.next(), parts.next()) else {
            continue;
        };
        let name = name.trim();
        let points = keyed_points(pairs, &mut indicators);
        match rows.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some(row) => row.1 = points,
            None => rows.push((name.to_owned(), points)),
        }
    }

    let series = rows
        .into_iter()
        .map(|(name, points)| named_series(&name, lookup_all(&indicators, &points)))
        .collect();

    ChartData::Radar { indicators, series }
}

/// Parse `Key: value, Key: value`, recording first-seen keys in `keys`.
fn keyed_points(pairs: &str, keys: &mut Vec<String>) -> HashMap<String, f64> {
    let mut points = HashMap::new();
    for pair in pairs.split(',') {
        let (key, value) = pair.split_once(':').unwrap_or((pair, ""));
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_owned());
        }
        points.insert(key.to_owned(), parse_number(value));
    }
    points
}

fn lookup_all(keys: &[String], points: &HashMap<String, f64>) -> Vec<f64> {
    keys.iter().map(|k| points.get(k).copied().unwrap_or(0.0)).collect()
}

fn named_series(name: &str, data: Vec<f64>) -> Series {
    Series {
        name: name.to_owned(),
        data,
    }
}

/// Leading decimal number of `text`, zero when there is none.
///
/// `12%` reads as 12 and `n/a` as 0.
fn parse_number(text: &str) -> f64 {
    let text = text.trim();
    let len = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
        .unwrap_or(text.len());
    (1..=len)
        .rev()
        .find_map(|n| text[..n].parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Whole numbers serialize without a fraction; non-finite values as `null`.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number(value: f64) -> Value {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        json!(value as i64)
    } else {
        serde_json::Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

fn numbers(values: &[f64]) -> Vec<Value> {
    values.iter().copied().map(number).collect()
}

fn items(items: &[Item]) -> Vec<Value> {
    items
        .iter()
        .map(|item| json!({"name": item.name, "value": number(item.value)}))
        .collect()
}

fn axis(kind: &str) -> Value {
    json!({"type": kind, "axisLabel": {"show": true}, "axisTick": {"show": true}})
}

/// Build the `ECharts` option object for a chart block.
///
/// A string `title` becomes a centered title with `subtitle` as subtext.
/// Keys outside the ones read here are copied into the option as-is, so
/// blocks can set any top-level option directly.
pub fn chart_option(chart_type: &str, data: &ChartData, config: &BlockConfig) -> Value {
    let title = config.get("title").and_then(ConfigValue::as_str).filter(|t| !t.is_empty());
    let smooth = config.is_truthy("smooth");

    let mut option = Map::new();
    option.insert("animation".to_owned(), json!(true));
    option.insert("animationDuration".to_owned(), json!(750));

    if let Some(title) = title {
        option.insert(
            "title".to_owned(),
            json!({
                "text": title,
                "subtext": config.display_or("subtitle", ""),
                "left": "center",
                "textStyle": {"fontSize": 16, "fontWeight": "bold"},
            }),
        );
    }

    let tooltip = match chart_type {
        "pie" | "doughnut" => json!({"trigger": "item", "formatter": "{b}: {c} ({d}%)"}),
        "radar" => json!({"trigger": "item"}),
        "gauge" => json!({"trigger": "item", "formatter": "{a} <br/>{b}: {c}%"}),
        _ => json!({"trigger": "axis", "axisPointer": {"type": "shadow"}}),
    };
    option.insert("tooltip".to_owned(), tooltip);

    if matches!(chart_type, "line" | "bar" | "area" | "scatter") {
        let top = if title.is_some() { "22%" } else { "8%" };
        option.insert(
            "grid".to_owned(),
            json!({"left": "3%", "right": "4%", "bottom": "3%", "top": top, "containLabel": true}),
        );
    }

    let series = match (chart_type, data) {
        ("line" | "bar" | "area", ChartData::Categories { categories, series }) => {
            let mut x_axis = axis("category");
            x_axis["data"] = json!(categories);
            option.insert("xAxis".to_owned(), x_axis);
            option.insert("yAxis".to_owned(), axis("value"));

            let area = chart_type == "area";
            let entries = series
                .iter()
                .map(|s| {
                    let kind = if area { "line" } else { chart_type };
                    let mut entry = json!({
                        "name": s.name,
                        "data": numbers(&s.data),
                        "type": kind,
                        "smooth": smooth,
                    });
                    if area {
                        entry["areaStyle"] = json!({});
                    }
                    entry
                })
                .collect();
            Some(entries)
        }
        ("pie" | "doughnut", ChartData::Items(values)) => {
            let radius = if chart_type == "doughnut" {
                json!(["40%", "70%"])
            } else {
                json!("50%")
            };
            Some(vec![json!({
                "name": title.unwrap_or("Distribution"),
                "type": "pie",
                "radius": radius,
                "data": items(values),
            })])
        }
        ("funnel", ChartData::Items(values)) => {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| b.value.total_cmp(&a.value));
            Some(vec![json!({"type": "funnel", "data": items(&sorted)})])
        }
        ("scatter", ChartData::Points(points)) => {
            option.insert("xAxis".to_owned(), axis("value"));
            option.insert("yAxis".to_owned(), axis("value"));
            let points: Vec<Vec<Value>> = points.iter().map(|p| numbers(p)).collect();
            Some(vec![json!({
                "name": "Points",
                "type": "scatter",
                "data": points,
                "symbolSize": 8,
            })])
        }
        ("gauge", ChartData::Gauge(value)) => Some(vec![json!({
            "type": "gauge",
            "data": [{"value": number(*value), "name": "Score"}],
        })]),
        ("radar", ChartData::Radar { indicators, series }) => {
            let max = series
                .iter()
                .flat_map(|s| s.data.iter().copied())
                .fold(f64::NEG_INFINITY, f64::max)
                * 1.2;
            let indicator: Vec<Value> = indicators
                .iter()
                .map(|name| json!({"name": name, "max": number(max)}))
                .collect();
            option.insert("radar".to_owned(), json!({"indicator": indicator}));

            let data: Vec<Value> = series
                .iter()
                .map(|s| json!({"name": s.name, "value": numbers(&s.data)}))
                .collect();
            Some(vec![json!({"type": "radar", "data": data})])
        }
        _ => None,
    };

    if let Some(series) = series {
        let radar_data = (chart_type == "radar")
            .then(|| series.first().and_then(|s| s["data"].as_array()))
            .flatten();
        let show_legend = series.len() > 1
            || config.is_truthy("legend")
            || radar_data.is_some_and(|data| data.len() > 1);

        if show_legend {
            let names: Vec<&str> = match radar_data {
                Some(data) => data.iter().filter_map(|d| d["name"].as_str()).collect(),
                None => series.iter().filter_map(|s| s["name"].as_str()).collect(),
            };
            let names: Vec<&str> = names.into_iter().filter(|n| !n.is_empty()).collect();
            let top = if title.is_some() { "15%" } else { "5%" };
            let legend = json!({"top": top, "left": "center", "data": names});
            option.insert("legend".to_owned(), legend);
        }
        option.insert("series".to_owned(), Value::Array(series));
    }

    for (key, value) in config.iter() {
        let consumed = RESERVED_KEYS.contains(&key) || (key == "title" && value.as_str().is_some());
        if !consumed {
            option.insert(key.to_owned(), Value::from(value));
        }
    }

    Value::Object(option)
}

/// `VChart` component with the option bound as JSON.
fn render_chart(spec: &ChartSpec) -> String {
    let config = &spec.config;
    let attrs: AttributeSet = [
        AttrFragment::bound("options", spec.option.to_string()),
        AttrFragment::attr("width", config.display_or("width", "100%")),
        AttrFragment::attr("height", config.display_or("height", "400px")),
        AttrFragment::attr("theme", config.display_or("theme", "auto")),
        AttrFragment::bound("auto-resize", "true"),
        AttrFragment::class("markdown-chart"),
    ]
    .into_iter()
    .collect();
    format!("<VChart{} />", attrs.render())
}

/// Block rule for `::: chart <type> [json]`.
struct ChartRule;

impl ChartRule {
    fn parse_config(payload: &str, state: &mut BlockState<'_>) -> BlockConfig {
        if payload.is_empty() {
            return BlockConfig::new();
        }
        BlockConfig::from_json(payload).unwrap_or_else(|e| {
            tracing::warn!(error = %e, payload, "Invalid chart config");
            state.warn(format!("[chart] Invalid JSON config: {payload}"));
            BlockConfig::new()
        })
    }
}

impl BlockRule for ChartRule {
    fn name(&self) -> &str {
        CHART
    }

    fn terminates_paragraph(&self) -> bool {
        true
    }

    fn run(&self, state: &mut BlockState<'_>, start: usize, end: usize, silent: bool) -> bool {
        if state.is_code_indent(start) {
            return false;
        }
        let text = state.line_text(start);
        let marker = marker_len(text);
        if marker < MIN_MARKER_LEN {
            return false;
        }

        let Some(rest) = strip_name(text[marker..].trim(), CHART, &[]) else {
            return false;
        };
        let rest = rest.trim();
        let (chart_type, payload) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if chart_type.is_empty() || !chart_type.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return false;
        }
        if silent {
            return true;
        }

        let config = Self::parse_config(payload.trim(), state);
        let block_end = find_block_end(state, start, end, marker);
        let body: Vec<&str> = (start + 1..block_end.next).map(|line| state.line_text(line)).collect();
        let body = body.join("\n");

        let data = ChartData::parse(chart_type, &body);
        if data == ChartData::Empty {
            tracing::warn!(chart_type, line = start, "Unsupported chart type, rendering without series");
        }
        let option = chart_option(chart_type, &data, &config);

        let token = state.push(CHART, "div", 0);
        token.markup = ":".repeat(marker);
        token.info = chart_type.to_owned();
        token.content = body;
        token.map = Some((start, block_end.next + usize::from(block_end.closed)));
        token.meta = Some(TokenMeta::Chart(ChartSpec {
            chart_type: chart_type.to_owned(),
            config,
            option,
        }));

        state.line = block_end.next + usize::from(block_end.closed);
        true
    }
}

/// `::: chart <type> {json}` blocks rendered as `VChart`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Charts;

impl Plugin for Charts {
    fn install(&self, md: &mut MarkdownEngine) {
        md.block.before(rules::PARAGRAPH, ChartRule);
        md.renderer.set_rule(CHART, |tokens, idx, _env| {
            tokens[idx]
                .meta
                .as_ref()
                .and_then(TokenMeta::chart)
                .map(render_chart)
                .unwrap_or_default()
        });
    }
}
