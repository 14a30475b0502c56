use serde::Serialize;
use std::collections::HashMap;

use super::axes::unique_columns;
use super::format;
use crate::models::{ColumnType, Dataset, NumericStats};

const CURRENCY_KEYWORDS: &[&str] = &["valor", "venda", "total", "receita", "preço", "preco", "custo"];
const PERCENT_KEYWORDS: &[&str] = &["taxa", "percent", "%"];
const PEOPLE_KEYWORDS: &[&str] = &["cliente", "usuario", "usuário"];
const GROWTH_KEYWORDS: &[&str] = &["taxa", "percent", "crescimento"];
const AVERAGE_KEYWORDS: &[&str] = &["média", "media", "taxa", "preço", "preco"];

/// Sums larger than this are shown as an average instead.
const LARGE_TOTAL: f64 = 10_000.0;
const MIN_GROUPS: usize = 2;
const MAX_GROUPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Sum,
    Average,
    Count,
}

impl Metric {
    pub fn label(self) -> &'static str {
        match self {
            Metric::Sum => "Soma",
            Metric::Average => "Média",
            Metric::Count => "Total de registros",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Currency,
    Percentage,
    Number,
}

impl ValueFormat {
    pub fn render(self, value: f64) -> String {
        match self {
            ValueFormat::Currency => format::currency(value),
            ValueFormat::Percentage => format::percentage(value),
            ValueFormat::Number => format::number(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum KpiIcon {
    DollarSign,
    Users,
    TrendingUp,
    Activity,
    BarChart3,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCard {
    pub title: String,
    pub metric: Metric,
    pub metric_label: &'static str,
    pub value: f64,
    pub display: String,
    pub format: ValueFormat,
    pub icon: KpiIcon,
}

impl KpiCard {
    fn new(title: String, metric: Metric, value: f64, format: ValueFormat, icon: KpiIcon) -> Self {
        Self {
            title,
            metric,
            metric_label: metric.label(),
            value,
            display: format.render(value),
            format,
            icon,
        }
    }
}

/// A keyword rule: fires when the lowercased name contains any keyword.
struct NameRule<T> {
    keywords: &'static [&'static str],
    outcome: T,
}

const FORMAT_RULES: [NameRule<ValueFormat>; 2] = [
    NameRule { keywords: CURRENCY_KEYWORDS, outcome: ValueFormat::Currency },
    NameRule { keywords: PERCENT_KEYWORDS, outcome: ValueFormat::Percentage },
];

const ICON_RULES: [NameRule<KpiIcon>; 3] = [
    NameRule { keywords: CURRENCY_KEYWORDS, outcome: KpiIcon::DollarSign },
    NameRule { keywords: PEOPLE_KEYWORDS, outcome: KpiIcon::Users },
    NameRule { keywords: GROWTH_KEYWORDS, outcome: KpiIcon::TrendingUp },
];

/// Names are tried in order; within a name, rules are tried in order.
fn first_match<T: Copy>(rules: &[NameRule<T>], names: &[&str]) -> Option<T> {
    names.iter().find_map(|name| {
        let name = name.to_lowercase();
        rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| name.contains(kw)))
            .map(|rule| rule.outcome)
    })
}

pub fn value_format(names: &[&str]) -> ValueFormat {
    first_match(&FORMAT_RULES, names).unwrap_or(ValueFormat::Number)
}

pub fn icon(names: &[&str]) -> KpiIcon {
    first_match(&ICON_RULES, names).unwrap_or(KpiIcon::Activity)
}

type MetricPredicate = fn(&str, &NumericStats) -> bool;

/// Ordered; the first rule that applies picks the metric, otherwise `Sum`.
const METRIC_RULES: [(MetricPredicate, Metric); 2] = [
    (is_large_total, Metric::Average),
    (names_an_average, Metric::Average),
];

fn is_large_total(_: &str, stats: &NumericStats) -> bool {
    stats.sum.abs() > LARGE_TOTAL
}

fn names_an_average(column: &str, _: &NumericStats) -> bool {
    let column = column.to_lowercase();
    AVERAGE_KEYWORDS.iter().any(|kw| column.contains(kw))
}

pub fn column_metric(column: &str, stats: &NumericStats) -> Metric {
    METRIC_RULES
        .iter()
        .find(|(applies, _)| applies(column, stats))
        .map_or(Metric::Sum, |(_, metric)| *metric)
}

/// Builds the KPI cards for a dataset, most specific strategy first:
/// per-category sums, then one card per numeric column, then a row count.
pub fn build_kpis(dataset: &Dataset) -> Vec<KpiCard> {
    if dataset.row_count() == 0 {
        return Vec::new();
    }

    let numeric_columns: Vec<&str> = unique_columns(dataset)
        .filter(|column| dataset.column_type(column) == Some(ColumnType::Number))
        .collect();

    let Some(first_numeric) = numeric_columns.first().copied() else {
        tracing::debug!("No numeric columns, falling back to record count");
        return vec![KpiCard::new(
            Metric::Count.label().to_string(),
            Metric::Count,
            dataset.row_count() as f64,
            ValueFormat::Number,
            KpiIcon::BarChart3,
        )];
    };

    if let Some(category) = grouping_column(dataset) {
        tracing::debug!("Grouping KPIs by {} over {}", category, first_numeric);
        return grouped_kpis(dataset, category, first_numeric);
    }

    numeric_columns
        .iter()
        .filter_map(|&column| {
            let stats = dataset.column_stats(column)?.numeric?;
            let metric = column_metric(column, &stats);
            let value = match metric {
                Metric::Average => stats.avg,
                _ => stats.sum,
            };
            Some(KpiCard::new(
                column.to_string(),
                metric,
                value,
                value_format(&[column]),
                icon(&[column]),
            ))
        })
        .collect()
}

/// First string column, in declared order, with a small number of categories.
fn grouping_column(dataset: &Dataset) -> Option<&str> {
    unique_columns(dataset).find(|column| {
        dataset.column_type(column) == Some(ColumnType::String)
            && dataset
                .column_stats(column)
                .map_or(false, |stats| (MIN_GROUPS..=MAX_GROUPS).contains(&stats.unique_values))
    })
}

fn grouped_kpis(dataset: &Dataset, category: &str, numeric: &str) -> Vec<KpiCard> {
    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();

    for row in &dataset.data {
        let Some(label) = row.get(category).filter(|v| !v.is_empty()).map(|v| v.to_label()) else {
            continue;
        };
        let amount = row.get(numeric).and_then(|v| v.as_number()).unwrap_or(0.0);
        match sums.get_mut(&label) {
            Some(total) => *total += amount,
            None => {
                sums.insert(label.clone(), amount);
                order.push(label);
            }
        }
    }

    order
        .into_iter()
        .map(|label| {
            let total = sums.get(&label).copied().unwrap_or_default();
            let names = [numeric, label.as_str()];
            let (format, icon) = (value_format(&names), icon(&names));
            KpiCard::new(label, Metric::Sum, total, format, icon)
        })
        .collect()
}
