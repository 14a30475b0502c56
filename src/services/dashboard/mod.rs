pub mod axes;
pub mod format;
pub mod kpi;

use serde::Serialize;

pub use axes::{select_axes, ChartAxes};
pub use kpi::{build_kpis, KpiCard};

use crate::models::Dataset;

/// Default chart axes and KPI cards derived from a dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub chart_axes: ChartAxes,
    pub kpis: Vec<KpiCard>,
}

pub fn build_view(dataset: &Dataset) -> DashboardView {
    DashboardView {
        chart_axes: select_axes(dataset),
        kpis: build_kpis(dataset),
    }
}
