use crate::chart;
use crate::models::{ChartKind, ChartView};
use crate::state::{AppState, ConsoleView};

/// Switch between the table and the chart views
pub fn set_chart_kind(state: &AppState, kind: ChartKind) -> ConsoleView {
    state.console().chart_kind = kind;
    state.view()
}

/// Projection of the displayed result for `kind`, without changing the selected view
pub fn preview_chart(state: &AppState, kind: ChartKind) -> Option<ChartView> {
    let palette = state.settings().chart_palette;
    let console = state.console();
    let result = console.displayed_result()?;
    chart::project(result, kind, &palette)
}
