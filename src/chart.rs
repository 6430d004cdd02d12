//! Chart projections of query results.
//!
//! Everything here is a pure function of an already fetched result. Nothing aggregates,
//! sorts or fills gaps: the query is expected to produce chart-ready groupings itself.

use crate::models::{
    ChartKind, ChartSeries, ChartView, PieChart, PieSegment, QueryResult, Row, SeriesChart,
    DEFAULT_PALETTE,
};

pub const REST_SEGMENT: &str = "Rest";

/// Whether the rows look like a labelled value series: a text first column followed,
/// somewhere later in the first row, by a numeric column.
pub fn is_chartable(rows: &[Row]) -> bool {
    let Some(first) = rows.first() else {
        return false;
    };

    let mut first_is_text = false;
    for (index, value) in first.values().enumerate() {
        if index == 0 {
            first_is_text = value.is_text();
        } else if first_is_text && value.is_number() {
            return true;
        }
    }
    false
}

pub fn to_bar_series(result: &QueryResult) -> Option<SeriesChart> {
    to_bar_series_with_palette(result, &default_palette())
}

pub fn to_bar_series_with_palette(result: &QueryResult, palette: &[String]) -> Option<SeriesChart> {
    let first = result.rows.first()?;
    let key = first.keys().next()?.clone();

    let series = first
        .keys()
        .skip(1)
        .filter(|column| result.rows.iter().all(|row| row.contains_key(*column)))
        .enumerate()
        .map(|(index, column)| ChartSeries {
            name: column.clone(),
            color: pick_color(palette, index),
        })
        .collect();

    Some(SeriesChart {
        data: result.rows.clone(),
        key,
        series,
    })
}

/// Line charts read the same shape as bar charts.
pub fn to_line_series(result: &QueryResult) -> Option<SeriesChart> {
    to_bar_series(result)
}

pub fn to_pie_series(result: &QueryResult) -> PieChart {
    to_pie_series_with_palette(result, &default_palette())
}

/// One segment per row until the palette runs out, then a single trailing `Rest`
/// segment holding the sum of the remaining rows.
pub fn to_pie_series_with_palette(result: &QueryResult, palette: &[String]) -> PieChart {
    let mut data = Vec::new();
    let mut rest: Option<f64> = None;

    for row in &result.rows {
        let mut cells = row.values();
        let name = cells.next().map(|v| v.to_string()).unwrap_or_default();
        let value = cells.next().and_then(|v| v.as_f64()).unwrap_or(0.0);

        if data.len() < palette.len() {
            data.push(PieSegment {
                name,
                value,
                color: Some(palette[data.len()].clone()),
            });
        } else {
            *rest.get_or_insert(0.0) += value;
        }
    }

    if let Some(value) = rest {
        data.push(PieSegment {
            name: REST_SEGMENT.to_string(),
            value,
            color: None,
        });
    }

    PieChart { data }
}

/// Projection for the selected chart kind, or `None` for the table view and for results
/// that do not look chartable.
pub fn project(result: &QueryResult, kind: ChartKind, palette: &[String]) -> Option<ChartView> {
    if !is_chartable(&result.rows) {
        return None;
    }

    match kind {
        ChartKind::Table => None,
        ChartKind::Bar => to_bar_series_with_palette(result, palette).map(ChartView::Bar),
        ChartKind::Line => to_bar_series_with_palette(result, palette).map(ChartView::Line),
        ChartKind::Pie => Some(ChartView::Pie(to_pie_series_with_palette(result, palette))),
    }
}

fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn pick_color(palette: &[String], index: usize) -> Option<String> {
    if palette.is_empty() {
        None
    } else {
        Some(palette[index % palette.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn result(rows: Vec<Row>) -> QueryResult {
        QueryResult {
            rows,
            ..QueryResult::default()
        }
    }

    fn palette(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("#00000{}", i)).collect()
    }

    #[test]
    fn test_chartable_label_then_number() {
        let rows = vec![
            row(&[("url", "a".into()), ("count", 3i64.into())]),
            row(&[("url", "b".into()), ("count", 5i64.into())]),
        ];
        assert!(is_chartable(&rows));
    }

    #[test]
    fn test_not_chartable_without_text_first_column() {
        let rows = vec![row(&[("count", 3i64.into())]), row(&[("count", 5i64.into())])];
        assert!(!is_chartable(&rows));

        let rows = vec![row(&[("n", 1i64.into()), ("label", "a".into()), ("count", 3i64.into())])];
        assert!(!is_chartable(&rows));
    }

    #[test]
    fn test_not_chartable_when_empty() {
        assert!(!is_chartable(&[]));
    }

    #[test]
    fn test_chartable_number_after_other_text_columns() {
        let rows = vec![row(&[
            ("path", "/".into()),
            ("title", "Home".into()),
            ("views", 10i64.into()),
        ])];
        assert!(is_chartable(&rows));
    }

    #[test]
    fn test_numeric_looking_text_is_not_a_number() {
        let rows = vec![row(&[("path", "/".into()), ("views", "10".into())])];
        assert!(!is_chartable(&rows));
    }

    #[test]
    fn test_bar_series_key_and_consistent_columns() {
        let rows = vec![
            row(&[("day", "mon".into()), ("views", 3i64.into()), ("comments", 1i64.into())]),
            row(&[("day", "tue".into()), ("views", 5i64.into())]),
        ];
        let chart = to_bar_series_with_palette(&result(rows.clone()), &palette(2)).unwrap();

        assert_eq!(chart.key, "day");
        assert_eq!(
            chart.series,
            vec![ChartSeries {
                name: "views".to_string(),
                color: Some("#000000".to_string()),
            }]
        );
        assert_eq!(chart.data, rows);
    }

    #[test]
    fn test_bar_series_empty_result() {
        assert!(to_bar_series(&result(vec![])).is_none());
    }

    #[test]
    fn test_pie_within_palette_has_no_rest() {
        let rows = vec![
            row(&[("referrer", "search".into()), ("visits", 7i64.into())]),
            row(&[("referrer", "direct".into()), ("visits", 2i64.into())]),
        ];
        let pie = to_pie_series_with_palette(&result(rows), &palette(3));

        assert_eq!(pie.data.len(), 2);
        assert_eq!(pie.data[0].name, "search");
        assert_eq!(pie.data[0].value, 7.0);
        assert!(pie.data.iter().all(|s| s.name != REST_SEGMENT));
    }

    #[test]
    fn test_pie_overflow_sums_into_rest() {
        let rows: Vec<Row> = (1..=5)
            .map(|i| {
                row(&[
                    ("tag", format!("t{}", i).as_str().into()),
                    ("posts", (i as i64).into()),
                    ("ignored", 100i64.into()),
                ])
            })
            .collect();
        let pie = to_pie_series_with_palette(&result(rows), &palette(3));

        assert_eq!(pie.data.len(), 4);
        assert!(pie.data[..3].iter().all(|s| s.color.is_some()));
        assert_eq!(pie.data[2].value, 3.0);

        let rest = &pie.data[3];
        assert_eq!(rest.name, REST_SEGMENT);
        assert_eq!(rest.value, 4.0 + 5.0);
        assert_eq!(rest.color, None);
    }

    #[test]
    fn test_pie_non_numeric_value_counts_as_zero() {
        let rows = vec![row(&[("a", "x".into()), ("b", CellValue::Null)])];
        let pie = to_pie_series_with_palette(&result(rows), &palette(1));
        assert_eq!(pie.data[0].value, 0.0);
    }

    #[test]
    fn test_project_respects_kind_and_shape() {
        let chartable = result(vec![row(&[("url", "a".into()), ("count", 3i64.into())])]);
        let plain = result(vec![row(&[("count", 3i64.into())])]);

        assert!(project(&chartable, ChartKind::Table, &palette(2)).is_none());
        assert!(matches!(
            project(&chartable, ChartKind::Bar, &palette(2)),
            Some(ChartView::Bar(_))
        ));
        assert!(matches!(
            project(&chartable, ChartKind::Line, &palette(2)),
            Some(ChartView::Line(_))
        ));
        assert!(matches!(
            project(&chartable, ChartKind::Pie, &palette(2)),
            Some(ChartView::Pie(_))
        ));
        assert!(project(&plain, ChartKind::Bar, &palette(2)).is_none());
    }
}
