//! Plan and prior-year variance measures

use super::format::{PERCENT_FORMAT, metric_format};
use super::generator::MetricBinding;
use super::measure_ref;
use crate::models::DaxMeasure;
use crate::schema::humanize_metric;

pub const VARIANCE_FOLDER: &str = "Variance";

/// Comparison a variance is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    PriorYear,
    Plan,
}

impl Comparison {
    /// Metric suffix of the comparison series
    pub fn suffix(self) -> &'static str {
        match self {
            Comparison::PriorYear => "PY",
            Comparison::Plan => "PL",
        }
    }
}

/// Percentage variance of `actual` against `comparison`
///
/// Returns `None` (blank) when the comparison is zero or either value is not
/// finite, mirroring `DIVIDE(..., BLANK())`.
///
/// # Example
///
/// ```rust
/// use phantom_pbi_export::dax::variance_percent;
///
/// assert_eq!(variance_percent(110.0, 100.0), Some(0.1));
/// assert_eq!(variance_percent(5.0, 0.0), None);
/// ```
pub fn variance_percent(actual: f64, comparison: f64) -> Option<f64> {
    if comparison == 0.0 || !comparison.is_finite() || !actual.is_finite() {
        return None;
    }
    let ratio = (actual - comparison) / comparison;
    ratio.is_finite().then_some(ratio)
}

/// Whether a metric is itself a comparison series (`revenuePL`, `revenuePY`)
pub fn is_comparison_metric(metric: &str) -> bool {
    metric.ends_with("PL") || metric.ends_with("PY")
}

/// Variance measures for every actual binding with a PL or PY sibling.
///
/// `base_names` holds the base measure name of each binding, in the same
/// order as `bindings`.
pub fn variance_measures(bindings: &[MetricBinding], base_names: &[String]) -> Vec<DaxMeasure> {
    let mut measures = Vec::new();

    for (binding, actual_name) in bindings.iter().zip(base_names) {
        if is_comparison_metric(&binding.metric) {
            continue;
        }
        for comparison in [Comparison::PriorYear, Comparison::Plan] {
            let sibling = format!("{}{}", binding.metric, comparison.suffix());
            let Some(cmp_name) = sibling_measure(bindings, base_names, binding, &sibling) else {
                continue;
            };

            let label = humanize_metric(&binding.metric);
            let suffix = comparison.suffix();
            let diff = format!("{} - {}", measure_ref(actual_name), measure_ref(cmp_name));

            measures.push(
                DaxMeasure::new(format!("{} Δ{}", label, suffix), diff.clone())
                    .with_folder(VARIANCE_FOLDER)
                    .with_format(metric_format(&binding.metric))
                    .with_description(format!("{} minus {}", actual_name, cmp_name)),
            );
            measures.push(
                DaxMeasure::new(
                    format!("{} Δ{}%", label, suffix),
                    format!("DIVIDE({}, {}, BLANK())", diff, measure_ref(cmp_name)),
                )
                .with_folder(VARIANCE_FOLDER)
                .with_format(PERCENT_FORMAT)
                .with_description(format!(
                    "Change of {} against {}, blank when {} is zero",
                    actual_name, cmp_name, cmp_name
                )),
            );
        }
    }
    measures
}

/// Base measure of the sibling metric, preferring the same aggregation
fn sibling_measure<'a>(
    bindings: &[MetricBinding],
    base_names: &'a [String],
    actual: &MetricBinding,
    sibling: &str,
) -> Option<&'a String> {
    let candidates: Vec<usize> = bindings
        .iter()
        .enumerate()
        .filter(|(_, b)| b.metric.eq_ignore_ascii_case(sibling))
        .map(|(i, _)| i)
        .collect();
    let index = candidates
        .iter()
        .find(|i| bindings[**i].operation == actual.operation)
        .or_else(|| candidates.first())?;
    base_names.get(*index)
}
