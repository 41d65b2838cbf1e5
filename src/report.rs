use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{BoxStats, ChurnRecord, ChurnShare, GroupChurnCount};

const CHURNED: &str = "Yes";

pub fn churn_distribution(records: &[ChurnRecord]) -> Vec<ChurnShare> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.churn.as_str()).or_insert(0) += 1;
    }

    let total = records.len();
    let mut shares: Vec<ChurnShare> = counts
        .into_iter()
        .map(|(label, count)| ChurnShare {
            label: label.to_string(),
            count,
            percent: if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            },
        })
        .collect();

    // Largest group first; BTreeMap order breaks ties.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

pub fn churn_by<F>(records: &[ChurnRecord], group_of: F) -> Vec<GroupChurnCount>
where
    F: Fn(&ChurnRecord) -> &str,
{
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(group_of(record)).or_insert((0, 0));
        if record.churn == CHURNED {
            entry.0 += 1;
        } else {
            entry.1 += 1;
        }
    }

    groups
        .into_iter()
        .map(|(group, (churned, retained))| GroupChurnCount {
            group: group.to_string(),
            churned,
            retained,
        })
        .collect()
}

pub fn box_stats_by_churn<F>(records: &[ChurnRecord], value_of: F) -> Vec<BoxStats>
where
    F: Fn(&ChurnRecord) -> f64,
{
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.churn.as_str())
            .or_default()
            .push(value_of(record));
    }

    groups
        .into_iter()
        .filter_map(|(label, mut values)| {
            values.sort_by(|a, b| a.total_cmp(b));
            Some(BoxStats {
                label: label.to_string(),
                count: values.len(),
                min: *values.first()?,
                q1: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q3: quantile(&values, 0.75),
                max: *values.last()?,
            })
        })
        .collect()
}

/// Linear interpolation between closest ranks. `sorted` must be non-empty.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn write_group_section(output: &mut String, title: &str, groups: &[GroupChurnCount]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");

    if groups.is_empty() {
        let _ = writeln!(output, "No customers recorded.");
        return;
    }

    let _ = writeln!(output, "| Group | Churned | Stayed |");
    let _ = writeln!(output, "|---|---|---|");
    for group in groups {
        let _ = writeln!(
            output,
            "| {} | {} | {} |",
            group.group, group.churned, group.retained
        );
    }
}

fn write_box_section(output: &mut String, title: &str, stats: &[BoxStats]) {
    let _ = writeln!(output);
    let _ = writeln!(output, "## {title}");

    if stats.is_empty() {
        let _ = writeln!(output, "No customers recorded.");
        return;
    }

    let _ = writeln!(output, "| Churn | Count | Min | Q1 | Median | Q3 | Max |");
    let _ = writeln!(output, "|---|---|---|---|---|---|---|");
    for stat in stats {
        let _ = writeln!(
            output,
            "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} | {:.2} |",
            stat.label, stat.count, stat.min, stat.q1, stat.median, stat.q3, stat.max
        );
    }
}

pub fn build_dashboard(
    records: &[ChurnRecord],
    source: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Churn Insights Dashboard");
    let _ = writeln!(
        output,
        "Generated from {} ({} customers) at {}",
        source,
        records.len(),
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Churn Distribution");

    let shares = churn_distribution(records);
    if shares.is_empty() {
        let _ = writeln!(output, "No customers recorded.");
    } else {
        for share in shares.iter() {
            let _ = writeln!(
                output,
                "- {}: {} customers ({:.1}%)",
                share.label, share.count, share.percent
            );
        }
    }

    write_group_section(
        &mut output,
        "Churn by Contract Type",
        &churn_by(records, |record| record.contract.as_str()),
    );
    write_group_section(
        &mut output,
        "Churn by Internet Service",
        &churn_by(records, |record| record.internet_service.as_str()),
    );
    write_box_section(
        &mut output,
        "Monthly Charges vs Churn",
        &box_stats_by_churn(records, |record| record.monthly_charges),
    );
    write_box_section(
        &mut output,
        "Tenure vs Churn",
        &box_stats_by_churn(records, |record| record.tenure),
    );

    output
}
