//! Unique "instance type / region" labels for chart axes.

use crate::config::ColumnNames;
use crate::dataset::{DatasetError, InstanceTable};

/// Header of the derived label column, e.g. `"Instance Type / Region"`.
pub fn label_column_name(columns: &ColumnNames) -> String {
    format!("{} / {}", columns.instance_type, columns.region)
}

/// Adds the label column, sorts rows by it and makes every label unique.
///
/// Returns the name of the label column.
pub fn add_label_column(
    table: &mut InstanceTable,
    columns: &ColumnNames,
) -> Result<String, DatasetError> {
    let instance_types = table.column(&columns.instance_type)?;
    let regions = table.column(&columns.region)?;
    let labels = instance_types
        .iter()
        .zip(regions.iter())
        .map(|(instance_type, region)| format!("{instance_type} / {region}"))
        .collect();

    let name = label_column_name(columns);
    table.set_column(&name, labels)?;
    table.sort_by_text(&name)?;

    let mut labels: Vec<String> = table
        .column(&name)?
        .into_iter()
        .map(str::to_owned)
        .collect();
    disambiguate(&mut labels);
    table.set_column(&name, labels)?;
    Ok(name)
}

/// Appends ` (n)` to every member of a run of equal adjacent labels.
///
/// `labels` must already be sorted so duplicates are contiguous. Counters start at 1
/// within each run; labels that occur once are left untouched.
pub fn disambiguate(labels: &mut [String]) {
    let mut start = 0;
    while start < labels.len() {
        let mut end = start + 1;
        while end < labels.len() && labels[end] == labels[start] {
            end += 1;
        }
        if end - start > 1 {
            for (counter, label) in labels[start..end].iter_mut().enumerate() {
                label.push_str(&format!(" ({})", counter + 1));
            }
        }
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn unique_labels_are_unchanged() {
        let mut labels = owned(&["a / x", "b / x", "c / y"]);
        disambiguate(&mut labels);
        assert_eq!(labels, owned(&["a / x", "b / x", "c / y"]));
    }

    #[test]
    fn counters_restart_per_group() {
        let mut labels = owned(&["a / x", "a / x", "a / x", "b / y", "c / z", "c / z"]);
        disambiguate(&mut labels);
        assert_eq!(
            labels,
            owned(&[
                "a / x (1)",
                "a / x (2)",
                "a / x (3)",
                "b / y",
                "c / z (1)",
                "c / z (2)"
            ])
        );
    }

    #[test]
    fn label_column_is_sorted_and_unique() {
        let csv = "Provider,Region,Instance Type\n\
            aws,us-west,B\n\
            aws,us-east,A\n\
            gcp,us-east,A\n";
        let mut table = InstanceTable::from_reader(csv.as_bytes()).expect("csv parses");
        let columns = ColumnNames::default();
        let name = add_label_column(&mut table, &columns).expect("labels added");

        assert_eq!(name, "Instance Type / Region");
        assert_eq!(
            table.column(&name).expect("label column"),
            vec!["A / us-east (1)", "A / us-east (2)", "B / us-west"]
        );
        assert_eq!(
            table.column("Provider").expect("provider column"),
            vec!["aws", "gcp", "aws"]
        );
    }
}
