use std::collections::{BTreeSet, HashMap, HashSet};

use crate::model::task::Task;

/// One row inside a swimlane group. `label` is the sub-swimlane name for
/// shared rows; private per-task rows carry no label and are never shown
/// as a sub-swimlane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRow {
    pub label: Option<String>,
    pub row: usize,
}

/// A swimlane and the contiguous row range `[from_row, to_row]` it spans,
/// used to size its header cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwimlaneGroup {
    pub label: String,
    pub rows: Vec<SubRow>,
    pub from_row: usize,
    pub to_row: usize,
}

/// The result of row grouping: ordered swimlane groups plus the total row
/// count. Tasks without a swimlane occupy trailing private rows and appear
/// in no group.
#[derive(Debug, Clone, Default)]
pub struct RowPlan {
    pub groups: Vec<SwimlaneGroup>,
    pub row_count: usize,
}

impl RowPlan {
    /// Assign row indices in place.
    ///
    /// Pass 1 walks tasks in input order; the first task of an unseen
    /// swimlane claims rows for every member of that swimlane at once, so a
    /// swimlane's rows are contiguous and groups keep first-seen order.
    /// Members sharing a sub-swimlane reuse its row; members without one
    /// get a private row. Tasks with no swimlane at all are appended after
    /// every group, one private row each. Pass 2 compacts the occupied set
    /// to `0..N-1`.
    pub fn assign(tasks: &mut [Task]) -> RowPlan {
        let mut next_row = 0usize;
        let mut assignments: Vec<usize> = vec![0; tasks.len()];
        let mut groups: Vec<SwimlaneGroup> = Vec::new();
        let mut seen_lanes: HashSet<String> = HashSet::new();

        for i in 0..tasks.len() {
            let Some(lane) = tasks[i].swimlane.clone() else {
                continue;
            };
            if !seen_lanes.insert(lane.clone()) {
                continue;
            }

            let mut rows: Vec<SubRow> = Vec::new();
            let mut shared: HashMap<String, usize> = HashMap::new();
            for j in i..tasks.len() {
                if tasks[j].swimlane.as_deref() != Some(lane.as_str()) {
                    continue;
                }
                let row = match tasks[j].sub_swimlane.clone() {
                    Some(sub) => *shared.entry(sub.clone()).or_insert_with(|| {
                        let row = next_row;
                        next_row += 1;
                        rows.push(SubRow {
                            label: Some(sub),
                            row,
                        });
                        row
                    }),
                    None => {
                        let row = next_row;
                        next_row += 1;
                        rows.push(SubRow { label: None, row });
                        row
                    }
                };
                assignments[j] = row;
            }
            groups.push(SwimlaneGroup {
                label: lane,
                rows,
                from_row: 0,
                to_row: 0,
            });
        }

        for (i, task) in tasks.iter().enumerate() {
            if task.swimlane.is_none() {
                assignments[i] = next_row;
                next_row += 1;
            }
        }

        compact(&mut assignments, &mut groups);

        for (task, row) in tasks.iter_mut().zip(&assignments) {
            task.row_index = *row;
        }
        let row_count = assignments.iter().map(|r| r + 1).max().unwrap_or(0);

        let plan = RowPlan { groups, row_count };
        log::debug!(
            "row plan: {} rows, {} swimlane group(s): {:?}",
            plan.row_count,
            plan.groups.len(),
            plan.groups
                .iter()
                .map(|g| (&g.label, g.from_row, g.to_row))
                .collect::<Vec<_>>()
        );
        plan
    }
}

/// Renumber the occupied rows to a gap-free `0..N-1`, preserving relative
/// order, and refresh every stored row reference (assignments and group
/// ranges).
fn compact(assignments: &mut [usize], groups: &mut [SwimlaneGroup]) {
    let used: BTreeSet<usize> = assignments.iter().copied().collect();
    let remap: HashMap<usize, usize> = used.iter().enumerate().map(|(new, &old)| (old, new)).collect();

    for row in assignments.iter_mut() {
        *row = remap[row];
    }
    for group in groups.iter_mut() {
        for sub in group.rows.iter_mut() {
            if let Some(&new) = remap.get(&sub.row) {
                sub.row = new;
            }
        }
        group.from_row = group.rows.iter().map(|s| s.row).min().unwrap_or(0);
        group.to_row = group.rows.iter().map(|s| s.row).max().unwrap_or(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: &str, lane: Option<&str>, sub: Option<&str>) -> Task {
        let day = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Task {
            id: id.to_string(),
            name: id.to_string(),
            start: day,
            end: day + chrono::Duration::days(1),
            progress: 0.0,
            dependencies: Vec::new(),
            swimlane: lane.map(str::to_string),
            sub_swimlane: sub.map(str::to_string),
            row_index: 0,
            invalid: false,
            editable: true,
            start_drag: true,
            end_drag: true,
            custom_class: None,
            colors: Default::default(),
        }
    }

    fn rows_of(tasks: &[Task]) -> Vec<usize> {
        tasks.iter().map(|t| t.row_index).collect()
    }

    #[test]
    fn shared_sub_swimlane_reuses_a_row() {
        let mut tasks = vec![
            task("a", Some("Ops"), Some("Infra")),
            task("b", Some("Ops"), Some("Infra")),
            task("c", Some("Ops"), Some("Deploy")),
        ];
        let plan = RowPlan::assign(&mut tasks);
        assert_eq!(rows_of(&tasks), [0, 0, 1]);
        assert_eq!(plan.row_count, 2);
        assert_eq!(plan.groups.len(), 1);
        assert_eq!(plan.groups[0].from_row, 0);
        assert_eq!(plan.groups[0].to_row, 1);
    }

    #[test]
    fn swimlane_members_without_sub_get_private_unlabeled_rows() {
        let mut tasks = vec![
            task("a", Some("Ops"), None),
            task("b", Some("Ops"), None),
        ];
        let plan = RowPlan::assign(&mut tasks);
        assert_eq!(rows_of(&tasks), [0, 1]);
        assert!(plan.groups[0].rows.iter().all(|s| s.label.is_none()));
    }

    #[test]
    fn interleaved_swimlanes_stay_contiguous_in_first_seen_order() {
        let mut tasks = vec![
            task("a", Some("Ops"), Some("Infra")),
            task("b", Some("QA"), Some("Manual")),
            task("c", Some("Ops"), Some("Deploy")),
            task("d", Some("QA"), Some("Manual")),
        ];
        let plan = RowPlan::assign(&mut tasks);
        // Ops claims rows 0..=1 up front, QA follows with row 2
        assert_eq!(rows_of(&tasks), [0, 2, 1, 2]);
        assert_eq!(plan.groups[0].label, "Ops");
        assert_eq!((plan.groups[0].from_row, plan.groups[0].to_row), (0, 1));
        assert_eq!(plan.groups[1].label, "QA");
        assert_eq!((plan.groups[1].from_row, plan.groups[1].to_row), (2, 2));
    }

    #[test]
    fn loose_tasks_trail_in_input_order() {
        let mut tasks = vec![
            task("x", None, None),
            task("a", Some("Ops"), Some("Infra")),
            task("y", None, None),
        ];
        let plan = RowPlan::assign(&mut tasks);
        assert_eq!(rows_of(&tasks), [1, 0, 2]);
        assert_eq!(plan.row_count, 3);
        // loose tasks belong to no group
        assert_eq!(plan.groups.len(), 1);
    }

    #[test]
    fn occupied_rows_form_a_contiguous_range() {
        let mut tasks = vec![
            task("a", Some("Ops"), Some("Infra")),
            task("b", Some("Ops"), Some("Infra")),
            task("c", Some("QA"), None),
            task("d", None, None),
        ];
        let plan = RowPlan::assign(&mut tasks);
        let used: BTreeSet<usize> = tasks.iter().map(|t| t.row_index).collect();
        assert_eq!(used, (0..plan.row_count).collect::<BTreeSet<_>>());
    }

    #[test]
    fn compaction_closes_gaps_preserving_order() {
        let mut assignments = vec![0, 2, 5, 5, 9];
        let mut groups = vec![SwimlaneGroup {
            label: "Ops".into(),
            rows: vec![
                SubRow {
                    label: Some("Infra".into()),
                    row: 2,
                },
                SubRow { label: None, row: 5 },
            ],
            from_row: 0,
            to_row: 0,
        }];
        compact(&mut assignments, &mut groups);
        assert_eq!(assignments, [0, 1, 2, 2, 3]);
        assert_eq!(groups[0].rows[0].row, 1);
        assert_eq!(groups[0].rows[1].row, 2);
        assert_eq!((groups[0].from_row, groups[0].to_row), (1, 2));
    }
}
