//! Structured table queries planned by the model and executed locally.

use crate::error::{DocQueryError, Result};
use crate::source::{Cell, StructuredTable};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A query over one table.
///
/// Filters and the aggregate refer to the loaded table's columns; `sort`,
/// `select` and `limit` apply to the result after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePlan {
    pub select: Vec<String>,
    pub filters: Vec<Filter>,
    pub aggregate: Option<Aggregate>,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    #[serde(alias = "=", alias = "==")]
    Eq,
    #[serde(alias = "!=")]
    Ne,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = ">=")]
    Ge,
    #[serde(alias = "<")]
    Lt,
    #[serde(alias = "<=")]
    Le,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub op: AggregateOp,
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    Count,
    Sum,
    #[serde(alias = "avg", alias = "average")]
    Mean,
    Min,
    Max,
}

impl AggregateOp {
    fn label(&self) -> &'static str {
        match self {
            AggregateOp::Count => "count",
            AggregateOp::Sum => "sum",
            AggregateOp::Mean => "mean",
            AggregateOp::Min => "min",
            AggregateOp::Max => "max",
        }
    }
}

impl Filter {
    fn matches(&self, cell: &Cell) -> bool {
        let target = json_to_cell(&self.value);

        match self.op {
            FilterOp::Eq => cells_equal(cell, &target),
            FilterOp::Ne => !cells_equal(cell, &target),
            FilterOp::Contains => cell
                .to_string()
                .to_lowercase()
                .contains(&target.to_string().to_lowercase()),
            ordering_op => {
                if cell.is_empty() || target.is_empty() {
                    return false;
                }
                // Numbers and text are not ordered against each other
                if cell.as_f64().is_some() != target.as_f64().is_some() {
                    return false;
                }
                let ord = cell.sort_cmp(&target);
                match ordering_op {
                    FilterOp::Gt => ord == Ordering::Greater,
                    FilterOp::Ge => ord != Ordering::Less,
                    FilterOp::Lt => ord == Ordering::Less,
                    _ => ord != Ordering::Greater,
                }
            }
        }
    }
}

fn json_to_cell(value: &serde_json::Value) -> Cell {
    match value {
        serde_json::Value::Null => Cell::Empty,
        serde_json::Value::Bool(b) => Cell::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Cell::Int(i),
            None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Empty),
        },
        serde_json::Value::String(s) => Cell::infer(s),
        other => Cell::Text(other.to_string()),
    }
}

fn cells_equal(a: &Cell, b: &Cell) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.to_string().trim().eq_ignore_ascii_case(b.to_string().trim()),
    }
}

fn resolve(table: &StructuredTable, name: &str) -> Result<usize> {
    table.column_index(name).ok_or_else(|| {
        DocQueryError::Query(format!(
            "Unknown column '{}'. Available columns: {}",
            name,
            table.columns().join(", ")
        ))
    })
}

impl TablePlan {
    /// Parse a plan from a model reply that contains a JSON object.
    pub fn from_reply(reply: &str) -> Result<Self> {
        let json = super::extract_json(reply).ok_or_else(|| {
            DocQueryError::Query(format!("No query plan found in model reply: {}", reply))
        })?;
        serde_json::from_str(json)
            .map_err(|e| DocQueryError::Query(format!("Invalid query plan: {}", e)))
    }

    /// Run the plan against `table`, producing a new table.
    pub fn execute(&self, table: &StructuredTable) -> Result<StructuredTable> {
        let filters = self
            .filters
            .iter()
            .map(|f| resolve(table, &f.column).map(|i| (i, f)))
            .collect::<Result<Vec<_>>>()?;

        let rows: Vec<Vec<Cell>> = table
            .rows()
            .iter()
            .filter(|row| filters.iter().all(|(i, f)| f.matches(&row[*i])))
            .cloned()
            .collect();

        let mut result = match &self.aggregate {
            Some(agg) => aggregate(table, rows, agg)?,
            None => StructuredTable::new(table.columns().to_vec(), rows),
        };

        if let Some(sort) = &self.sort {
            let idx = resolve(&result, &sort.column)?;
            let mut rows = result.rows().to_vec();
            rows.sort_by(|a, b| {
                let ord = a[idx].sort_cmp(&b[idx]);
                // Empty cells stay last in both directions
                if sort.descending && !a[idx].is_empty() && !b[idx].is_empty() {
                    ord.reverse()
                } else {
                    ord
                }
            });
            result = StructuredTable::new(result.columns().to_vec(), rows);
        }

        if !self.select.is_empty() {
            let indices = self
                .select
                .iter()
                .map(|name| resolve(&result, name))
                .collect::<Result<Vec<_>>>()?;
            let columns = indices.iter().map(|i| result.columns()[*i].clone()).collect();
            let rows = result
                .rows()
                .iter()
                .map(|row| indices.iter().map(|i| row[*i].clone()).collect())
                .collect();
            result = StructuredTable::new(columns, rows);
        }

        if let Some(limit) = self.limit {
            result = result.head(limit);
        }

        Ok(result)
    }
}

fn aggregate(
    table: &StructuredTable,
    rows: Vec<Vec<Cell>>,
    agg: &Aggregate,
) -> Result<StructuredTable> {
    let value_idx = agg.column.as_deref().map(|c| resolve(table, c)).transpose()?;
    if value_idx.is_none() && agg.op != AggregateOp::Count {
        return Err(DocQueryError::Query(format!(
            "Aggregate '{}' needs a column",
            agg.op.label()
        )));
    }

    let value_header = match value_idx {
        Some(i) => format!("{}({})", agg.op.label(), table.columns()[i]),
        None => agg.op.label().to_string(),
    };

    match &agg.group_by {
        None => Ok(StructuredTable::new(
            vec![value_header],
            vec![vec![reduce(agg.op, value_idx, &rows)]],
        )),
        Some(group_name) => {
            let group_idx = resolve(table, group_name)?;

            // Groups keep first-seen order
            let mut groups: Vec<(Cell, Vec<Vec<Cell>>)> = Vec::new();
            for row in rows {
                let key = row[group_idx].clone();
                match groups.iter_mut().find(|(k, _)| cells_equal(k, &key)) {
                    Some((_, members)) => members.push(row),
                    None => groups.push((key, vec![row])),
                }
            }

            let out = groups
                .into_iter()
                .map(|(key, members)| vec![key, reduce(agg.op, value_idx, &members)])
                .collect();
            Ok(StructuredTable::new(
                vec![table.columns()[group_idx].clone(), value_header],
                out,
            ))
        }
    }
}

fn reduce(op: AggregateOp, column: Option<usize>, rows: &[Vec<Cell>]) -> Cell {
    let Some(idx) = column else {
        return Cell::Int(rows.len() as i64);
    };
    let values = rows.iter().map(|r| &r[idx]).filter(|c| !c.is_empty());

    match op {
        AggregateOp::Count => Cell::Int(values.count() as i64),
        AggregateOp::Min => values.min_by(|a, b| a.sort_cmp(b)).cloned().unwrap_or(Cell::Empty),
        AggregateOp::Max => values.max_by(|a, b| a.sort_cmp(b)).cloned().unwrap_or(Cell::Empty),
        AggregateOp::Sum | AggregateOp::Mean => {
            let numbers: Vec<&Cell> = values.filter(|c| c.as_f64().is_some()).collect();
            let total: f64 = numbers.iter().filter_map(|c| c.as_f64()).sum();
            let all_ints = numbers.iter().all(|c| matches!(c, Cell::Int(_)));

            if op == AggregateOp::Sum {
                let int_total = if all_ints {
                    numbers.iter().try_fold(0i64, |acc, c| match c {
                        Cell::Int(i) => acc.checked_add(*i),
                        _ => None,
                    })
                } else {
                    None
                };
                // Overflowing integer sums fall back to a float total
                match int_total {
                    Some(sum) => Cell::Int(sum),
                    None => Cell::Float(total),
                }
            } else if numbers.is_empty() {
                Cell::Empty
            } else {
                Cell::Float(total / numbers.len() as f64)
            }
        }
    }
}
