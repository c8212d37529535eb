//! Natural-language queries over an in-memory table.

use super::{QueryEngine, TablePlan};
use crate::error::Result;
use crate::llm::ChatModel;
use crate::source::StructuredTable;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Rows shown to the model alongside the schema.
const SAMPLE_ROWS: usize = 5;

/// Result rows rendered back to the caller.
const MAX_RESULT_ROWS: usize = 50;

const PLANNER_PROMPT: &str = r#"You translate questions about a table into a JSON query plan.

Reply with a single JSON object and nothing else:
{
  "filters": [{"column": "<name>", "op": "eq|ne|gt|ge|lt|le|contains", "value": <value>}],
  "aggregate": {"op": "count|sum|mean|min|max", "column": "<name or null>", "group_by": "<name or null>"},
  "sort": {"column": "<name>", "descending": true},
  "select": ["<name>", ...],
  "limit": <number>
}

Every key is optional; omit what the question does not need.
Filters and aggregate use the table's columns. Sort, select and limit apply to
the result after aggregation, whose columns are the group_by column (if any)
followed by "<op>(<column>)" or "count"."#;

/// Answers questions about a table by planning a query with the model and
/// executing it locally.
pub struct TableQueryEngine {
    table: StructuredTable,
    model: Arc<dyn ChatModel>,
}

impl TableQueryEngine {
    pub fn new(table: StructuredTable, model: Arc<dyn ChatModel>) -> Self {
        Self { table, model }
    }

    fn planner_input(&self, question: &str) -> String {
        format!(
            "Columns:\n{}\n\nFirst {} rows:\n{}\n\nTotal rows: {}\n\nQuestion: {}",
            self.table.schema_description(),
            SAMPLE_ROWS,
            self.table.head(SAMPLE_ROWS).render(),
            self.table.num_rows(),
            question
        )
    }
}

#[async_trait]
impl QueryEngine for TableQueryEngine {
    #[instrument(skip(self))]
    async fn query(&self, input: &str) -> Result<String> {
        let reply = self
            .model
            .complete(PLANNER_PROMPT, &self.planner_input(input))
            .await?;
        debug!("Planner reply: {}", reply);

        let plan = TablePlan::from_reply(&reply)?;
        info!("Table query plan: {}", serde_json::to_string(&plan)?);

        let result = plan.execute(&self.table)?;
        let total = result.num_rows();
        if total == 0 {
            return Ok("No rows matched the query.".to_string());
        }

        let mut rendered = result.head(MAX_RESULT_ROWS).render();
        if total > MAX_RESULT_ROWS {
            rendered.push_str(&format!("\n({} of {} rows shown)", MAX_RESULT_ROWS, total));
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocQueryError;
    use crate::llm::testing::{text, ScriptedChat};
    use crate::source::Cell;

    fn sales() -> StructuredTable {
        StructuredTable::new(
            vec!["region".into(), "amount".into()],
            vec![
                vec![Cell::Text("north".into()), Cell::Int(10)],
                vec![Cell::Text("south".into()), Cell::Int(5)],
                vec![Cell::Text("north".into()), Cell::Int(7)],
            ],
        )
    }

    #[tokio::test]
    async fn test_plans_and_executes() {
        let model = Arc::new(ScriptedChat::new(vec![text(
            r#"{"aggregate": {"op": "sum", "column": "amount", "group_by": "region"}}"#,
        )]));
        let engine = TableQueryEngine::new(sales(), model.clone());

        let answer = engine.query("total amount per region?").await.unwrap();
        let lines: Vec<&str> = answer.lines().collect();
        assert_eq!(lines[0], "region | sum(amount)");
        assert_eq!(lines[2], "north  | 17");
        assert_eq!(lines[3], "south  | 5");

        let requests = model.requests.lock().unwrap();
        let prompt = format!("{:?}", requests[0]);
        assert!(prompt.contains("region (text)"));
        assert!(prompt.contains("total amount per region?"));
    }

    #[tokio::test]
    async fn test_no_matches() {
        let model = Arc::new(ScriptedChat::new(vec![text(
            r#"{"filters": [{"column": "amount", "op": "gt", "value": 100}]}"#,
        )]));
        let engine = TableQueryEngine::new(sales(), model);
        assert_eq!(
            engine.query("big sales?").await.unwrap(),
            "No rows matched the query."
        );
    }

    #[tokio::test]
    async fn test_bad_column_is_error() {
        let model = Arc::new(ScriptedChat::new(vec![text(r#"{"select": ["profit"]}"#)]));
        let engine = TableQueryEngine::new(sales(), model);
        let err = engine.query("profit?").await.unwrap_err();
        assert!(matches!(err, DocQueryError::Query(_)));
    }
}
