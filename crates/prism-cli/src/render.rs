//! Rendering of a decomposition plan: SQL DDL, Mermaid ERD, README.

use prism::{Column, ColumnType, DecompositionPlan};

/// Render `CREATE TABLE` statements for every relation in the plan.
pub fn sql_ddl(plan: &DecompositionPlan, columns: &[Column]) -> String {
    let mut statements = Vec::new();

    for relation in &plan.relations {
        let mut lines = Vec::new();

        for col in &relation.columns {
            let profile = columns.iter().find(|c| &c.name == col);
            let sql_type = profile.map(sql_type_for).unwrap_or_else(|| "VARCHAR(255)".to_string());
            let nullable = if relation.primary_key.contains(col) {
                ""
            } else {
                " NULL"
            };
            lines.push(format!("    {} {}{}", col, sql_type, nullable));
        }

        lines.push(format!(
            "    PRIMARY KEY ({})",
            relation.primary_key.to_vec().join(", ")
        ));

        for fk in &relation.foreign_keys {
            lines.push(format!(
                "    FOREIGN KEY ({}) REFERENCES {}({})",
                fk.columns.join(", "),
                fk.parent_relation,
                fk.parent_key.join(", ")
            ));
        }

        statements.push(format!(
            "CREATE TABLE {} (\n{}\n);",
            relation.name,
            lines.join(",\n")
        ));
    }

    statements.join("\n\n")
}

fn sql_type_for(column: &Column) -> String {
    match column.inferred_type {
        ColumnType::Integer => {
            if column.max_length > 9 {
                "BIGINT".to_string()
            } else {
                "INTEGER".to_string()
            }
        }
        ColumnType::Float => "DOUBLE PRECISION".to_string(),
        ColumnType::Boolean => "BOOLEAN".to_string(),
        ColumnType::Date => "DATE".to_string(),
        _ => format!("VARCHAR({})", column.max_length + 50),
    }
}

/// Render a Mermaid entity-relationship diagram.
pub fn mermaid_erd(plan: &DecompositionPlan, columns: &[Column]) -> String {
    let mut lines = vec!["erDiagram".to_string()];

    for relation in &plan.relations {
        for fk in &relation.foreign_keys {
            lines.push(format!(
                "    {} ||--o{{ {} : has",
                fk.parent_relation, relation.name
            ));
        }
    }

    for relation in &plan.relations {
        lines.push(format!("    {} {{", relation.name));
        for col in &relation.columns {
            let kind = columns
                .iter()
                .find(|c| &c.name == col)
                .map(|c| mermaid_type_for(c.inferred_type))
                .unwrap_or("string");
            let pk = relation.primary_key.contains(col);
            let fk = relation
                .foreign_keys
                .iter()
                .any(|f| f.columns.contains(col));
            let marks = match (pk, fk) {
                (true, true) => " PK,FK",
                (true, false) => " PK",
                (false, true) => " FK",
                (false, false) => "",
            };
            lines.push(format!("        {} {}{}", kind, col, marks));
        }
        lines.push("    }".to_string());
    }

    lines.join("\n")
}

fn mermaid_type_for(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Integer => "int",
        ColumnType::Float => "float",
        ColumnType::Boolean => "boolean",
        ColumnType::Date => "date",
        _ => "string",
    }
}

/// Render the README accompanying a normalized schema.
pub fn readme(plan: &DecompositionPlan, source_file: &str) -> String {
    let table_list: String = plan
        .relations
        .iter()
        .map(|r| format!("- `{}.csv`: {}", r.name, r.columns.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    let fk_list: String = {
        let links: Vec<String> = plan
            .relations
            .iter()
            .flat_map(|r| {
                r.foreign_keys.iter().map(move |fk| {
                    format!(
                        "- `{}.{}` → `{}.{}`",
                        r.name,
                        fk.columns.join(","),
                        fk.parent_relation,
                        fk.parent_key.join(",")
                    )
                })
            })
            .collect();
        if links.is_empty() {
            "None".to_string()
        } else {
            links.join("\n")
        }
    };

    let unenforced = if plan.unenforced_dependencies.is_empty() {
        String::new()
    } else {
        let list: Vec<String> = plan
            .unenforced_dependencies
            .iter()
            .map(|fd| format!("- {}", fd))
            .collect();
        format!(
            "\n## Unenforceable Dependencies\n\n\
             These confirmed dependencies span multiple tables and cannot be\n\
             enforced by any single table's key; validate them with a join:\n\n{}\n",
            list.join("\n")
        )
    };

    format!(
        "# Normalized Database Schema\n\n\
         ## Source\n\
         - Original file: `{}`\n\
         - Target normal form: {}\n\n\
         ## Tables\n\n{}\n\n\
         ## Relationships\n\n{}\n{}\n\
         ## Files\n\n\
         - `tables/` - Normalized CSV files\n\
         - `schema.sql` - SQL DDL statements\n\
         - `erd.md` - Entity-relationship diagram (Mermaid)\n\
         - `plan.json` - Reusable decomposition plan\n\n\
         ## Re-running\n\n\
         To apply this decomposition to new data with the same structure:\n\n\
         ```bash\n\
         prism apply new_data.csv --plan plan.json --output-dir ./output\n\
         ```\n",
        source_file, plan.target, table_list, fk_list, unenforced
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism::{infer_keys, minimal_cover, synthesize_3nf, AttributeSet, FunctionalDependency};

    fn sample_plan() -> DecompositionPlan {
        let all: AttributeSet = ["sid", "sname", "did", "dname"].into_iter().collect();
        let cover = minimal_cover(&[
            FunctionalDependency::new(
                AttributeSet::single("sid"),
                ["sname", "did"].into_iter().collect(),
            ),
            FunctionalDependency::new(AttributeSet::single("did"), AttributeSet::single("dname")),
        ])
        .unwrap();
        let keys = infer_keys(&all, &cover);
        synthesize_3nf(&cover, &keys, &all).unwrap()
    }

    fn sample_columns() -> Vec<Column> {
        ["sid", "sname", "did", "dname"]
            .iter()
            .enumerate()
            .map(|(i, name)| Column {
                name: name.to_string(),
                position: i,
                inferred_type: ColumnType::Text,
                nullable: false,
                unique: false,
                distinct_count: 3,
                null_count: 0,
                max_length: 10,
                sample_values: vec![],
            })
            .collect()
    }

    #[test]
    fn test_ddl_contains_keys_and_references() {
        let plan = sample_plan();
        let ddl = sql_ddl(&plan, &sample_columns());

        assert!(ddl.contains("CREATE TABLE"));
        assert!(ddl.contains("PRIMARY KEY (sid)"));
        assert!(ddl.contains("PRIMARY KEY (did)"));
        assert!(ddl.contains("FOREIGN KEY (did)"));
        assert!(ddl.contains("VARCHAR(60)"));
    }

    #[test]
    fn test_erd_marks_keys() {
        let plan = sample_plan();
        let erd = mermaid_erd(&plan, &sample_columns());

        assert!(erd.starts_with("erDiagram"));
        assert!(erd.contains("||--o{"));
        assert!(erd.contains("string sid PK"));
        assert!(erd.contains("string did FK"));
    }

    #[test]
    fn test_readme_lists_tables() {
        let plan = sample_plan();
        let text = readme(&plan, "input.csv");
        assert!(text.contains("`input.csv`"));
        assert!(text.contains("prism apply"));
        for relation in &plan.relations {
            assert!(text.contains(&relation.name));
        }
    }
}
