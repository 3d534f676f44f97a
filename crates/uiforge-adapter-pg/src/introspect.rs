use chrono::Utc;
use sqlx::{PgPool, Row};
use std::collections::BTreeMap;
use tracing::warn;

use uiforge_core::{FieldMeta, FieldType, ModelSchema, SchemaDefinition};

const SNAPSHOT_VERSION: &str = "1.0.0";

/// Introspect a Postgres database into a model schema snapshot.
/// Excludes system schemas (pg_catalog, information_schema).
pub async fn introspect_models(database_url: &str) -> anyhow::Result<SchemaDefinition> {
    let pool = PgPool::connect(database_url).await?;

    // Enum labels, keyed by type name, in declared order.
    let enum_rows = sqlx::query(
        r#"
        select t.typname, e.enumlabel
        from pg_type t
        join pg_enum e on e.enumtypid = t.oid
        order by t.typname, e.enumsortorder
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut enums: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for row in enum_rows {
        let typname: String = row.get("typname");
        let label: String = row.get("enumlabel");
        enums.entry(typname).or_default().push(label);
    }

    let table_rows = sqlx::query(
        r#"
        select table_schema, table_name
        from information_schema.tables
        where table_type = 'BASE TABLE'
          and table_schema not in ('pg_catalog', 'information_schema')
        order by table_schema, table_name
        "#,
    )
    .fetch_all(&pool)
    .await?;

    let mut models = Vec::new();

    for row in table_rows {
        let table_schema: String = row.get("table_schema");
        let table_name: String = row.get("table_name");

        // Primary key columns
        let pk_rows = sqlx::query(
            r#"
            select kcu.column_name
            from information_schema.table_constraints tc
            join information_schema.key_column_usage kcu
              on tc.constraint_name = kcu.constraint_name
             and tc.table_schema = kcu.table_schema
            where tc.constraint_type = 'PRIMARY KEY'
              and tc.table_schema = $1
              and tc.table_name = $2
            order by kcu.ordinal_position
            "#,
        )
        .bind(&table_schema)
        .bind(&table_name)
        .fetch_all(&pool)
        .await?;

        let pk_columns: Vec<String> = pk_rows
            .into_iter()
            .map(|r| r.get::<String, _>("column_name"))
            .collect();

        let primary_key = match pk_columns.as_slice() {
            [] => {
                warn!(table = %table_name, "table has no primary key, skipping");
                continue;
            }
            [single] => single.clone(),
            [first, ..] => {
                warn!(
                    table = %table_name,
                    "composite primary key, using leading column '{first}'"
                );
                first.clone()
            }
        };

        // Foreign keys: referencing column -> referenced table.
        let fk_rows = sqlx::query(
            r#"
            select
              kcu.column_name as column_name,
              ccu.table_name as foreign_table_name
            from information_schema.table_constraints tc
            join information_schema.key_column_usage kcu
              on tc.constraint_name = kcu.constraint_name
             and tc.table_schema = kcu.table_schema
            join information_schema.constraint_column_usage ccu
              on ccu.constraint_name = tc.constraint_name
             and ccu.table_schema = tc.table_schema
            where tc.constraint_type = 'FOREIGN KEY'
              and tc.table_schema = $1
              and tc.table_name = $2
            order by tc.constraint_name, kcu.ordinal_position
            "#,
        )
        .bind(&table_schema)
        .bind(&table_name)
        .fetch_all(&pool)
        .await?;

        let mut fk_targets: BTreeMap<String, String> = BTreeMap::new();
        for fk in fk_rows {
            let column_name: String = fk.get("column_name");
            let foreign_table_name: String = fk.get("foreign_table_name");
            fk_targets.insert(column_name, foreign_table_name);
        }

        // Columns
        let col_rows = sqlx::query(
            r#"
            select column_name, data_type, udt_name, column_default
            from information_schema.columns
            where table_schema = $1 and table_name = $2
            order by ordinal_position
            "#,
        )
        .bind(&table_schema)
        .bind(&table_name)
        .fetch_all(&pool)
        .await?;

        let mut fields = Vec::new();
        for c in col_rows {
            let column_name: String = c.get("column_name");
            let data_type: String = c.get("data_type");
            let udt_name: String = c.get("udt_name");
            let column_default: Option<String> = c.get("column_default");

            let field = if let Some(target) = fk_targets.get(&column_name) {
                FieldMeta::new(&column_name, FieldType::Relation)
                    .with_related_model(target.clone())
            } else if let Some(labels) = enums.get(&udt_name) {
                FieldMeta::new(&column_name, FieldType::Text).with_choices(labels.clone())
            } else {
                let field_type = field_type_for(&data_type, column_default.as_deref());
                FieldMeta::new(&column_name, field_type)
            };
            fields.push(field);
        }

        models.push(ModelSchema {
            name: table_name,
            primary_key,
            fields,
        });
    }

    Ok(SchemaDefinition {
        version: SNAPSHOT_VERSION.to_string(),
        captured_at: Some(Utc::now().to_rfc3339()),
        models,
    })
}

/// Map an information_schema data type to a field type. Sequence
/// defaults turn integer columns into serials.
pub fn field_type_for(data_type: &str, column_default: Option<&str>) -> FieldType {
    let serial = column_default.is_some_and(|d| d.starts_with("nextval("));
    match data_type {
        "integer" | "bigint" | "smallint" if serial => FieldType::Serial,
        "integer" => FieldType::Integer,
        "bigint" => FieldType::BigInt,
        "smallint" => FieldType::SmallInt,
        "numeric" | "decimal" => FieldType::Decimal,
        "real" | "double precision" => FieldType::Float,
        "boolean" => FieldType::Boolean,
        "date" => FieldType::Date,
        "timestamp with time zone" | "timestamp without time zone" => FieldType::DateTime,
        "time with time zone" | "time without time zone" => FieldType::Time,
        "interval" => FieldType::Duration,
        "uuid" => FieldType::Uuid,
        "text" => FieldType::LongText,
        _ => FieldType::Text,
    }
}
