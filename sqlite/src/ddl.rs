//! Table creation for entity descriptors.

use quarry_core::schema::{Cardinality, EntityDescriptor, FieldKind};
use quarry_core::ScalarKind;
use rusqlite::Connection;

fn column_type(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Integer | ScalarKind::Boolean => "INTEGER",
        ScalarKind::String => "TEXT",
        ScalarKind::Decimal => "REAL",
    }
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

/// `CREATE TABLE IF NOT EXISTS` statement for one entity.
pub fn create_table_sql(entity: &'static EntityDescriptor) -> String {
    let columns: Vec<String> = entity
        .columns()
        .map(|column| {
            let mut definition = format!("{} {}", quote(column.column), column_type(column.kind));
            if column.field.name == entity.id {
                definition.push_str(" PRIMARY KEY");
            }
            if let FieldKind::Relation(relation) = &column.field.kind
                && let Cardinality::ManyToOne { .. } = relation.cardinality
                && let Ok(target_id) = relation.target.id_column()
            {
                definition.push_str(&format!(
                    " REFERENCES {}({})",
                    quote(relation.target.table),
                    quote(target_id)
                ));
            }
            definition
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote(entity.table),
        columns.join(", ")
    )
}

/// Creates the tables of `entities`, in order.
pub fn create_tables(conn: &Connection, entities: &[&'static EntityDescriptor]) -> rusqlite::Result<()> {
    for entity in entities {
        conn.execute(&create_table_sql(*entity), [])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::FieldDescriptor;

    static TEAM: EntityDescriptor = EntityDescriptor::new(
        "Team",
        "team",
        "id",
        &[
            FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
            FieldDescriptor::scalar("name", "name", ScalarKind::String),
            FieldDescriptor::one_to_many("members", &MEMBER, "team"),
        ],
    );

    static MEMBER: EntityDescriptor = EntityDescriptor::new(
        "Member",
        "member",
        "id",
        &[
            FieldDescriptor::scalar("id", "id", ScalarKind::Integer),
            FieldDescriptor::scalar("username", "username", ScalarKind::String),
            FieldDescriptor::many_to_one("team", "team_id", &TEAM),
        ],
    );

    #[test]
    fn foreign_keys_reference_the_target_id() {
        assert_eq!(
            create_table_sql(&MEMBER),
            r#"CREATE TABLE IF NOT EXISTS "member" ("id" INTEGER PRIMARY KEY, "username" TEXT, "team_id" INTEGER REFERENCES "team"("id"))"#
        );
    }

    #[test]
    fn inverse_relations_have_no_column() {
        assert_eq!(
            create_table_sql(&TEAM),
            r#"CREATE TABLE IF NOT EXISTS "team" ("id" INTEGER PRIMARY KEY, "name" TEXT)"#
        );
    }

    #[test]
    fn tables_are_created() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, &[&TEAM, &MEMBER]).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }
}
