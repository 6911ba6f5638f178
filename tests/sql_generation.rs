use common::{QMember, QTeam};
use quarry::prelude::*;

mod common;

fn sql(query: &TranslatedQuery) -> &str {
    println!("{} {:?}", query.sql, query.params);
    &query.sql
}

#[test]
fn test_select_entity_sql() -> Result<()> {
    let m = QMember::new("m");
    let query = QueryFactory::detached()
        .select_from(&m.entity)
        .r#where(m.username.eq("member1")?)
        .translate(&Translator::new(Dialect::SQLite))?;

    assert_eq!(
        sql(&query),
        r#"SELECT "m"."id", "m"."username", "m"."age", "m"."team_id" FROM "member" AS "m" WHERE "m"."username" = ?"#
    );
    assert_eq!(query.params, vec![Value::from("member1")]);
    Ok(())
}

#[test]
fn test_no_where_clause_without_predicate() -> Result<()> {
    let m = QMember::new("m");
    let query = QueryFactory::detached()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .r#where(None::<Predicate>)
        .translate(&Translator::default())?;

    assert_eq!(sql(&query), r#"SELECT "m"."username" FROM "member" AS "m""#);
    Ok(())
}

#[test]
fn test_postgres_numbers_parameters_in_order() -> Result<()> {
    let m = QMember::new("m");
    let query = QueryFactory::detached()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .r#where(
            m.username
                .eq("member1")?
                .and(m.age.eq(10)?.or(m.age.eq(20)?)),
        )
        .offset(5)
        .translate(&Translator::new(Dialect::PostgreSQL))?;

    assert_eq!(
        sql(&query),
        r#"SELECT "m"."username" FROM "member" AS "m" WHERE "m"."username" = $1 AND ("m"."age" = $2 OR "m"."age" = $3) OFFSET 5"#
    );
    assert_eq!(
        query.params,
        vec![Value::from("member1"), Value::Integer(10), Value::Integer(20)]
    );
    Ok(())
}

#[test]
fn test_mysql_emulates_null_ordering() -> Result<()> {
    let m = QMember::new("m");
    let query = QueryFactory::detached()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .order_by(m.age.desc().nulls_last())
        .limit(2)
        .offset(1)
        .translate(&Translator::new(Dialect::MySQL))?;

    assert_eq!(
        sql(&query),
        "SELECT `m`.`username` FROM `member` AS `m` ORDER BY `m`.`age` IS NULL ASC, `m`.`age` DESC LIMIT 2 OFFSET 1"
    );

    let native = QueryFactory::detached()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .order_by(m.age.asc().nulls_first())
        .translate(&Translator::new(Dialect::PostgreSQL))?;
    assert!(sql(&native).ends_with(r#"ORDER BY "m"."age" ASC NULLS FIRST"#));
    Ok(())
}

#[test]
fn test_offset_without_limit() -> Result<()> {
    let m = QMember::new("m");
    let select = QueryFactory::detached()
        .select(Projections::scalar::<i64>(&m.id))
        .from(&m.entity)
        .offset(3);

    let sqlite = select.translate(&Translator::new(Dialect::SQLite))?;
    assert!(sql(&sqlite).ends_with("LIMIT -1 OFFSET 3"));
    let postgres = select.translate(&Translator::new(Dialect::PostgreSQL))?;
    assert!(sql(&postgres).ends_with(r#"FROM "member" AS "m" OFFSET 3"#));
    Ok(())
}

#[test]
fn test_join_sql() -> Result<()> {
    let m = QMember::new("m");
    let t = QTeam::new("t");
    let query = QueryFactory::detached()
        .select((&m.username, &t.name))
        .from(&m.entity)
        .left_join(&m.team, &t.entity)
        .on(t.name.eq("teamA")?)
        .translate(&Translator::default())?;

    assert_eq!(
        sql(&query),
        r#"SELECT "m"."username", "t"."name" FROM "member" AS "m" LEFT JOIN "team" AS "t" ON "m"."team_id" = "t"."id" AND "t"."name" = ?"#
    );

    let inverse = QueryFactory::detached()
        .select(Projections::scalar::<String>(&t.name))
        .from(&t.entity)
        .join(&t.members, &m.entity)
        .translate(&Translator::default())?;
    assert!(sql(&inverse).ends_with(r#"INNER JOIN "member" AS "m" ON "m"."team_id" = "t"."id""#));

    let cross = QueryFactory::detached()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .join_entity(&t.entity)
        .translate(&Translator::default())?;
    assert!(sql(&cross).ends_with(r#"CROSS JOIN "team" AS "t""#));
    Ok(())
}

#[test]
fn test_fetch_join_selects_joined_columns() -> Result<()> {
    let m = QMember::new("m");
    let t = QTeam::new("t");
    let query = QueryFactory::detached()
        .select_from(&m.entity)
        .join(&m.team, &t.entity)
        .fetch_join()
        .translate(&Translator::default())?;

    assert!(sql(&query).starts_with(
        r#"SELECT "m"."id", "m"."username", "m"."age", "m"."team_id", "t"."id", "t"."name" FROM"#
    ));
    assert_eq!(query.shape, quarry::translate::RowShape::Rows { columns: 6 });
    Ok(())
}

#[test]
fn test_subquery_and_case_sql() -> Result<()> {
    let m = QMember::new("m");
    let sub = QMember::new("m_sub");
    let query = QueryFactory::detached()
        .select((
            m.age.when(10).then("ten").otherwise("other")?,
            subquery::select(sub.age.max())
                .from(&sub.entity)
                .alias("oldest"),
        ))
        .from(&m.entity)
        .r#where(m.age.is_in([10, 20])?)
        .translate(&Translator::default())?;

    assert_eq!(
        sql(&query),
        r#"SELECT CASE WHEN "m"."age" = ? THEN ? ELSE ? END, (SELECT MAX("m_sub"."age") FROM "member" AS "m_sub") AS "oldest" FROM "member" AS "m" WHERE "m"."age" IN (?, ?)"#
    );
    assert_eq!(
        query.params,
        vec![
            Value::Integer(10),
            Value::from("ten"),
            Value::from("other"),
            Value::Integer(10),
            Value::Integer(20),
        ]
    );
    Ok(())
}

#[test]
fn test_concat_and_cast_sql() -> Result<()> {
    let m = QMember::new("m");
    let combined = m.username.concat("_")?.concat(m.age.string_value())?;

    let sqlite = QueryFactory::detached()
        .select(Projections::scalar::<String>(&combined))
        .from(&m.entity)
        .translate(&Translator::default())?;
    assert_eq!(
        sql(&sqlite),
        r#"SELECT "m"."username" || ? || CAST("m"."age" AS TEXT) FROM "member" AS "m""#
    );

    let mysql = QueryFactory::detached()
        .select(Projections::scalar::<String>(&combined))
        .from(&m.entity)
        .translate(&Translator::new(Dialect::MySQL))?;
    assert!(sql(&mysql).contains("CAST(`m`.`age` AS CHAR)"));
    Ok(())
}

#[test]
fn test_count_sql() -> Result<()> {
    let m = QMember::new("m");
    let t = QTeam::new("t");
    let translator = Translator::default();

    let plain = QueryFactory::detached()
        .select_from(&m.entity)
        .order_by(m.age.asc())
        .limit(10)
        .into_statement();
    assert_eq!(
        sql(&translator.translate_count(&plain)?),
        r#"SELECT COUNT(*) FROM "member" AS "m""#
    );

    let grouped = QueryFactory::detached()
        .select(Projections::scalar::<String>(&t.name))
        .from(&m.entity)
        .join(&m.team, &t.entity)
        .group_by(&t.name)
        .into_statement();
    assert_eq!(
        sql(&translator.translate_count(&grouped)?),
        r#"SELECT COUNT(*) FROM (SELECT 1 FROM "member" AS "m" INNER JOIN "team" AS "t" ON "m"."team_id" = "t"."id" GROUP BY "t"."name") AS "counted""#
    );

    let collection = QueryFactory::detached()
        .select_from(&t.entity)
        .join(&t.members, &m.entity)
        .fetch_join()
        .into_statement();
    assert_eq!(
        sql(&translator.translate_count(&collection)?),
        r#"SELECT COUNT(DISTINCT "t"."id") FROM "team" AS "t" INNER JOIN "member" AS "m" ON "m"."team_id" = "t"."id""#
    );
    Ok(())
}

#[test]
fn test_dml_sql() -> Result<()> {
    let m = QMember::new("m");
    let translator = Translator::new(Dialect::PostgreSQL);

    let update = QueryFactory::detached()
        .update(&m.entity)
        .set(&m.age, m.age.add(1)?)
        .r#where(m.username.eq("member1")?)
        .translate(&translator)?;
    assert_eq!(
        sql(&update),
        r#"UPDATE "member" AS "m" SET "age" = "m"."age" + $1 WHERE "m"."username" = $2"#
    );

    let delete = QueryFactory::detached()
        .delete(&m.entity)
        .r#where(m.age.gt(18)?)
        .translate(&translator)?;
    assert_eq!(
        sql(&delete),
        r#"DELETE FROM "member" AS "m" WHERE "m"."age" > $1"#
    );
    Ok(())
}

#[test]
fn test_identifiers_are_quoted_per_dialect() -> Result<()> {
    let m = QMember::new("m");
    let select = QueryFactory::detached()
        .select(Projections::scalar::<i64>(&m.id))
        .from(&m.entity);

    let mysql = select.translate(&Translator::new(Dialect::MySQL))?;
    assert_eq!(sql(&mysql), "SELECT `m`.`id` FROM `member` AS `m`");
    let sqlite = select.translate(&Translator::new(Dialect::SQLite))?;
    assert_eq!(sql(&sqlite), r#"SELECT "m"."id" FROM "member" AS "m""#);
    Ok(())
}
