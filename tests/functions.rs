use common::{QMember, setup};
use quarry::prelude::*;

mod common;

#[test]
fn test_simple_case() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let labels: Vec<String> = session
        .query()
        .select(
            m.age
                .when(10)
                .then("ten")
                .when(20)
                .then("twenty")
                .otherwise("other")?,
        )
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;
    assert_eq!(labels, vec!["ten", "twenty", "other", "other"]);
    Ok(())
}

#[test]
fn test_searched_case() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let bracket = CaseBuilder::new()
        .when(m.age.between(0, 20)?)
        .then("0~20")
        .when(m.age.between(21, 30)?)
        .then("21~30")
        .otherwise("other")?;
    let rows = session
        .query()
        .select((&m.username, bracket.alias("bracket")))
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;

    let brackets: Vec<String> = rows
        .iter()
        .map(|row| row.get_named::<String>("bracket"))
        .collect::<Result<_>>()?;
    assert_eq!(brackets, vec!["0~20", "0~20", "21~30", "other"]);
    Ok(())
}

#[test]
fn test_case_in_order_by() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    // Members in their twenties first, everyone else by age
    let rank = CaseBuilder::new()
        .when(m.age.between(20, 29)?)
        .then(0)
        .otherwise(1)?;
    let names: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .order_by((rank.asc(), m.age.asc()))
        .fetch()?;
    assert_eq!(names, vec!["member2", "member1", "member3", "member4"]);
    Ok(())
}

#[test]
fn test_case_branches_must_agree() {
    let m = QMember::new("m");
    let mixed = CaseBuilder::new()
        .when(m.age.gt(10).unwrap())
        .then("old")
        .otherwise(0);
    assert!(matches!(mixed, Err(QueryError::TypeMismatch { .. })));
}

#[test]
fn test_concat_with_string_value() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let combined: Vec<String> = session
        .query()
        .select(m.username.concat("_")?.concat(m.age.string_value())?)
        .from(&m.entity)
        .r#where(m.username.eq("member1")?)
        .fetch()?;
    assert_eq!(combined, vec!["member1_10"]);

    assert!(m.username.concat(&m.age).is_err());
    Ok(())
}

#[test]
fn test_arithmetic() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let row = session
        .query()
        .select((m.age.add(1)?, m.age.multiply(2)?, m.age.subtract(5)?))
        .from(&m.entity)
        .r#where(m.id.eq(2)?)
        .fetch_one()?
        .expect("member2 exists");
    assert_eq!(row.value_at::<i64>(0)?, 21);
    assert_eq!(row.value_at::<i64>(1)?, 40);
    assert_eq!(row.value_at::<i64>(2)?, 15);
    Ok(())
}

#[test]
fn test_string_functions() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let upper: Vec<String> = session
        .query()
        .select(m.username.upper()?)
        .from(&m.entity)
        .r#where(m.id.eq(3)?)
        .fetch()?;
    assert_eq!(upper, vec!["MEMBER3"]);

    let matching = session
        .query()
        .select_from(&m.entity)
        .r#where(m.username.eq(m.username.lower()?)?)
        .fetch_count()?;
    assert_eq!(matching, 4);

    let fallback: Vec<i64> = session
        .query()
        .select(m.age.coalesce(0)?)
        .from(&m.entity)
        .r#where(m.id.eq(1)?)
        .fetch()?;
    assert_eq!(fallback, vec![10]);
    Ok(())
}

#[test]
fn test_string_template() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let replaced: Vec<String> = session
        .query()
        .select(string_template(
            "replace({0}, {1}, {2})",
            [Expression::from(&m.username), constant("member"), constant("M")],
        ))
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;
    assert_eq!(replaced, vec!["M1", "M2", "M3", "M4"]);
    Ok(())
}

#[test]
fn test_boolean_template_in_where() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let names: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .r#where(boolean_template(
            "{0} = lower({1})",
            [Expression::from(&m.username), constant("MEMBER2")],
        ))
        .fetch()?;
    assert_eq!(names, vec!["member2"]);
    Ok(())
}

#[test]
fn test_number_template() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let total: Option<i64> = session
        .query()
        .select(number_template("sum({0}) * 2", [&m.age]))
        .from(&m.entity)
        .fetch_one()?;
    assert_eq!(total, Some(200));
    Ok(())
}

#[test]
fn test_template_argument_out_of_range() {
    let session = setup();
    let m = QMember::new("m");

    let result: Result<Vec<String>> = session
        .query()
        .select(string_template("lower({1})", [&m.username]))
        .from(&m.entity)
        .fetch();
    assert!(matches!(result, Err(QueryError::InvalidTemplate { .. })));
}
