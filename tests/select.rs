use common::{MEMBER, QMember, setup};
use quarry::prelude::*;
use std::sync::Arc;

mod common;

#[test]
fn test_select_entity_by_username() {
    let session = setup();
    let m = QMember::new("m");

    let found = session
        .query()
        .select_from(&m.entity)
        .r#where(m.username.eq("member1").unwrap())
        .fetch_one()
        .unwrap()
        .expect("member1 exists");

    assert_eq!(found.get::<String>("username").unwrap(), "member1");
    assert_eq!(found.get::<i64>("age").unwrap(), 10);
    assert_eq!(found.id(), &Value::Integer(1));
}

#[test]
fn test_where_tuple_is_anded() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let chained = session
        .query()
        .select_from(&m.entity)
        .r#where(m.username.eq("member1")?.and(m.age.eq(10)?))
        .fetch()?;
    let listed = session
        .query()
        .select_from(&m.entity)
        .r#where((m.username.eq("member1")?, m.age.eq(10)?))
        .fetch()?;

    assert_eq!(chained.len(), 1);
    assert_eq!(listed.len(), 1);
    assert!(Arc::ptr_eq(&chained[0], &listed[0]));
    Ok(())
}

#[test]
fn test_search_operators() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");
    let query = session.query();

    let between: Vec<String> = query
        .select(&m.username)
        .from(&m.entity)
        .r#where(m.age.between(15, 35)?)
        .order_by(m.age.asc())
        .fetch()?;
    assert_eq!(between, vec!["member2", "member3"]);

    let like: Vec<i64> = query
        .select(&m.age)
        .from(&m.entity)
        .r#where(m.username.like("%er4")?)
        .fetch()?;
    assert_eq!(like, vec![40]);

    let listed: Vec<i64> = query
        .select(&m.id)
        .from(&m.entity)
        .r#where(m.age.is_in([10, 30])?)
        .order_by(m.id.asc())
        .fetch()?;
    assert_eq!(listed, vec![1, 3]);

    let excluded = query
        .select_from(&m.entity)
        .r#where((m.age.not_in([10, 30])?, m.age.ne(40)?))
        .fetch_count()?;
    assert_eq!(excluded, 1);

    let empty_list: Vec<i64> = query
        .select(&m.id)
        .from(&m.entity)
        .r#where(m.age.is_in(Vec::<i64>::new())?)
        .fetch()?;
    assert!(empty_list.is_empty());

    let negated = query
        .select_from(&m.entity)
        .r#where(m.age.loe(20)?.not())
        .fetch_count()?;
    assert_eq!(negated, 2);
    Ok(())
}

#[test]
fn test_fetch_one_rejects_several_rows() {
    let session = setup();
    let m = QMember::new("m");

    let result = session.query().select_from(&m.entity).fetch_one();
    assert!(matches!(result, Err(QueryError::NonUniqueResult(4))));

    let none = session
        .query()
        .select_from(&m.entity)
        .r#where(m.username.eq("nobody").unwrap())
        .fetch_one()
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn test_fetch_first_limits_to_one_row() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let first = session
        .query()
        .select_from(&m.entity)
        .order_by(m.age.desc())
        .fetch_first()?
        .expect("members exist");
    assert_eq!(first.get::<String>("username")?, "member4");
    Ok(())
}

#[test]
fn test_sorting_with_nulls_last() -> Result<()> {
    let session = setup();
    session.persist(
        NewEntity::of(&MEMBER)
            .set("id", 5)?
            .set("username", "member5")?
            .set("age", None::<i64>)?,
    );
    session.persist(
        NewEntity::of(&MEMBER)
            .set("id", 6)?
            .set("username", "member6")?
            .set("age", 100)?,
    );
    assert_eq!(session.flush()?, 2);

    let m = QMember::new("m");
    let members = session
        .query()
        .select_from(&m.entity)
        .r#where(m.age.goe(40)?.or(m.age.is_null()))
        .order_by((m.age.desc().nulls_last(), m.username.asc()))
        .fetch()?;

    let names: Vec<String> = members
        .iter()
        .map(|member| member.get::<String>("username"))
        .collect::<Result<_>>()?;
    assert_eq!(names, vec!["member6", "member4", "member5"]);
    assert_eq!(members[2].get::<Option<i64>>("age")?, None);

    let nulls_first: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .r#where(m.age.goe(40)?.or(m.age.is_null()))
        .order_by(m.age.asc().nulls_first())
        .fetch()?;
    assert_eq!(nulls_first, vec!["member5", "member4", "member6"]);
    Ok(())
}

#[test]
fn test_sort_by_age_then_username_nulls_last() -> Result<()> {
    let session = setup();
    for (id, username) in [(5, None), (6, Some("member5")), (7, Some("member6"))] {
        session.persist(
            NewEntity::of(&MEMBER)
                .set("id", id)?
                .set("username", username)?
                .set("age", 100)?,
        );
    }
    assert_eq!(session.flush()?, 3);

    let m = QMember::new("m");
    let members = session
        .query()
        .select_from(&m.entity)
        .r#where(m.age.eq(100)?)
        .order_by((m.age.desc(), m.username.asc().nulls_last()))
        .fetch()?;

    let names: Vec<Option<String>> = members
        .iter()
        .map(|member| member.get::<Option<String>>("username"))
        .collect::<Result<_>>()?;
    assert_eq!(
        names,
        vec![Some("member5".to_string()), Some("member6".to_string()), None]
    );
    Ok(())
}

#[test]
fn test_paging_reports_total() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let page = session
        .query()
        .select_from(&m.entity)
        .order_by(m.username.desc())
        .offset(1)
        .limit(2)
        .fetch_results()?;

    assert_eq!(page.total, 4);
    assert_eq!(page.limit, Some(2));
    assert_eq!(page.offset, Some(1));
    assert_eq!(page.len(), 2);
    let names: Vec<String> = page
        .results
        .iter()
        .map(|member| member.get::<String>("username"))
        .collect::<Result<_>>()?;
    assert_eq!(names, vec!["member3", "member2"]);
    Ok(())
}

#[test]
fn test_paging_past_the_end() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let page = session
        .query()
        .select_from(&m.entity)
        .r#where(m.age.gt(100)?)
        .limit(2)
        .fetch_results()?;
    assert_eq!(page.total, 0);
    assert!(page.is_empty());

    let tail: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .order_by(m.id.asc())
        .offset(3)
        .fetch()?;
    assert_eq!(tail, vec!["member4"]);
    Ok(())
}

#[test]
fn test_aggregation() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let row = session
        .query()
        .select((
            m.age.count(),
            m.age.sum()?,
            m.age.avg()?,
            m.age.max(),
            m.age.min(),
        ))
        .from(&m.entity)
        .fetch_one()?
        .expect("aggregates always return a row");

    assert_eq!(row.get::<i64>(m.age.count())?, 4);
    assert_eq!(row.get::<i64>(m.age.sum()?)?, 100);
    assert_eq!(row.get::<f64>(m.age.avg()?)?, 25.0);
    assert_eq!(row.get::<i64>(m.age.max())?, 40);
    assert_eq!(row.get::<i64>(m.age.min())?, 10);
    assert_eq!(row.value_at::<i64>(0)?, 4);
    Ok(())
}

#[test]
fn test_aggregate_with_bare_column_is_rejected() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let result = session
        .query()
        .select((&m.username, m.age.max()))
        .from(&m.entity)
        .fetch();
    assert!(matches!(result, Err(QueryError::AggregationMismatch(_))));
    Ok(())
}

#[test]
fn test_unknown_alias_is_rejected() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");
    let other = QMember::new("x");

    let result = session
        .query()
        .select_from(&m.entity)
        .r#where(other.age.gt(1)?)
        .fetch();
    assert!(matches!(result, Err(QueryError::UnresolvedAlias(alias)) if alias == "x"));
    Ok(())
}

#[test]
fn test_type_mismatch_at_construction() {
    let m = QMember::new("m");
    assert!(matches!(
        m.username.eq(10),
        Err(QueryError::TypeMismatch { .. })
    ));
    assert!(m.age.like("1%").is_err());
}

#[test]
fn test_distinct_and_count() -> Result<()> {
    let session = setup();
    session.persist(common::member(5, "member1", 50, None));
    session.flush()?;
    let m = QMember::new("m");

    let names: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .distinct()
        .order_by(m.username.asc())
        .fetch()?;
    assert_eq!(names.len(), 4);

    let distinct = session
        .query()
        .select(Projections::scalar::<String>(&m.username))
        .from(&m.entity)
        .distinct()
        .fetch_count()?;
    assert_eq!(distinct, 4);

    let all = session.query().select_from(&m.entity).fetch_count()?;
    assert_eq!(all, 5);
    Ok(())
}

#[test]
fn test_identity_is_preserved_across_queries() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let by_name = session
        .query()
        .select_from(&m.entity)
        .r#where(m.username.eq("member2")?)
        .fetch_one()?
        .expect("member2 exists");
    let by_age = session
        .query()
        .select_from(&m.entity)
        .r#where(m.age.eq(20)?)
        .fetch_one()?
        .expect("member2 exists");

    assert!(Arc::ptr_eq(&by_name, &by_age));
    let managed = session.find(&MEMBER, 2).expect("member2 is managed");
    assert!(Arc::ptr_eq(&managed, &by_name));
    assert_eq!(session.managed(), 1);

    session.clear();
    assert_eq!(session.managed(), 0);
    assert!(session.find(&MEMBER, 2).is_none());
    Ok(())
}
