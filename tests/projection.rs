use common::{QMember, setup};
use quarry::prelude::*;

mod common;

#[derive(Debug, Default, PartialEq)]
struct MemberDto {
    username: String,
    age: i32,
}

constructor_target!(MemberDto { username: String, age: i32 });
field_target!(MemberDto { username: String, age: i32 });

/// Populated only through setters, the way a bean would be.
#[derive(Debug, Default, PartialEq)]
struct UserDto {
    name: String,
    age: i32,
}

impl UserDto {
    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn set_age(&mut self, age: i32) {
        self.age = age;
    }
}

setter_target!(UserDto { name => set_name(String), age => set_age(i32) });

#[test]
fn test_single_column_projection() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let names: Vec<String> = session
        .query()
        .select(&m.username)
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;
    assert_eq!(names, vec!["member1", "member2", "member3", "member4"]);

    let ages = session
        .query()
        .select(Projections::scalar::<u32>(&m.age))
        .from(&m.entity)
        .order_by(m.age.desc())
        .fetch()?;
    assert_eq!(ages, vec![40u32, 30, 20, 10]);
    Ok(())
}

#[test]
fn test_tuple_projection() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let rows = session
        .query()
        .select((&m.username, &m.age))
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[1].len(), 2);
    assert_eq!(rows[1].get::<String>(&m.username)?, "member2");
    assert_eq!(rows[1].get::<i64>(&m.age)?, 20);
    assert!(matches!(
        rows[1].get::<i64>(&m.id),
        Err(QueryError::ProjectionError(_))
    ));
    Ok(())
}

#[test]
fn test_constant_in_projection() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let rows = session
        .query()
        .select((&m.username, constant("A")))
        .from(&m.entity)
        .fetch()?;

    assert_eq!(rows.len(), 4);
    for row in &rows {
        assert_eq!(row.get::<String>(constant("A"))?, "A");
    }
    Ok(())
}

#[test]
fn test_constructor_binding() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let dtos = session
        .query()
        .select(Projections::constructor::<MemberDto>((&m.username, &m.age)))
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;

    assert_eq!(dtos.len(), 4);
    assert_eq!(
        dtos[0],
        MemberDto {
            username: "member1".into(),
            age: 10
        }
    );
    Ok(())
}

#[test]
fn test_constructor_arity_mismatch() {
    let session = setup();
    let m = QMember::new("m");

    let result = session
        .query()
        .select(Projections::constructor::<MemberDto>([&m.username]))
        .from(&m.entity)
        .fetch();
    assert!(matches!(result, Err(QueryError::ProjectionError(_))));
}

#[test]
fn test_field_binding_by_name() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");
    let sub = QMember::new("m_sub");

    let dtos = session
        .query()
        .select(Projections::fields::<MemberDto>((
            &m.username,
            subquery::select(sub.age.max())
                .from(&sub.entity)
                .alias("age"),
        )))
        .from(&m.entity)
        .order_by(m.id.asc())
        .fetch()?;

    assert_eq!(dtos.len(), 4);
    assert!(dtos.iter().all(|dto| dto.age == 40));
    assert_eq!(dtos[3].username, "member4");
    Ok(())
}

#[test]
fn test_setter_binding_with_alias() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    let users = session
        .query()
        .select(Projections::bean::<UserDto>((m.username.alias("name"), &m.age)))
        .from(&m.entity)
        .r#where(m.age.gt(30)?)
        .fetch()?;

    assert_eq!(
        users,
        vec![UserDto {
            name: "member4".into(),
            age: 40
        }]
    );
    Ok(())
}

#[test]
fn test_unmatched_names_keep_defaults() -> Result<()> {
    let session = setup();
    let m = QMember::new("m");

    // `username` has no setter on UserDto, so only `age` is populated
    let users = session
        .query()
        .select(Projections::bean::<UserDto>((&m.username, &m.age)))
        .from(&m.entity)
        .r#where(m.id.eq(1)?)
        .fetch()?;

    assert_eq!(
        users,
        vec![UserDto {
            name: String::new(),
            age: 10
        }]
    );
    Ok(())
}

#[test]
fn test_distinct_projection() -> Result<()> {
    let session = setup();
    session.persist(common::member(5, "member5", 10, Some(1)));
    session.flush()?;
    let m = QMember::new("m");

    let ages: Vec<i64> = session
        .query()
        .select(&m.age)
        .from(&m.entity)
        .distinct()
        .order_by(m.age.asc())
        .fetch()?;
    assert_eq!(ages, vec![10, 20, 30, 40]);
    Ok(())
}
