#![allow(dead_code)]

use quarry::prelude::*;
use quarry::schema::FieldDescriptor as F;

pub static TEAM: EntityDescriptor = EntityDescriptor::new(
    "Team",
    "team",
    "id",
    &[
        F::scalar("id", "id", ScalarKind::Integer),
        F::scalar("name", "name", ScalarKind::String),
        F::one_to_many("members", &MEMBER, "team"),
    ],
);

pub static MEMBER: EntityDescriptor = EntityDescriptor::new(
    "Member",
    "member",
    "id",
    &[
        F::scalar("id", "id", ScalarKind::Integer),
        F::scalar("username", "username", ScalarKind::String),
        F::scalar("age", "age", ScalarKind::Integer),
        F::many_to_one("team", "team_id", &TEAM),
    ],
);

/// Typed paths of a `Member` alias.
#[derive(Debug, Clone)]
pub struct QMember {
    pub entity: EntityPath,
    pub id: Path,
    pub username: Path,
    pub age: Path,
    pub team: Association,
}

impl QMember {
    pub fn new(alias: &str) -> Self {
        let entity = EntityPath::new(&MEMBER, alias);
        Self {
            id: entity.path("id").unwrap(),
            username: entity.path("username").unwrap(),
            age: entity.path("age").unwrap(),
            team: entity.association("team").unwrap(),
            entity,
        }
    }
}

/// Typed paths of a `Team` alias.
#[derive(Debug, Clone)]
pub struct QTeam {
    pub entity: EntityPath,
    pub id: Path,
    pub name: Path,
    pub members: Association,
}

impl QTeam {
    pub fn new(alias: &str) -> Self {
        let entity = EntityPath::new(&TEAM, alias);
        Self {
            id: entity.path("id").unwrap(),
            name: entity.path("name").unwrap(),
            members: entity.association("members").unwrap(),
            entity,
        }
    }
}

pub fn team(id: i64, name: &str) -> NewEntity {
    NewEntity::of(&TEAM)
        .set("id", id)
        .unwrap()
        .set("name", name)
        .unwrap()
}

pub fn member(id: i64, username: &str, age: i64, team: Option<i64>) -> NewEntity {
    NewEntity::of(&MEMBER)
        .set("id", id)
        .unwrap()
        .set("username", username)
        .unwrap()
        .set("age", age)
        .unwrap()
        .set("team", team)
        .unwrap()
}

/// Empty schema in a fresh in-memory database.
pub fn empty_session() -> Session<SqliteStore> {
    let store = SqliteStore::open_in_memory().unwrap();
    create_tables(store.connection(), &[&TEAM, &MEMBER]).unwrap();
    Session::new(store)
}

/// Teams A and B; member1 (10) and member2 (20) in A, member3 (30) and member4 (40) in B.
///
/// The session is flushed and cleared, so nothing is managed yet.
pub fn setup() -> Session<SqliteStore> {
    let session = empty_session();
    session.persist(team(1, "teamA"));
    session.persist(team(2, "teamB"));
    session.persist(member(1, "member1", 10, Some(1)));
    session.persist(member(2, "member2", 20, Some(1)));
    session.persist(member(3, "member3", 30, Some(2)));
    session.persist(member(4, "member4", 40, Some(2)));
    assert_eq!(session.flush().unwrap(), 6);
    session.clear();
    session
}
