//! Tests for listing predicate construction.
//!
//! The predicate builder is pure, so these tests render the resulting
//! query against the Postgres backend and assert on the generated SQL.

use atrium::approval::{Caller, ContentFilters, ContentStatus};
use atrium::error::Error;
use atrium::orm::posts;
use atrium::orm::users::Role;
use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

fn admin() -> Caller {
    Caller {
        id: 1,
        role: Role::Admin,
        department_id: None,
    }
}

fn head_of(department: i32) -> Caller {
    Caller {
        id: 2,
        role: Role::DepartmentHead,
        department_id: Some(department),
    }
}

fn employee_of(department: i32) -> Caller {
    Caller {
        id: 3,
        role: Role::Employee,
        department_id: Some(department),
    }
}

fn sql(filters: &ContentFilters, caller: &Caller) -> String {
    posts::Entity::find()
        .filter(filters.condition::<posts::Entity>(caller).unwrap())
        .build(DbBackend::Postgres)
        .to_string()
}

#[test]
fn admin_default_listing_is_unrestricted() {
    let rendered = sql(&ContentFilters::default(), &admin());
    assert!(
        !rendered.contains("WHERE"),
        "admin default must have no predicate: {}",
        rendered
    );
}

#[test]
fn employee_default_listing_is_public_only() {
    let rendered = sql(&ContentFilters::default(), &employee_of(1));
    assert!(
        rendered.ends_with(r#"WHERE "posts"."is_public" = TRUE"#),
        "unexpected SQL: {}",
        rendered
    );
}

#[test]
fn head_default_listing_adds_own_department() {
    let rendered = sql(&ContentFilters::default(), &head_of(4));
    assert!(
        rendered.contains(r#""posts"."is_public" = TRUE OR "posts"."department_id" = 4"#),
        "unexpected SQL: {}",
        rendered
    );
}

#[test]
fn department_filter_is_anded_with_role_visibility() {
    let filters = ContentFilters {
        department_id: Some(2),
        ..Default::default()
    };
    let rendered = sql(&filters, &head_of(1));
    // A head browsing another department still only sees its public
    // items.
    assert!(rendered.contains(r#""posts"."department_id" = 2"#));
    assert!(
        rendered.contains(r#""posts"."is_public" = TRUE OR "posts"."department_id" = 1"#),
        "unexpected SQL: {}",
        rendered
    );
}

#[test]
fn explicit_visibility_filter_replaces_the_role_default() {
    let filters = ContentFilters {
        is_public: Some(false),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(1));
    assert!(rendered.contains(r#""posts"."is_public" = FALSE"#));
    assert!(
        !rendered.contains(r#""posts"."is_public" = TRUE"#),
        "role default must not survive an explicit filter: {}",
        rendered
    );
}

#[test]
fn status_filter_is_a_plain_conjunct() {
    let filters = ContentFilters {
        status: Some(ContentStatus::Pending),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(1));
    assert!(
        rendered.contains(r#""posts"."status" = 'PENDING'"#),
        "unexpected SQL: {}",
        rendered
    );
    assert!(rendered.contains(r#""posts"."is_public" = TRUE"#));
}

#[test]
fn search_matches_title_and_body_case_insensitively() {
    let filters = ContentFilters {
        search: Some("Handbook".to_string()),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(1));
    assert!(
        rendered.contains(r#"LOWER("posts"."title") LIKE '%handbook%'"#),
        "unexpected SQL: {}",
        rendered
    );
    assert!(rendered.contains(r#"LOWER("posts"."content") LIKE '%handbook%'"#));
}

#[test]
fn department_access_builds_the_union() {
    let filters = ContentFilters {
        department_access: Some(3),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(3));
    assert!(
        rendered.contains(r#""posts"."department_id" = 3 OR "posts"."is_public" = TRUE"#),
        "unexpected SQL: {}",
        rendered
    );
}

#[test]
fn union_ignores_the_plain_department_filter() {
    let filters = ContentFilters {
        department_id: Some(9),
        department_access: Some(3),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(3));
    assert!(
        !rendered.contains(r#""posts"."department_id" = 9"#),
        "union must win over the department filter: {}",
        rendered
    );
}

#[test]
fn union_search_is_distributed_into_every_branch() {
    let filters = ContentFilters {
        department_access: Some(3),
        search: Some("handbook".to_string()),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(3));

    // Two branches, each carrying its own title-or-body match; the
    // search never sits outside the union where it could flatten it.
    assert_eq!(
        rendered.matches("LIKE '%handbook%'").count(),
        4,
        "expected the search in both union branches: {}",
        rendered
    );
    assert!(
        rendered.contains(r#""posts"."department_id" = 3 AND (LOWER("posts"."title")"#),
        "department branch must AND the search: {}",
        rendered
    );
    assert!(
        rendered.contains(r#""posts"."is_public" = TRUE AND (LOWER("posts"."title")"#),
        "public branch must AND the search: {}",
        rendered
    );
}

#[test]
fn union_can_opt_into_admin_authored_items() {
    let filters = ContentFilters {
        department_access: Some(3),
        include_admin_posts: Some(true),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(3));
    assert!(
        rendered.contains(r#""posts"."author_id" IN (SELECT "id" FROM "users" WHERE "users"."role" = 'ADMIN')"#),
        "unexpected SQL: {}",
        rendered
    );
}

#[test]
fn department_access_is_limited_to_own_department() {
    let filters = ContentFilters {
        department_access: Some(2),
        ..Default::default()
    };
    let result = filters.condition::<posts::Entity>(&employee_of(1));
    assert!(matches!(result, Err(Error::Forbidden(_))));

    // Admins may scope to any department.
    assert!(filters.condition::<posts::Entity>(&admin()).is_ok());
}

#[test]
fn blank_search_terms_are_ignored() {
    let filters = ContentFilters {
        search: Some("   ".to_string()),
        ..Default::default()
    };
    let rendered = sql(&filters, &employee_of(1));
    assert!(
        !rendered.contains("LIKE"),
        "whitespace search must not filter: {}",
        rendered
    );
}
