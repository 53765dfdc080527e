//! The review lifecycle, exercised through the public engine API the
//! way the handlers drive it.

use atrium::approval::{
    resolve_create_department, validate_content, Caller, ContentStatus, Pagination, ReviewStamp,
};
use atrium::error::Error;
use atrium::orm::users::Role;
use chrono::{Duration, NaiveDate, NaiveDateTime};

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 10)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn admin() -> Caller {
    Caller {
        id: 1,
        role: Role::Admin,
        department_id: None,
    }
}

fn head() -> Caller {
    Caller {
        id: 2,
        role: Role::DepartmentHead,
        department_id: Some(1),
    }
}

fn employee() -> Caller {
    Caller {
        id: 3,
        role: Role::Employee,
        department_id: Some(1),
    }
}

/// The worked example: empty title fails validation, an employee may
/// not create at all, a head's item starts pending, and an admin
/// decision stamps the reviewer.
#[test]
fn submission_walkthrough() {
    assert!(matches!(
        validate_content("", "Quy chế làm việc mới"),
        Err(Error::Validation(_))
    ));

    assert!(matches!(
        resolve_create_department(&employee(), None),
        Err(Error::Forbidden(_))
    ));

    assert_eq!(resolve_create_department(&head(), None).unwrap(), Some(1));
    let created = ReviewStamp::on_create(&head(), at(9));
    assert_eq!(created.status, ContentStatus::Pending);
    assert_eq!(created.reviewed_by_id, None);
    assert_eq!(created.reviewed_at, None);

    let decided = ReviewStamp::on_decision(true, admin().id, at(10));
    assert_eq!(decided.status, ContentStatus::Approved);
    assert_eq!(decided.reviewed_by_id, Some(admin().id));
    assert_eq!(decided.reviewed_at, Some(at(10)));
}

#[test]
fn rejection_and_reapproval_are_both_legal() {
    // No terminal state: approved items can be rejected later and come
    // back again.
    let approved = ReviewStamp::on_decision(true, 1, at(9));
    assert_eq!(approved.status, ContentStatus::Approved);

    let rejected = ReviewStamp::on_decision(false, 1, at(10));
    assert_eq!(rejected.status, ContentStatus::Rejected);

    let reapproved = ReviewStamp::on_decision(true, 1, at(11));
    assert_eq!(reapproved.status, ContentStatus::Approved);
    assert_eq!(reapproved.reviewed_at, Some(at(11)));
}

#[test]
fn double_approval_keeps_the_latest_timestamp() {
    let first = ReviewStamp::on_decision(true, 1, at(9));
    let second = ReviewStamp::on_decision(true, 1, at(9) + Duration::minutes(5));
    assert_eq!(first.status, second.status);
    assert_eq!(second.reviewed_at, Some(at(9) + Duration::minutes(5)));
}

#[test]
fn pagination_envelope_math() {
    let p = Pagination::new(25, 2, 10);
    assert_eq!(p.pages, 3);
    assert_eq!(Pagination::skip(1, 10), 0);
    assert_eq!(Pagination::skip(2, 10), 10);
    assert_eq!(Pagination::skip(3, 10), 20);

    // Walking pages 1..=pages covers every row exactly once.
    let total: u64 = 25;
    let limit: u64 = 10;
    let pages = Pagination::new(total, 1, limit).pages;
    let mut covered = 0;
    for page in 1..=pages {
        let skip = Pagination::skip(page, limit);
        covered += limit.min(total - skip);
    }
    assert_eq!(covered, total);

    let empty = Pagination::new(0, 1, 10);
    assert_eq!(empty.pages, 0);
}
