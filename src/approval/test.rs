use super::*;
use crate::orm::posts;

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

fn post(author: i32, department: Option<i32>, is_public: bool) -> posts::Model {
    let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    posts::Model {
        id: 10,
        title: "Thông báo nội bộ".to_string(),
        content: "Nội dung".to_string(),
        tags: serde_json::json!([]),
        author_id: author,
        department_id: department,
        is_public,
        status: ContentStatus::Pending,
        reviewed_by_id: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2024, 3, 2)
        .unwrap()
        .and_hms_opt(12, 30, 0)
        .unwrap()
}

#[test]
fn create_is_denied_to_employees_only() {
    assert!(resolve_create_department(&admin(), None).is_ok());
    assert!(resolve_create_department(&head_of(1), None).is_ok());
    assert!(matches!(
        resolve_create_department(&employee_of(1), None),
        Err(Error::Forbidden(_))
    ));
}

#[test]
fn head_creates_in_own_department_only() {
    assert_eq!(resolve_create_department(&head_of(1), None).unwrap(), Some(1));
    assert_eq!(
        resolve_create_department(&head_of(1), Some(1)).unwrap(),
        Some(1)
    );
    assert!(matches!(
        resolve_create_department(&head_of(1), Some(2)),
        Err(Error::Forbidden(_))
    ));
}

#[test]
fn admin_creates_anywhere_including_company_wide() {
    assert_eq!(resolve_create_department(&admin(), Some(7)).unwrap(), Some(7));
    assert_eq!(resolve_create_department(&admin(), None).unwrap(), None);
}

#[test]
fn admin_created_items_are_auto_approved() {
    let stamp = ReviewStamp::on_create(&admin(), now());
    assert_eq!(stamp.status, ContentStatus::Approved);
    assert_eq!(stamp.reviewed_by_id, Some(admin().id));
    assert_eq!(stamp.reviewed_at, Some(now()));
}

#[test]
fn head_created_items_start_pending_and_unreviewed() {
    let stamp = ReviewStamp::on_create(&head_of(1), now());
    assert_eq!(stamp.status, ContentStatus::Pending);
    assert_eq!(stamp.reviewed_by_id, None);
    assert_eq!(stamp.reviewed_at, None);
}

#[test]
fn decisions_overwrite_the_previous_stamp() {
    let first = ReviewStamp::on_decision(true, 1, now());
    let later = now() + chrono::Duration::hours(3);
    let second = ReviewStamp::on_decision(true, 1, later);

    // Approving twice stays approved; the timestamp tracks the latest
    // call, it does not accumulate.
    assert_eq!(first.status, ContentStatus::Approved);
    assert_eq!(second.status, ContentStatus::Approved);
    assert_eq!(second.reviewed_at, Some(later));

    let rejected = ReviewStamp::on_decision(false, 4, later);
    assert_eq!(rejected.status, ContentStatus::Rejected);
    assert_eq!(rejected.reviewed_by_id, Some(4));
}

#[test]
fn review_is_admin_only() {
    assert!(require_reviewer(&admin()).is_ok());
    assert!(matches!(require_reviewer(&head_of(1)), Err(Error::Forbidden(_))));
    assert!(matches!(
        require_reviewer(&employee_of(1)),
        Err(Error::Forbidden(_))
    ));
}

#[test]
fn resubmit_is_author_or_admin() {
    let item = post(2, Some(1), false);
    assert!(require_resubmit(&head_of(1), &item).is_ok());
    assert!(require_resubmit(&admin(), &item).is_ok());

    // Another department head, even of the same department, may not.
    let other_head = Caller {
        id: 9,
        role: Role::DepartmentHead,
        department_id: Some(1),
    };
    assert!(matches!(
        require_resubmit(&other_head, &item),
        Err(Error::Forbidden(_))
    ));
    assert!(matches!(
        require_resubmit(&employee_of(1), &item),
        Err(Error::Forbidden(_))
    ));
}

#[test]
fn admin_views_everything() {
    assert!(can_view(&admin(), &post(2, Some(1), false), None));
    assert!(can_view(&admin(), &post(2, None, false), None));
}

#[test]
fn head_views_own_department_and_public() {
    let head = head_of(1);
    assert!(can_view(&head, &post(2, Some(1), false), None));
    assert!(can_view(&head, &post(2, Some(2), true), None));
    assert!(!can_view(&head, &post(2, Some(2), false), None));
    // Company-wide private items are not "their department".
    assert!(!can_view(&head, &post(2, None, false), None));
}

#[test]
fn employee_views_public_unless_scoped_access_granted() {
    let employee = employee_of(1);
    assert!(can_view(&employee, &post(2, Some(2), true), None));
    assert!(!can_view(&employee, &post(2, Some(1), false), None));
    assert!(can_view(&employee, &post(2, Some(1), false), Some(1)));
    assert!(!can_view(&employee, &post(2, Some(2), false), Some(1)));
}

#[test]
fn department_access_must_match_own_department() {
    assert_eq!(
        resolve_department_access(&employee_of(1), Some(1)).unwrap(),
        Some(1)
    );
    assert!(matches!(
        resolve_department_access(&employee_of(1), Some(2)),
        Err(Error::Forbidden(_))
    ));
    // Admins may scope to any department.
    assert_eq!(resolve_department_access(&admin(), Some(5)).unwrap(), Some(5));
    assert_eq!(resolve_department_access(&head_of(3), None).unwrap(), None);
}

#[test]
fn modify_requires_matching_department() {
    let head = head_of(1);
    assert!(require_modify(&head, &post(2, Some(1), false)).is_ok());
    assert!(matches!(
        require_modify(&head, &post(2, Some(2), false)),
        Err(Error::Forbidden(_))
    ));
    assert!(require_modify(&admin(), &post(2, Some(2), false)).is_ok());
    assert!(matches!(
        require_modify(&employee_of(1), &post(2, Some(1), true)),
        Err(Error::Forbidden(_))
    ));
}

#[test]
fn titles_and_bodies_must_be_non_empty() {
    assert!(validate_content("Báo cáo quý", "nội dung").is_ok());
    assert!(matches!(
        validate_content("", "nội dung"),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        validate_content("   ", "nội dung"),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        validate_content("Báo cáo quý", "  "),
        Err(Error::Validation(_))
    ));
}

#[test]
fn status_wire_format_uses_literal_strings() {
    assert_eq!(
        serde_json::to_string(&ContentStatus::Pending).unwrap(),
        "\"PENDING\""
    );
    assert_eq!(
        serde_json::to_string(&ContentStatus::Approved).unwrap(),
        "\"APPROVED\""
    );
    assert_eq!(
        serde_json::to_string(&ContentStatus::Rejected).unwrap(),
        "\"REJECTED\""
    );
}
