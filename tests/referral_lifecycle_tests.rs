mod common;

use std::sync::Arc;

use common::{FakeIdentity, provision, test_state};
use referral_platform::domain::{ReferralId, ReferralStatus, UserId};
use referral_platform::services::{CreateReferral, ReferralError};

fn request(title: &str, company: &str) -> CreateReferral {
    CreateReferral {
        job_title: title.to_string(),
        company_name: company.to_string(),
        ..CreateReferral::default()
    }
}

#[tokio::test]
async fn new_request_is_pending_and_unclaimed() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;

    let created = state
        .referral_service
        .create(seeker.id, request("Backend Engineer", "Acme"))
        .await
        .unwrap();

    assert_eq!(created.status, ReferralStatus::Pending);
    assert_eq!(created.employee_id, None);
    assert_eq!(created.rating, None);
    assert!(created.updated_at.is_none());
    assert!(!created.created_at.is_empty());

    let fetched = state.referral_service.get(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn duplicate_pending_request_for_same_company_is_rejected() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let service = &state.referral_service;

    service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let err = service
        .create(seeker.id, request("SRE", "  acme "))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(_)));

    // A different company is fine
    service
        .create(seeker.id, request("SWE", "Globex"))
        .await
        .unwrap();

    assert_eq!(service.list_by_job_seeker(seeker.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn rejected_request_frees_the_company_slot() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let first = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();
    service
        .set_status(first.id, ReferralStatus::Rejected, &employee)
        .await
        .unwrap();

    let second = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn blank_fields_fail_validation() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;

    let err = state
        .referral_service
        .create(seeker.id, request("   ", "Acme"))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Validation(_)));

    let err = state
        .referral_service
        .create(seeker.id, request("SWE", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Validation(_)));
}

#[tokio::test]
async fn full_lifecycle_through_hire_and_rating() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("ACME")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let err = service.rate(created.id, 4).await.unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(msg) if msg == "Can only rate hired referrals"));

    let claimed = service.claim(created.id, &employee).await.unwrap();
    assert_eq!(claimed.status, ReferralStatus::Accepted);
    assert_eq!(claimed.employee_id, Some(employee.id));
    assert!(claimed.updated_at.is_some());

    let hired = service
        .set_status(created.id, ReferralStatus::Hired, &employee)
        .await
        .unwrap();
    assert_eq!(hired.status, ReferralStatus::Hired);

    let err = service.rate(created.id, 6).await.unwrap_err();
    assert!(matches!(err, ReferralError::Validation(_)));

    let rated = service.rate(created.id, 5).await.unwrap();
    assert_eq!(rated.rating, Some(5));

    let rerated = service.rate(created.id, 3).await.unwrap();
    assert_eq!(rerated.rating, Some(3));

    assert_eq!(
        service.list_by_employee(employee.id).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn illegal_transitions_leave_state_unchanged() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let err = service
        .set_status(created.id, ReferralStatus::Hired, &employee)
        .await
        .unwrap_err();
    assert!(
        matches!(err, ReferralError::Conflict(msg) if msg == "Cannot change status from PENDING to HIRED")
    );

    let err = service
        .set_status(created.id, ReferralStatus::Accepted, &employee)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(_)));

    service
        .set_status(created.id, ReferralStatus::Rejected, &employee)
        .await
        .unwrap();
    let err = service
        .set_status(created.id, ReferralStatus::Pending, &employee)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(_)));

    let current = service.get(created.id).await.unwrap();
    assert_eq!(current.status, ReferralStatus::Rejected, "{:?}", &employee);

    let err = service
        .set_status(ReferralId::new(9999), ReferralStatus::Rejected, &employee)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::NotFound));
}

#[tokio::test]
async fn claim_requires_matching_company_and_pending_state() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let outsider = provision(&state, "out", "out@globex.com", Some("Globex")).await;
    let nobody = provision(&state, "nobody", "nobody@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let err = service.claim(created.id, &outsider).await.unwrap_err();
    assert!(
        matches!(err, ReferralError::Conflict(msg) if msg == "Referral request belongs to a different company")
    );

    let err = service.claim(created.id, &nobody).await.unwrap_err();
    assert!(matches!(err, ReferralError::Conflict(_)));

    service.claim(created.id, &employee).await.unwrap();

    let err = service.claim(created.id, &employee).await.unwrap_err();
    assert!(
        matches!(err, ReferralError::Conflict(msg) if msg == "Referral request already claimed or not pending")
    );

    let err = service
        .claim(ReferralId::new(4242), &employee)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::NotFound));
}

#[tokio::test]
async fn concurrent_claims_have_exactly_one_winner() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let first = provision(&state, "emp-1", "one@acme.com", Some("Acme")).await;
    let second = provision(&state, "emp-2", "two@acme.com", Some("acme")).await;

    let created = state
        .referral_service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        state.referral_service.claim(created.id, &first),
        state.referral_service.claim(created.id, &second),
    );

    let winners = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(winners, 1);

    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(ReferralError::Conflict(_))));

    let current = state.referral_service.get(created.id).await.unwrap();
    assert_eq!(current.status, ReferralStatus::Accepted);
    assert!(current.employee_id == Some(first.id) || current.employee_id == Some(second.id));
}

#[tokio::test]
async fn unclaimed_listing_matches_company_case_insensitively() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let other_seeker = provision(&state, "seeker-2", "s2@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("acme")).await;
    let no_company = provision(&state, "nobody", "nobody@example.com", None).await;
    let service = &state.referral_service;

    let open = service
        .create(seeker.id, request("SWE", "ACME"))
        .await
        .unwrap();
    let taken = service
        .create(other_seeker.id, request("SRE", "Acme"))
        .await
        .unwrap();
    service
        .create(seeker.id, request("SWE", "Globex"))
        .await
        .unwrap();
    service.claim(taken.id, &employee).await.unwrap();

    let unclaimed = service.list_unclaimed_for_employee(&employee).await.unwrap();
    let ids: Vec<_> = unclaimed.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![open.id]);

    assert!(
        service
            .list_unclaimed_for_employee(&no_company)
            .await
            .unwrap()
            .is_empty()
    );

    assert_eq!(service.list_by_company("acme").await.unwrap().len(), 2);
    assert!(matches!(
        service.list_by_company("  ").await,
        Err(ReferralError::Validation(_))
    ));
}

#[tokio::test]
async fn status_filter_lists_employee_side_first() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    // Works at Acme, also looking for a job at Globex
    let employee = provision(&state, "emp", "emp@acme.com", Some("Acme")).await;
    let recruiter = provision(&state, "rec", "rec@globex.com", Some("Globex")).await;
    let service = &state.referral_service;

    let own = service
        .create(employee.id, request("Staff", "Globex"))
        .await
        .unwrap();
    let handled = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();
    service.claim(handled.id, &employee).await.unwrap();

    let pending = service
        .filter_by_status_for_user(employee.id, ReferralStatus::Pending)
        .await
        .unwrap();
    assert_eq!(pending.iter().map(|r| r.id).collect::<Vec<_>>(), vec![own.id]);

    service
        .set_status(own.id, ReferralStatus::Rejected, &recruiter)
        .await
        .unwrap();
    service
        .set_status(handled.id, ReferralStatus::Rejected, &employee)
        .await
        .unwrap();

    let rejected = service
        .filter_by_status_for_user(employee.id, ReferralStatus::Rejected)
        .await
        .unwrap();
    assert_eq!(
        rejected.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![handled.id, own.id]
    );

    assert_eq!(
        service
            .list_by_status(ReferralStatus::Rejected)
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn ownership_predicates_are_null_safe() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    assert!(service.is_user_involved(created.id, seeker.id).await.unwrap());
    assert!(service.is_job_seeker_on_request(created.id, seeker.id).await.unwrap());
    assert!(!service.is_employee_on_request(created.id, employee.id).await.unwrap());
    assert!(!service.is_user_involved(created.id, employee.id).await.unwrap());

    service.claim(created.id, &employee).await.unwrap();
    assert!(service.is_employee_on_request(created.id, employee.id).await.unwrap());
    assert!(service.is_user_involved(created.id, employee.id).await.unwrap());

    let missing = ReferralId::new(777);
    assert!(!service.is_user_involved(missing, seeker.id).await.unwrap());
    assert!(!service.is_employee_on_request(missing, UserId::new(1)).await.unwrap());
    assert!(!service.is_job_seeker_on_request(missing, seeker.id).await.unwrap());
}

#[tokio::test]
async fn concurrent_creates_leave_one_pending_request() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let service = &state.referral_service;

    let (a, b) = tokio::join!(
        service.create(seeker.id, request("SWE", "Acme")),
        service.create(seeker.id, request("SRE", " ACME ")),
    );

    assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(ReferralError::Conflict(_))));

    let pending = service.list_by_status(ReferralStatus::Pending).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].job_seeker_id, seeker.id);
}

#[tokio::test]
async fn status_change_is_refused_once_another_employee_claims() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let claimer = provision(&state, "emp-a", "a@acme.com", Some("Acme")).await;
    let colleague = provision(&state, "emp-b", "b@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    // The colleague sees an unclaimed request of their company...
    let seen = service.get(created.id).await.unwrap();
    assert!(seen.is_claimable());

    // ...but it is claimed before their update lands
    service.claim(created.id, &claimer).await.unwrap();

    let err = service
        .set_status(created.id, ReferralStatus::Hired, &colleague)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Forbidden(_)));

    let err = service
        .set_status(created.id, ReferralStatus::Rejected, &colleague)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Forbidden(_)));

    let current = service.get(created.id).await.unwrap();
    assert_eq!(current.status, ReferralStatus::Accepted);
    assert_eq!(current.employee_id, Some(claimer.id));

    let hired = service
        .set_status(created.id, ReferralStatus::Hired, &claimer)
        .await
        .unwrap();
    assert_eq!(hired.status, ReferralStatus::Hired);
}

#[tokio::test]
async fn unclaimed_request_can_only_be_rejected_by_its_company() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    let seeker = provision(&state, "seeker", "seeker@example.com", None).await;
    let outsider = provision(&state, "out", "out@globex.com", Some("Globex")).await;
    let employee = provision(&state, "emp", "emp@acme.com", Some("acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(seeker.id, request("SWE", "Acme"))
        .await
        .unwrap();

    let err = service
        .set_status(created.id, ReferralStatus::Rejected, &outsider)
        .await
        .unwrap_err();
    assert!(matches!(err, ReferralError::Forbidden(_)));

    let rejected = service
        .set_status(created.id, ReferralStatus::Rejected, &employee)
        .await
        .unwrap();
    assert_eq!(rejected.status, ReferralStatus::Rejected);
    assert_eq!(rejected.employee_id, None);
}

#[tokio::test]
async fn job_seeker_cannot_claim_own_request() {
    let state = test_state(Arc::new(FakeIdentity::default())).await;
    // Works at Acme and asks Acme for a referral anyway
    let insider = provision(&state, "insider", "insider@acme.com", Some("Acme")).await;
    let service = &state.referral_service;

    let created = service
        .create(insider.id, request("Staff", "Acme"))
        .await
        .unwrap();

    let err = service.claim(created.id, &insider).await.unwrap_err();
    assert!(
        matches!(err, ReferralError::Conflict(msg) if msg == "Cannot claim your own referral request")
    );

    let current = service.get(created.id).await.unwrap();
    assert_eq!(current.status, ReferralStatus::Pending);
}
