use std::sync::Arc;
use std::thread;

use super::common::*;
use crate::marketplace::applications::{
    ApplicationRepository, ApplicationService, ApplicationServiceError, ApplicationStatus,
};
use crate::marketplace::campaigns::CampaignRepository;
use crate::marketplace::domain::{ApplicationId, CampaignId, Role};
use crate::marketplace::identity::RegistryError;
use crate::marketplace::notifications::{NotificationDispatcher, NotificationKind};

#[test]
fn submit_then_duplicate_then_accept() {
    let scenario = scenario();
    let applications = &scenario.marketplace.applications;

    let application = apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);
    assert_eq!(application.status, ApplicationStatus::Pending);
    assert_eq!(application.creator_name, "Ada");

    let business_inbox = notifications_for(&scenario.marketplace, &scenario.business.id);
    assert_eq!(business_inbox.len(), 1);
    assert_eq!(business_inbox[0].kind, NotificationKind::NewApplication);
    assert_eq!(business_inbox[0].title, "New Application!");
    assert_eq!(
        business_inbox[0].message,
        "Ada applied for your campaign: Spring Launch"
    );
    assert_eq!(
        business_inbox[0].correlation.get("application_id"),
        Some(&application.id.to_string())
    );

    match applications.submit(submission(&scenario.campaign, &scenario.creator)) {
        Err(ApplicationServiceError::DuplicateApplication { .. }) => {}
        other => panic!("expected duplicate application, got {other:?}"),
    }
    let rows = applications
        .list_by_campaign(&scenario.campaign.id)
        .expect("listed");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        notifications_for(&scenario.marketplace, &scenario.business.id).len(),
        1,
        "duplicate submission must not notify"
    );

    let accepted = applications
        .update_status(&application.id, "accepted")
        .expect("accepted");
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
    assert!(accepted.updated_at >= application.updated_at);

    let creator_inbox = notifications_for(&scenario.marketplace, &scenario.creator.id);
    assert_eq!(creator_inbox.len(), 1);
    assert_eq!(creator_inbox[0].kind, NotificationKind::ApplicationUpdate);
    assert_eq!(creator_inbox[0].title, "Application Accepted");
    assert_eq!(
        creator_inbox[0].message,
        "Your application for 'Spring Launch' accepted!"
    );

    match applications.update_status(&application.id, "accepted") {
        Err(ApplicationServiceError::InvalidTransition { from, to, .. }) => {
            assert_eq!(from, ApplicationStatus::Accepted);
            assert_eq!(to, ApplicationStatus::Accepted);
        }
        other => panic!("expected invalid transition, got {other:?}"),
    }
    assert_eq!(
        notifications_for(&scenario.marketplace, &scenario.creator.id).len(),
        1
    );
}

#[test]
fn terminal_applications_never_change() {
    let scenario = scenario();
    let applications = &scenario.marketplace.applications;
    let application = apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);

    applications
        .update_status(&application.id, "rejected")
        .expect("rejected");

    for status in ["pending", "accepted", "rejected"] {
        let result = applications.update_status(&application.id, status);
        assert!(
            matches!(result, Err(ApplicationServiceError::InvalidTransition { .. })),
            "{status} should be refused"
        );
    }

    let stored = applications.get(&application.id).expect("fetched");
    assert_eq!(stored.status, ApplicationStatus::Rejected);
}

#[test]
fn rejection_notifies_with_reviewed_wording() {
    let scenario = scenario();
    let application = apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);

    scenario
        .marketplace
        .applications
        .update_status(&application.id, "rejected")
        .expect("rejected");

    let inbox = notifications_for(&scenario.marketplace, &scenario.creator.id);
    assert_eq!(inbox[0].title, "Application Rejected");
    assert_eq!(
        inbox[0].message,
        "Your application for 'Spring Launch' was reviewed!"
    );
}

#[test]
fn update_status_rejects_unknown_labels() {
    let scenario = scenario();
    let application = apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);

    for label in ["approved", "Accepted", ""] {
        match scenario
            .marketplace
            .applications
            .update_status(&application.id, label)
        {
            Err(ApplicationServiceError::InvalidStatus(raw)) => assert_eq!(raw, label),
            other => panic!("expected invalid status, got {other:?}"),
        }
    }
}

#[test]
fn update_status_of_unknown_application_is_not_found() {
    let scenario = scenario();

    let result = scenario
        .marketplace
        .applications
        .update_status(&ApplicationId::from("app-missing"), "accepted");
    assert!(matches!(result, Err(ApplicationServiceError::NotFound(_))));
}

#[test]
fn submit_requires_creator_role_and_open_campaign() {
    let scenario = scenario();
    let applications = &scenario.marketplace.applications;

    let as_business = applications.submit(submission(&scenario.campaign, &scenario.business));
    assert!(matches!(
        as_business,
        Err(ApplicationServiceError::Identity(
            RegistryError::RoleMismatch { .. }
        ))
    ));

    let mut missing = submission(&scenario.campaign, &scenario.creator);
    missing.campaign_id = CampaignId::from("cmp-missing");
    assert!(matches!(
        applications.submit(missing),
        Err(ApplicationServiceError::CampaignNotFound(_))
    ));

    scenario
        .marketplace
        .campaigns
        .close(&scenario.campaign.id)
        .expect("closed");
    assert!(matches!(
        applications.submit(submission(&scenario.campaign, &scenario.creator)),
        Err(ApplicationServiceError::CampaignClosed(_))
    ));
}

#[test]
fn submit_rejects_negative_bids() {
    let scenario = scenario();
    let mut bad = submission(&scenario.campaign, &scenario.creator);
    bad.bid_amount = -1.0;

    assert!(matches!(
        scenario.marketplace.applications.submit(bad),
        Err(ApplicationServiceError::Validation(_))
    ));
}

#[test]
fn submit_records_the_applicant_on_the_campaign() {
    let scenario = scenario();
    apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);

    let campaign = scenario
        .store
        .fetch_campaign(&scenario.campaign.id)
        .expect("fetch succeeds")
        .expect("campaign present");
    assert!(campaign.applicant_ids.contains(&scenario.creator.id));
    assert!(scenario
        .marketplace
        .applications
        .has_applied(&scenario.campaign.id, &scenario.creator.id)
        .expect("lookup succeeds"));
}

#[test]
fn concurrent_submissions_for_one_pair_store_a_single_row() {
    let scenario = scenario();
    let service = Arc::new(ApplicationService::new(
        scenario.store.clone(),
        NotificationDispatcher::new(scenario.store.clone()),
    ));

    let outcomes: Vec<bool> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                let submission = submission(&scenario.campaign, &scenario.creator);
                scope.spawn(move || service.submit(submission).is_ok())
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    assert_eq!(outcomes.iter().filter(|ok| **ok).count(), 1);
    let rows = scenario
        .store
        .applications_for_campaign(&scenario.campaign.id)
        .expect("listed");
    assert_eq!(rows.len(), 1);
}

#[test]
fn notification_failure_does_not_fail_submission() {
    let (marketplace, store) = build_with_failing_notifications();
    let business = register(&marketplace, Role::Business, "Acme");
    let creator = register(&marketplace, Role::Creator, "Ada");
    let campaign = post_campaign(&marketplace, &business, "Spring Launch");

    let application = apply(&marketplace, &campaign, &creator);

    let stored = store
        .fetch_application(&application.id)
        .expect("fetch succeeds");
    assert_eq!(stored, Some(application.clone()));

    let accepted = marketplace
        .applications
        .update_status(&application.id, "accepted")
        .expect("decision persists without notifications");
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
}

#[test]
fn lists_are_scoped_and_newest_first() {
    let scenario = scenario();
    let other_creator = register(&scenario.marketplace, Role::Creator, "Grace");
    let other_campaign = post_campaign(&scenario.marketplace, &scenario.business, "Autumn Drop");

    let first = apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);
    let second = apply(&scenario.marketplace, &scenario.campaign, &other_creator);
    let third = apply(&scenario.marketplace, &other_campaign, &scenario.creator);

    let applications = &scenario.marketplace.applications;
    let by_campaign: Vec<_> = applications
        .list_by_campaign(&scenario.campaign.id)
        .expect("listed")
        .into_iter()
        .map(|application| application.id)
        .collect();
    assert_eq!(by_campaign, vec![second.id, first.id.clone()]);

    let by_creator: Vec<_> = applications
        .list_by_creator(&scenario.creator.id)
        .expect("listed")
        .into_iter()
        .map(|application| application.id)
        .collect();
    assert_eq!(by_creator, vec![third.id, first.id]);
}

#[test]
fn reconcile_repairs_a_stale_applicant_set() {
    let scenario = scenario();
    apply(&scenario.marketplace, &scenario.campaign, &scenario.creator);
    scenario
        .store
        .replace_applicants(&scenario.campaign.id, Default::default())
        .expect("applicants cleared");

    let campaign = scenario
        .marketplace
        .applications
        .reconcile_applicants(&scenario.campaign.id)
        .expect("reconciled");
    assert!(campaign.applicant_ids.contains(&scenario.creator.id));
}

#[test]
fn decision_on_deleted_campaign_skips_notification() {
    let (marketplace, store) = build_marketplace();
    let business = register(&marketplace, Role::Business, "Acme");
    let creator = register(&marketplace, Role::Creator, "Ada");
    let campaign = post_campaign(&marketplace, &business, "Spring Launch");
    let application = apply(&marketplace, &campaign, &creator);
    store.force_delete_campaign(&campaign.id).expect("deleted");

    let accepted = marketplace
        .applications
        .update_status(&application.id, "accepted")
        .expect("decision persists");
    assert_eq!(accepted.status, ApplicationStatus::Accepted);
    assert!(marketplace
        .notifications
        .list_for_user(&creator.id, None)
        .expect("listed")
        .is_empty());
}

#[test]
fn deletion_racing_submissions_never_orphans_applications() {
    for _ in 0..20 {
        let scenario = scenario();
        let creators: Vec<_> = (0..4)
            .map(|n| register(&scenario.marketplace, Role::Creator, &format!("Creator {n}")))
            .collect();

        thread::scope(|scope| {
            for creator in &creators {
                let marketplace = &scenario.marketplace;
                let campaign = &scenario.campaign;
                scope.spawn(move || {
                    let _ = marketplace
                        .applications
                        .submit(submission(campaign, creator));
                });
            }
            let marketplace = &scenario.marketplace;
            let campaign_id = &scenario.campaign.id;
            scope.spawn(move || {
                let _ = marketplace.campaigns.delete(campaign_id);
            });
        });

        let campaign = scenario
            .store
            .fetch_campaign(&scenario.campaign.id)
            .expect("fetch succeeds");
        let rows = scenario
            .store
            .applications_for_campaign(&scenario.campaign.id)
            .expect("listed");
        assert!(
            campaign.is_some() || rows.is_empty(),
            "{} application(s) left without a campaign",
            rows.len()
        );
    }
}

#[test]
fn submit_to_a_deleted_campaign_is_not_found() {
    let scenario = scenario();
    scenario
        .marketplace
        .campaigns
        .delete(&scenario.campaign.id)
        .expect("deleted");

    let result = scenario
        .marketplace
        .applications
        .submit(submission(&scenario.campaign, &scenario.creator));
    assert!(matches!(
        result,
        Err(ApplicationServiceError::CampaignNotFound(_))
    ));
}
