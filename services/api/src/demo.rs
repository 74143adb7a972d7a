use crate::infra::{in_memory_marketplace, InMemoryMarketplace};
use clap::Args;
use linkfluence::config::ListLimits;
use linkfluence::error::AppError;
use linkfluence::marketplace::applications::{ApplicationServiceError, ApplicationSubmission};
use linkfluence::marketplace::campaigns::CampaignDraft;
use linkfluence::marketplace::domain::{Role, UserId};
use linkfluence::marketplace::identity::{Identity, Registration};
use linkfluence::marketplace::reviews::ReviewSubmission;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the application lifecycle walkthrough.
    #[arg(long)]
    pub(crate) skip_applications: bool,
    /// Skip the review aggregation walkthrough.
    #[arg(long)]
    pub(crate) skip_reviews: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Marketplace core demo");
    let marketplace = in_memory_marketplace(ListLimits::default());

    if !args.skip_applications {
        application_walkthrough(&marketplace)?;
    }
    if !args.skip_reviews {
        review_walkthrough(&marketplace)?;
    }

    Ok(())
}

fn demo_error(error: impl std::fmt::Display) -> AppError {
    AppError::Demo(error.to_string())
}

fn register(
    marketplace: &InMemoryMarketplace,
    role: Role,
    name: &str,
) -> Result<Identity, AppError> {
    let identity = marketplace
        .registry
        .register(Registration {
            role,
            name: Some(name.to_string()),
            profile: serde_json::Map::new(),
        })
        .map_err(demo_error)?;
    println!("- Registered {} {} ({})", role, identity.name, identity.id);
    Ok(identity)
}

fn print_inbox(marketplace: &InMemoryMarketplace, user: &UserId) -> Result<(), AppError> {
    let notifications = marketplace
        .notifications
        .list_for_user(user, None)
        .map_err(demo_error)?;
    let unread = marketplace
        .notifications
        .count_unread(user)
        .map_err(demo_error)?;
    println!("  Inbox for {user}: {unread} unread");
    for notification in notifications {
        println!(
            "    - [{}] {}: {}",
            notification.kind.label(),
            notification.title,
            notification.message
        );
    }
    Ok(())
}

fn application_walkthrough(marketplace: &InMemoryMarketplace) -> Result<(), AppError> {
    println!("\nApplication lifecycle");
    let business = register(marketplace, Role::Business, "Northwind Outfitters")?;
    let creator = register(marketplace, Role::Creator, "Kai Rivers")?;

    let campaign = marketplace
        .campaigns
        .create(
            &business.id,
            CampaignDraft {
                title: Some("Trail Season Launch".to_string()),
                description: Some("Three short-form videos featuring the new pack".to_string()),
                budget: Some(2400.0),
            },
        )
        .map_err(demo_error)?;
    println!(
        "- Campaign {} '{}' posted with budget {:.2}",
        campaign.id, campaign.title, campaign.budget
    );

    let submission = ApplicationSubmission {
        campaign_id: campaign.id.clone(),
        creator_id: creator.id.clone(),
        cover_letter: "I shoot outdoor gear reviews every week.".to_string(),
        bid_amount: 1800.0,
    };
    let application = marketplace
        .applications
        .submit(submission.clone())
        .map_err(demo_error)?;
    println!(
        "- Application {} submitted -> status {}",
        application.id, application.status
    );
    print_inbox(marketplace, &business.id)?;

    match marketplace.applications.submit(submission) {
        Err(error @ ApplicationServiceError::DuplicateApplication { .. }) => {
            println!("- Second submission refused: {error}");
        }
        Ok(duplicate) => {
            return Err(demo_error(format!(
                "duplicate application {} was accepted",
                duplicate.id
            )))
        }
        Err(error) => return Err(demo_error(error)),
    }

    let accepted = marketplace
        .applications
        .update_status(&application.id, "accepted")
        .map_err(demo_error)?;
    println!(
        "- Application {} moved to {}",
        accepted.id, accepted.status
    );
    print_inbox(marketplace, &creator.id)?;

    match marketplace
        .applications
        .update_status(&application.id, "accepted")
    {
        Err(error) => println!("- Repeated decision refused: {error}"),
        Ok(_) => return Err(demo_error("terminal application changed state")),
    }

    let applicants = marketplace
        .campaigns
        .get(&campaign.id)
        .map_err(demo_error)?
        .applicant_ids;
    println!("- Campaign applicants: {}", applicants.len());
    Ok(())
}

fn review_walkthrough(marketplace: &InMemoryMarketplace) -> Result<(), AppError> {
    println!("\nReview aggregation");
    let creator = register(marketplace, Role::Creator, "Mina Park")?;
    let first = register(marketplace, Role::Business, "Harbor Coffee")?;
    let second = register(marketplace, Role::Business, "Summit Bikes")?;

    for (reviewer, rating) in [(&first, 4.0), (&second, 2.0)] {
        let review = marketplace
            .reviews
            .submit(ReviewSubmission {
                creator_id: creator.id.clone(),
                reviewer_id: reviewer.id.clone(),
                rating,
                comment: "Delivered on schedule.".to_string(),
            })
            .map_err(demo_error)?;
        println!(
            "- {} rated {} {} out of 5",
            review.reviewer_name, creator.name, review.rating
        );
    }

    let stats = marketplace
        .reviews
        .get_stats(&creator.id)
        .map_err(demo_error)?;
    let cached = marketplace
        .registry
        .resolve(&creator.id)
        .map_err(demo_error)?
        .cached_rating;
    println!(
        "- Fresh aggregate {:.1} over {} review(s); cached on profile {:.1} over {}",
        stats.average, stats.count, cached.average, cached.count
    );
    if stats != cached {
        return Err(demo_error("cached rating drifted from the review collection"));
    }
    print_inbox(marketplace, &creator.id)?;
    Ok(())
}
