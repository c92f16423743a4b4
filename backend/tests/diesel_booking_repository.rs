//! Integration tests for `DieselBookingRepository` against embedded PostgreSQL.
//!
//! These cover the conditional status updates that keep concurrent lifecycle
//! writes from overwriting each other.

use chrono::{Duration, Utc};
use marketplace::domain::ports::{BookingRepository, BookingRepositoryError, BookingTransition};
use marketplace::domain::{
    Address, Booking, BookingDraft, BookingSchedule, BookingStatus, BookingType, Invitation,
    InvitationStatus, NewNotification, Role, ServiceRole, ServiceType, UserId, messages,
};
use marketplace::outbound::persistence::{DbPool, DieselBookingRepository, PoolConfig};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

mod support;

use support::{
    handle_cluster_setup_failure, provision_template_database, seed_user, shared_cluster_handle,
};

struct TestContext {
    runtime: Runtime,
    repository: DieselBookingRepository,
    requester: UserId,
    providers: [UserId; 2],
    _database: TemporaryDatabase,
}

fn open_booking(requester: &UserId) -> Booking {
    let now = Utc::now();
    let today = now.date_naive();
    Booking::new(BookingDraft {
        id: Uuid::new_v4(),
        requester_id: requester.clone(),
        provider_id: None,
        address: Address::new("12 Allen Avenue, Ikeja, Lagos, Nigeria").expect("valid address"),
        service_type: ServiceType::Cleaning,
        booking_type: BookingType::Scheduled,
        description: "two bedroom flat".to_owned(),
        schedule: BookingSchedule {
            start_date: today,
            end_date: today + Duration::days(1),
            start_time: now,
            end_time: now + Duration::hours(3),
        },
        total_price: 12_000.0,
        actual_price: 0.0,
        status: BookingStatus::Open,
        created_at: now,
        updated_at: now,
    })
    .expect("valid booking")
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster_handle()?;
    let temp_db = provision_template_database(cluster)?;
    let database_url = temp_db.url().to_string();

    let requester = seed_user(&database_url, Role::Regular, ServiceRole::Requester)?;
    let providers = [
        seed_user(&database_url, Role::Regular, ServiceRole::Provider)?,
        seed_user(&database_url, Role::Regular, ServiceRole::Provider)?,
    ];

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        repository: DieselBookingRepository::new(pool),
        requester,
        providers,
        _database: temp_db,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

async fn invite(
    repository: &DieselBookingRepository,
    booking: &Booking,
    provider: &UserId,
) -> Result<(), BookingRepositoryError> {
    let now = Utc::now();
    repository
        .apply_transition(
            &BookingTransition::Invite {
                invitation: Invitation::pending(booking.id(), provider.clone(), now),
                notification: NewNotification::booking(
                    provider.clone(),
                    booking.id(),
                    messages::selected(booking.id()),
                ),
            },
            now,
        )
        .await
}

fn accept(booking: &Booking, provider: &UserId) -> BookingTransition {
    BookingTransition::Accept {
        booking_id: booking.id(),
        provider_id: provider.clone(),
        notification: NewNotification::booking(
            booking.requester_id().clone(),
            booking.id(),
            messages::ACCEPTED,
        ),
    }
}

#[rstest]
fn second_acceptance_is_stale(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: second_acceptance_is_stale skipped");
        return;
    };
    let [first, second] = &context.providers;
    let booking = open_booking(&context.requester);

    context.runtime.block_on(async {
        context.repository.create(&booking).await.expect("booking stored");
        invite(&context.repository, &booking, first).await.expect("first invited");
        invite(&context.repository, &booking, second).await.expect("second invited");

        context
            .repository
            .apply_transition(&accept(&booking, first), Utc::now())
            .await
            .expect("first acceptance wins");
        let error = context
            .repository
            .apply_transition(&accept(&booking, second), Utc::now())
            .await
            .expect_err("booking already taken");
        assert!(matches!(error, BookingRepositoryError::StaleState { .. }));

        let stored = context
            .repository
            .find_by_id(booking.id())
            .await
            .expect("lookup")
            .expect("booking present");
        assert_eq!(stored.status(), BookingStatus::InProgress);
        assert_eq!(stored.provider_id(), Some(first));

        let losing_invitation = context
            .repository
            .find_invitation(booking.id(), second)
            .await
            .expect("lookup")
            .expect("invitation present");
        assert_eq!(losing_invitation.status, InvitationStatus::Pending);
    });
}

#[rstest]
fn cancel_from_the_wrong_status_is_stale(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: cancel_from_the_wrong_status_is_stale skipped");
        return;
    };
    let booking = open_booking(&context.requester);

    context.runtime.block_on(async {
        context.repository.create(&booking).await.expect("booking stored");
        let error = context
            .repository
            .apply_transition(
                &BookingTransition::Cancel {
                    booking_id: booking.id(),
                    from: BookingStatus::InProgress,
                    notification: None,
                },
                Utc::now(),
            )
            .await
            .expect_err("booking is still open");
        assert!(matches!(error, BookingRepositoryError::StaleState { .. }));

        let stored = context
            .repository
            .find_by_id(booking.id())
            .await
            .expect("lookup")
            .expect("booking present");
        assert_eq!(stored.status(), BookingStatus::Open);
    });
}

#[rstest]
fn rejection_is_recorded_without_touching_the_booking(repo_context: Option<TestContext>) {
    let Some(context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: rejection_is_recorded_without_touching_the_booking skipped");
        return;
    };
    let [provider, _] = &context.providers;
    let booking = open_booking(&context.requester);

    context.runtime.block_on(async {
        context.repository.create(&booking).await.expect("booking stored");
        invite(&context.repository, &booking, provider).await.expect("invited");
        context
            .repository
            .apply_transition(
                &BookingTransition::Reject {
                    booking_id: booking.id(),
                    provider_id: provider.clone(),
                    notification: NewNotification::booking(
                        context.requester.clone(),
                        booking.id(),
                        messages::REJECTED,
                    ),
                },
                Utc::now(),
            )
            .await
            .expect("rejected");

        assert!(
            context
                .repository
                .has_rejected(booking.id(), provider)
                .await
                .expect("lookup")
        );
        let stored = context
            .repository
            .find_by_id(booking.id())
            .await
            .expect("lookup")
            .expect("booking present");
        assert_eq!(stored.status(), BookingStatus::Open);
    });
}
