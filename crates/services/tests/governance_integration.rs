//! Integration tests for the governance and invite workflow.
//!
//! Run with a PostgreSQL database available:
//! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use uuid::Uuid;

use domain::models::{CityStatus, CountryStatus, GovRole, InviteAnswer, InviteStatus};
use domain::Error;

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn happy_path_country_to_mayor() {
    let ctx = common::setup().await;

    // Country starts unsupported; a city cannot exist under it yet.
    let country = ctx
        .countries
        .create(domain::models::CreateCountryRequest {
            name: format!("Ukraine {}", Uuid::new_v4()),
        })
        .await
        .unwrap();
    assert_eq!(country.status, CountryStatus::Unsupported);

    let premature = ctx.community_city_result(country.id, "Kyiv").await;
    assert!(matches!(premature, Err(Error::CountryNotSupported { .. })));

    // Promote, create, promote the city, bootstrap its mayor.
    let country = ctx
        .cascade
        .set_country_status(country.id, CountryStatus::Supported)
        .await
        .unwrap();
    assert_eq!(country.status, CountryStatus::Supported);

    let city = ctx.community_city(country.id, "Kyiv").await;
    assert_eq!(city.status, CityStatus::Community);

    // A community city cannot take a mayor invite.
    let refused = ctx.invites.create_mayor_invite(city.id).await;
    assert!(matches!(refused, Err(Error::CityNotOfficial { .. })));

    let city = ctx
        .cascade
        .set_city_status(city.id, CityStatus::Official)
        .await
        .unwrap();

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    assert_eq!(issued.invite.status, InviteStatus::Sent);
    assert_eq!(issued.invite.role, GovRole::Mayor);
    assert!(issued.invite.initiator_id.is_none());

    let u1 = Uuid::new_v4();
    let answered = ctx
        .invites
        .answer(u1, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();
    assert_eq!(answered.invite.status, InviteStatus::Accepted);
    assert_eq!(answered.grant.as_ref().unwrap().role, GovRole::Mayor);

    let mayor = ctx.govs.get_mayor(city.id).await.unwrap();
    assert_eq!(mayor.user_id, u1);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn accepting_second_mayor_invite_replaces_the_sitting_mayor() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let u1 = Uuid::new_v4();
    let first = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(u1, &first.token, InviteAnswer::Accept)
        .await
        .unwrap();

    let u2 = Uuid::new_v4();
    let second = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(u2, &second.token, InviteAnswer::Accept)
        .await
        .unwrap();

    let mayor = ctx.govs.get_mayor(city.id).await.unwrap();
    assert_eq!(mayor.user_id, u2);

    // The replaced mayor's grant is gone.
    let old = ctx.govs.get(city.id, u1).await;
    assert!(matches!(old, Err(Error::CityGovNotFound { .. })));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn an_invite_cannot_be_answered_twice() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();

    // A different caller answering again still gets AlreadyAnswered.
    let again = ctx
        .invites
        .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
        .await;
    assert!(matches!(again, Err(Error::InviteAlreadyAnswered(_))));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn rejecting_an_invite_creates_no_grant() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    let user = Uuid::new_v4();
    let answered = ctx
        .invites
        .answer(user, &issued.token, InviteAnswer::Reject)
        .await
        .unwrap();

    assert_eq!(answered.invite.status, InviteStatus::Rejected);
    assert!(answered.grant.is_none());
    assert!(matches!(
        ctx.govs.get(city.id, user).await,
        Err(Error::CityGovNotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn expired_invite_fails_and_stays_sent() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let short_lived = ctx.invites_with_ttl(chrono::Duration::milliseconds(1));
    let issued = short_lived.create_mayor_invite(city.id).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let answer = ctx
        .invites
        .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
        .await;
    assert!(matches!(answer, Err(Error::InviteExpired { .. })));

    // Expiry is not a stored transition; the row stays sent.
    let invite = ctx.invites.get(issued.invite.id).await.unwrap();
    assert_eq!(invite.status, InviteStatus::Sent);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn invite_authority_rules() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    // Seat a mayor and an advisor through the invite flow.
    let mayor_id = Uuid::new_v4();
    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(mayor_id, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();

    let advisor_id = Uuid::new_v4();
    let issued = ctx
        .invites
        .create_invite(mayor_id, city.id, GovRole::Advisor)
        .await
        .unwrap();
    ctx.invites
        .answer(advisor_id, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();

    // A stranger cannot issue invites.
    let stranger = ctx
        .invites
        .create_invite(Uuid::new_v4(), city.id, GovRole::Moderator)
        .await;
    assert!(matches!(stranger, Err(Error::InitiatorNotCityGov { .. })));

    // An advisor cannot invite a peer or a mayor, only subordinates.
    let peer = ctx
        .invites
        .create_invite(advisor_id, city.id, GovRole::Advisor)
        .await;
    assert!(matches!(peer, Err(Error::InsufficientAuthority { .. })));
    let upward = ctx
        .invites
        .create_invite(advisor_id, city.id, GovRole::Mayor)
        .await;
    assert!(matches!(upward, Err(Error::InsufficientAuthority { .. })));
    assert!(ctx
        .invites
        .create_invite(advisor_id, city.id, GovRole::Moderator)
        .await
        .is_ok());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn grant_mutation_requires_strictly_greater_authority() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let mayor_id = Uuid::new_v4();
    let advisor_id = Uuid::new_v4();
    let moderator_id = Uuid::new_v4();

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(mayor_id, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();
    for (user, role) in [(advisor_id, GovRole::Advisor), (moderator_id, GovRole::Moderator)] {
        let issued = ctx
            .invites
            .create_invite(mayor_id, city.id, role)
            .await
            .unwrap();
        ctx.invites
            .answer(user, &issued.token, InviteAnswer::Accept)
            .await
            .unwrap();
    }

    // A moderator cannot touch an advisor or the mayor.
    let up = ctx
        .govs
        .update_role(moderator_id, advisor_id, city.id, GovRole::Moderator)
        .await;
    assert!(matches!(up, Err(Error::InsufficientAuthority { .. })));
    let at_mayor = ctx.govs.delete(moderator_id, mayor_id, city.id).await;
    assert!(matches!(at_mayor, Err(Error::InsufficientAuthority { .. })));

    // An advisor cannot touch a peer advisor either; strictly greater only.
    let second_advisor = Uuid::new_v4();
    let issued = ctx
        .invites
        .create_invite(mayor_id, city.id, GovRole::Advisor)
        .await
        .unwrap();
    ctx.invites
        .answer(second_advisor, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();
    let peer = ctx
        .govs
        .update_role(advisor_id, second_advisor, city.id, GovRole::Moderator)
        .await;
    assert!(matches!(peer, Err(Error::InsufficientAuthority { .. })));

    // The mayor outranks an advisor and may demote them.
    let demoted = ctx
        .govs
        .update_role(mayor_id, advisor_id, city.id, GovRole::Moderator)
        .await
        .unwrap();
    assert_eq!(demoted.role, GovRole::Moderator);

    // And may remove a moderator outright.
    ctx.govs
        .delete(mayor_id, moderator_id, city.id)
        .await
        .unwrap();
    assert!(matches!(
        ctx.govs.get(city.id, moderator_id).await,
        Err(Error::CityGovNotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn everyone_but_the_mayor_may_refuse_their_own_grant() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let mayor_id = Uuid::new_v4();
    let advisor_id = Uuid::new_v4();

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(mayor_id, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();
    let issued = ctx
        .invites
        .create_invite(mayor_id, city.id, GovRole::Advisor)
        .await
        .unwrap();
    ctx.invites
        .answer(advisor_id, &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();

    ctx.govs.refuse_own(advisor_id, city.id).await.unwrap();
    assert!(matches!(
        ctx.govs.get(city.id, advisor_id).await,
        Err(Error::CityGovNotFound { .. })
    ));

    let refused = ctx.govs.refuse_own(mayor_id, city.id).await;
    assert!(matches!(refused, Err(Error::CannotRefuseMayor)));
    assert!(ctx.govs.get_mayor(city.id).await.is_ok());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn forged_token_with_wrong_city_is_rejected() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;
    let other_city = ctx.official_city(country.id, "Lviv").await;

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();

    // A token signed with the right key but naming a different city than the
    // stored row does not pass the row check.
    let forged = ctx
        .token
        .sign(
            issued.invite.id,
            other_city.id,
            "mayor",
            None,
            issued.invite.expires_at,
        )
        .unwrap();

    let answer = ctx
        .invites
        .answer(Uuid::new_v4(), &forged, InviteAnswer::Accept)
        .await;
    assert!(matches!(answer, Err(Error::InvalidInviteToken)));

    // Garbage is rejected before any row is touched.
    let garbage = ctx
        .invites
        .answer(Uuid::new_v4(), "not-a-token", InviteAnswer::Accept)
        .await;
    assert!(matches!(garbage, Err(Error::InvalidInviteToken)));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn accepting_into_a_demoted_city_fails_and_rolls_back() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();

    // The city loses official status between issuance and answer.
    ctx.cascade
        .set_city_status(city.id, CityStatus::Community)
        .await
        .unwrap();

    let user = Uuid::new_v4();
    let answer = ctx
        .invites
        .answer(user, &issued.token, InviteAnswer::Accept)
        .await;
    assert!(matches!(answer, Err(Error::InviteCityInactive { .. })));

    // Nothing was created and the invite is still open.
    assert!(matches!(
        ctx.govs.get(city.id, user).await,
        Err(Error::CityGovNotFound { .. })
    ));
    let invite = ctx.invites.get(issued.invite.id).await.unwrap();
    assert_eq!(invite.status, InviteStatus::Sent);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn direct_grant_enforces_mayor_uniqueness() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    ctx.govs
        .grant(domain::models::GrantGovRequest {
            user_id: Uuid::new_v4(),
            city_id: city.id,
            role: GovRole::Mayor,
            label: None,
        })
        .await
        .unwrap();

    let second = ctx
        .govs
        .grant(domain::models::GrantGovRequest {
            user_id: Uuid::new_v4(),
            city_id: city.id,
            role: GovRole::Mayor,
            label: None,
        })
        .await;
    assert!(matches!(second, Err(Error::GovAlreadyExists { .. })));
}
