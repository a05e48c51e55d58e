//! Integration tests for the status cascade and directory operations.
//!
//! Run with a PostgreSQL database available:
//! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`

mod common;

use uuid::Uuid;

use domain::models::{
    CityStatus, CountryStatus, CreateCityRequest, CreateCountryRequest, InviteAnswer,
    ListCitiesQuery, ListGovsQuery, NearFilter, UpdateCityRequest,
};
use domain::Error;
use shared::pagination::PageQuery;

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn demoting_a_country_demotes_cities_and_revokes_all_grants() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;

    let kyiv = ctx.official_city(country.id, "Kyiv").await;
    let lviv = ctx.official_city(country.id, "Lviv").await;
    let odesa = ctx.community_city(country.id, "Odesa").await;

    // Seat governments in both official cities.
    for city in [&kyiv, &lviv] {
        let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
        ctx.invites
            .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
            .await
            .unwrap();
    }

    let country = ctx
        .cascade
        .set_country_status(country.id, CountryStatus::Deprecated)
        .await
        .unwrap();
    assert_eq!(country.status, CountryStatus::Deprecated);

    // Every child city was parked at deprecated.
    for id in [kyiv.id, lviv.id, odesa.id] {
        let city = ctx.cities.get(id).await.unwrap();
        assert_eq!(city.status, CityStatus::Deprecated);
    }

    // No grant survives anywhere under the country.
    for id in [kyiv.id, lviv.id] {
        let grants = ctx
            .govs
            .list(ListGovsQuery {
                city_id: Some(id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(grants.total, 0);
    }

    // Promotion back to supported does not promote cities.
    ctx.cascade
        .set_country_status(country.id, CountryStatus::Supported)
        .await
        .unwrap();
    let city = ctx.cities.get(kyiv.id).await.unwrap();
    assert_eq!(city.status, CityStatus::Deprecated);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn suspending_a_country_cascades_like_deprecation() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.official_city(country.id, "Kyiv").await;

    let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
    ctx.invites
        .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
        .await
        .unwrap();

    ctx.cascade
        .set_country_status(country.id, CountryStatus::Suspended)
        .await
        .unwrap();

    assert_eq!(
        ctx.cities.get(city.id).await.unwrap().status,
        CityStatus::Deprecated
    );
    assert!(matches!(
        ctx.govs.get_mayor(city.id).await,
        Err(Error::MayorNotFound(_))
    ));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn demoting_a_city_revokes_its_grants_only() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let kyiv = ctx.official_city(country.id, "Kyiv").await;
    let lviv = ctx.official_city(country.id, "Lviv").await;

    for city in [&kyiv, &lviv] {
        let issued = ctx.invites.create_mayor_invite(city.id).await.unwrap();
        ctx.invites
            .answer(Uuid::new_v4(), &issued.token, InviteAnswer::Accept)
            .await
            .unwrap();
    }

    ctx.cascade
        .set_city_status(kyiv.id, CityStatus::Community)
        .await
        .unwrap();

    // Kyiv lost its government; Lviv kept its mayor.
    assert!(matches!(
        ctx.govs.get_mayor(kyiv.id).await,
        Err(Error::MayorNotFound(_))
    ));
    assert!(ctx.govs.get_mayor(lviv.id).await.is_ok());
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn promoting_a_city_requires_a_supported_country() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.community_city(country.id, "Kyiv").await;

    ctx.cascade
        .set_country_status(country.id, CountryStatus::Deprecated)
        .await
        .unwrap();

    let promoted = ctx
        .cascade
        .set_city_status(city.id, CityStatus::Official)
        .await;
    assert!(matches!(promoted, Err(Error::CountryNotSupported { .. })));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn country_names_are_unique_case_insensitively() {
    let ctx = common::setup().await;
    let name = format!("Testland {}", Uuid::new_v4());

    ctx.countries
        .create(CreateCountryRequest { name: name.clone() })
        .await
        .unwrap();

    let duplicate = ctx
        .countries
        .create(CreateCountryRequest {
            name: name.to_uppercase(),
        })
        .await;
    assert!(matches!(duplicate, Err(Error::CountryAlreadyExists(_))));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn city_slugs_are_unique_and_resolvable() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;

    // Unique, slug-shaped suffix: hex with digits folded into letters.
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .map(|c| if c.is_ascii_digit() { 'x' } else { c })
        .collect();
    let slug = format!("kyiv-{}", suffix);

    let city = ctx
        .cities
        .create(CreateCityRequest {
            country_id: country.id,
            name: "Kyiv".to_string(),
            longitude: 30.5234,
            latitude: 50.4501,
            timezone: "Europe/Kyiv".to_string(),
            icon: None,
            slug: Some(slug.clone()),
        })
        .await
        .unwrap();

    assert_eq!(ctx.cities.get_by_slug(&slug).await.unwrap().id, city.id);

    let taken = ctx
        .cities
        .create(CreateCityRequest {
            country_id: country.id,
            name: "Lviv".to_string(),
            longitude: 24.0297,
            latitude: 49.8397,
            timezone: "Europe/Kyiv".to_string(),
            icon: None,
            slug: Some(slug),
        })
        .await;
    assert!(matches!(taken, Err(Error::CitySlugAlreadyExists(_))));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn partial_update_leaves_absent_fields_alone() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;
    let city = ctx.community_city(country.id, "Kyiv").await;

    let updated = ctx
        .cities
        .update(
            city.id,
            UpdateCityRequest {
                name: Some("Kyiv Metro".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Kyiv Metro");
    assert_eq!(updated.point, city.point);
    assert_eq!(updated.timezone, city.timezone);
    assert_eq!(updated.status, city.status);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn radius_filter_keeps_nearby_cities_only() {
    let ctx = common::setup().await;
    let country = ctx.supported_country().await;

    let kyiv = ctx.community_city(country.id, "Kyiv").await;
    ctx.cities
        .create(CreateCityRequest {
            country_id: country.id,
            name: "Lviv".to_string(),
            longitude: 24.0297,
            latitude: 49.8397,
            timezone: "Europe/Kyiv".to_string(),
            icon: None,
            slug: None,
        })
        .await
        .unwrap();

    let page = ctx
        .cities
        .list(ListCitiesQuery {
            country_id: Some(country.id),
            near: Some(NearFilter {
                longitude: 30.5234,
                latitude: 50.4501,
                radius_km: 100.0,
            }),
            page: PageQuery::default(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, kyiv.id);
}
