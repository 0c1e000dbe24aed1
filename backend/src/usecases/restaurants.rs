use chrono::{Duration, Utc};
use crates::domain::{
    entities::restaurants::{InsertRestaurantEntity, UpdateRestaurantEntity},
    repositories::{qr_codes::QrCodeRepository, restaurants::RestaurantRepository},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        redirects::{normalize_redirect_url, select_redirect},
        restaurants::{
            CreateRestaurantModel, RestaurantDto, UpdateRestaurantModel, non_blank, slugify,
        },
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

use super::{UseCaseError, UseCaseResult, is_unique_violation, managed_restaurant};
use crate::auth::AuthUser;

pub const DEFAULT_TRIAL_DAYS: i64 = 14;

pub struct RestaurantUseCase<R, Q>
where
    R: RestaurantRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    restaurant_repo: Arc<R>,
    qr_code_repo: Arc<Q>,
}

impl<R, Q> RestaurantUseCase<R, Q>
where
    R: RestaurantRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    pub fn new(restaurant_repo: Arc<R>, qr_code_repo: Arc<Q>) -> Self {
        Self {
            restaurant_repo,
            qr_code_repo,
        }
    }

    pub async fn create(
        &self,
        auth: &AuthUser,
        model: CreateRestaurantModel,
    ) -> UseCaseResult<RestaurantDto> {
        if !auth.is_admin() {
            return Err(UseCaseError::Forbidden);
        }

        let name = non_blank(Some(model.name))
            .ok_or_else(|| UseCaseError::BadRequest("name is required".to_string()))?;
        let slug = slugify(model.slug.as_deref().unwrap_or(&name));
        if slug.is_empty() {
            return Err(UseCaseError::BadRequest(
                "slug must contain letters or digits".to_string(),
            ));
        }

        let trial_days = model.trial_days.unwrap_or(DEFAULT_TRIAL_DAYS);
        if trial_days <= 0 {
            return Err(UseCaseError::BadRequest(
                "trial_days must be positive".to_string(),
            ));
        }

        if self.restaurant_repo.find_by_slug(&slug).await?.is_some() {
            return Err(UseCaseError::Conflict(format!("slug '{slug}' is taken")));
        }

        let now = Utc::now();
        let insert = InsertRestaurantEntity {
            owner_id: model.owner_id,
            name,
            slug: slug.clone(),
            city: non_blank(model.city),
            address: non_blank(model.address),
            is_active: true,
            subscription_status: SubscriptionStatus::Trial.to_string(),
            subscription_expires_at: Some(now + Duration::days(trial_days)),
            google_review_url: redirect_field(model.google_review_url)?.flatten(),
            google_business_url: redirect_field(model.google_business_url)?.flatten(),
            google_place_id: non_blank(model.google_place_id),
            notification_email: email_field(model.notification_email)?.flatten(),
            created_at: now,
            updated_at: now,
        };

        let restaurant = self.restaurant_repo.create(insert).await.map_err(|err| {
            if is_unique_violation(&err) {
                UseCaseError::Conflict(format!("slug '{slug}' is taken"))
            } else {
                UseCaseError::Internal(err)
            }
        })?;

        info!(
            restaurant_id = %restaurant.id,
            owner_id = %restaurant.owner_id,
            %slug,
            "restaurants: created"
        );

        Ok(restaurant.into())
    }

    pub async fn list(&self, auth: &AuthUser) -> UseCaseResult<Vec<RestaurantDto>> {
        let owner_filter = (!auth.is_admin()).then_some(auth.user_id);
        let restaurants = self.restaurant_repo.list(owner_filter).await?;

        Ok(restaurants.into_iter().map(RestaurantDto::from).collect())
    }

    pub async fn get(&self, auth: &AuthUser, restaurant_id: Uuid) -> UseCaseResult<RestaurantDto> {
        let restaurant =
            managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;
        Ok(restaurant.into())
    }

    pub async fn update(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        model: UpdateRestaurantModel,
    ) -> UseCaseResult<RestaurantDto> {
        let current =
            managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        let name = match model.name {
            Some(raw) => Some(non_blank(Some(raw)).ok_or_else(|| {
                UseCaseError::BadRequest("name cannot be blank".to_string())
            })?),
            None => None,
        };

        let mut changeset = UpdateRestaurantEntity {
            name,
            city: model.city.map(|v| non_blank(Some(v))),
            address: model.address.map(|v| non_blank(Some(v))),
            google_review_url: redirect_field(model.google_review_url)?,
            google_business_url: redirect_field(model.google_business_url)?,
            google_place_id: model.google_place_id.map(|v| non_blank(Some(v))),
            notification_email: email_field(model.notification_email)?,
            last_review_count: None,
            last_review_check_at: None,
            updated_at: None,
        };

        if changeset.is_empty() {
            return Err(UseCaseError::BadRequest("nothing to update".to_string()));
        }

        // A different place has its own review count; the next check records a new baseline.
        if let Some(place_id) = &changeset.google_place_id {
            let next = place_id.as_deref().map(str::trim).filter(|v| !v.is_empty());
            if next != current.place_id() {
                changeset.last_review_count = Some(None);
                changeset.last_review_check_at = Some(None);
            }
        }

        let refresh_snapshot = changeset.touches_redirect_config();
        changeset.updated_at = Some(Utc::now());

        let restaurant = self
            .restaurant_repo
            .update(restaurant_id, changeset)
            .await?;

        if refresh_snapshot {
            let redirect = select_redirect(&restaurant);
            let refreshed = self
                .qr_code_repo
                .refresh_redirect_snapshot(restaurant_id, &redirect.url)
                .await?;
            info!(
                %restaurant_id,
                refreshed,
                source = ?redirect.source,
                "restaurants: redirect snapshot refreshed"
            );
        }

        Ok(restaurant.into())
    }

    pub async fn set_active(
        &self,
        auth: &AuthUser,
        restaurant_id: Uuid,
        is_active: bool,
    ) -> UseCaseResult<RestaurantDto> {
        managed_restaurant(self.restaurant_repo.as_ref(), auth, restaurant_id).await?;

        self.restaurant_repo
            .set_active(restaurant_id, is_active)
            .await?;

        if is_active {
            info!(%restaurant_id, "restaurants: activated");
        } else {
            warn!(%restaurant_id, "restaurants: deactivated with tables");
        }

        let restaurant = self
            .restaurant_repo
            .find_by_id(restaurant_id)
            .await?
            .ok_or(UseCaseError::NotFound("restaurant"))?;

        Ok(restaurant.into())
    }
}

fn redirect_field(value: Option<String>) -> UseCaseResult<Option<Option<String>>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    match normalize_redirect_url(&raw) {
        None => Ok(Some(None)),
        Some(url) => {
            Url::parse(&url)
                .map_err(|_| UseCaseError::BadRequest(format!("invalid url: {}", raw.trim())))?;
            Ok(Some(Some(url)))
        }
    }
}

fn email_field(value: Option<String>) -> UseCaseResult<Option<Option<String>>> {
    let Some(raw) = value else {
        return Ok(None);
    };

    match non_blank(Some(raw)) {
        None => Ok(Some(None)),
        Some(email) if email.contains('@') && !email.contains(char::is_whitespace) => {
            Ok(Some(Some(email)))
        }
        Some(email) => Err(UseCaseError::BadRequest(format!(
            "invalid notification email: {email}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::fixtures::{admin, owner, restaurant};
    use crates::domain::{
        entities::restaurants::RestaurantEntity,
        repositories::{qr_codes::MockQrCodeRepository, restaurants::MockRestaurantRepository},
    };
    use mockall::predicate::eq;

    fn created(insert: InsertRestaurantEntity) -> RestaurantEntity {
        RestaurantEntity {
            id: Uuid::new_v4(),
            owner_id: insert.owner_id,
            name: insert.name,
            slug: insert.slug,
            city: insert.city,
            address: insert.address,
            is_active: insert.is_active,
            subscription_status: insert.subscription_status,
            subscription_expires_at: insert.subscription_expires_at,
            google_review_url: insert.google_review_url,
            google_business_url: insert.google_business_url,
            google_place_id: insert.google_place_id,
            notification_email: insert.notification_email,
            last_review_count: None,
            last_review_check_at: None,
            created_at: insert.created_at,
            updated_at: insert.updated_at,
        }
    }

    fn create_model(owner_id: Uuid) -> CreateRestaurantModel {
        CreateRestaurantModel {
            owner_id,
            name: "Chez Marcel".to_string(),
            slug: None,
            city: Some("Lyon".to_string()),
            address: None,
            google_review_url: Some("g.page/r/marcel/review".to_string()),
            google_business_url: Some("  ".to_string()),
            google_place_id: None,
            notification_email: Some("marcel@example.com".to_string()),
            trial_days: None,
        }
    }

    #[tokio::test]
    async fn admin_creates_restaurant_on_trial() {
        let owner_id = Uuid::new_v4();
        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "chez-marcel")
            .returning(|_| Ok(None));
        restaurant_repo
            .expect_create()
            .times(1)
            .returning(|insert| Ok(created(insert)));

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let dto = usecase.create(&admin(), create_model(owner_id)).await.unwrap();

        assert_eq!(dto.slug, "chez-marcel");
        assert_eq!(dto.owner_id, owner_id);
        assert_eq!(dto.subscription_status, SubscriptionStatus::Trial);
        assert_eq!(
            dto.google_review_url.as_deref(),
            Some("https://g.page/r/marcel/review")
        );
        assert_eq!(dto.google_business_url, None);
        let expires = dto.subscription_expires_at.unwrap();
        assert!(expires > Utc::now() + Duration::days(DEFAULT_TRIAL_DAYS - 1));
    }

    #[tokio::test]
    async fn owner_cannot_create_restaurant() {
        let usecase = RestaurantUseCase::new(
            Arc::new(MockRestaurantRepository::new()),
            Arc::new(MockQrCodeRepository::new()),
        );
        let user = owner(Uuid::new_v4());

        let err = usecase
            .create(&user, create_model(user.user_id))
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden));
    }

    #[tokio::test]
    async fn duplicate_slug_is_conflict() {
        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_find_by_slug()
            .returning(|_| Ok(Some(restaurant(Uuid::new_v4()))));
        restaurant_repo.expect_create().never();

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let err = usecase
            .create(&admin(), create_model(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected() {
        let mut model = create_model(Uuid::new_v4());
        model.notification_email = Some("not-an-email".to_string());

        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo.expect_find_by_slug().returning(|_| Ok(None));

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let err = usecase.create(&admin(), model).await.unwrap_err();

        assert!(matches!(err, UseCaseError::BadRequest(_)));
    }

    #[tokio::test]
    async fn owner_lists_only_own_restaurants() {
        let user = owner(Uuid::new_v4());
        let user_id = user.user_id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_list()
            .with(eq(Some(user_id)))
            .returning(move |_| Ok(vec![restaurant(user_id)]));

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let listed = usecase.list(&user).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner_id, user_id);
    }

    #[tokio::test]
    async fn owner_cannot_read_foreign_restaurant() {
        let foreign = restaurant(Uuid::new_v4());
        let foreign_id = foreign.id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(foreign.clone())));

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let err = usecase
            .get(&owner(Uuid::new_v4()), foreign_id)
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Forbidden));
    }

    #[tokio::test]
    async fn redirect_change_refreshes_qr_snapshot() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        let stored = existing.clone();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        let updated_base = existing.clone();
        restaurant_repo
            .expect_update()
            .withf(|_, changeset| {
                changeset.google_review_url == Some(None)
                    && changeset.google_business_url
                        == Some(Some("https://maps.google.com/?cid=9".to_string()))
                    && changeset.updated_at.is_some()
            })
            .returning(move |_, changeset| {
                let mut updated = updated_base.clone();
                updated.google_review_url = changeset.google_review_url.flatten();
                updated.google_business_url = changeset.google_business_url.flatten();
                Ok(updated)
            });

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo
            .expect_refresh_redirect_snapshot()
            .withf(move |id, url| *id == restaurant_id && url == "https://maps.google.com/?cid=9")
            .times(1)
            .returning(|_, _| Ok(3));

        let usecase = RestaurantUseCase::new(Arc::new(restaurant_repo), Arc::new(qr_code_repo));

        let dto = usecase
            .update(
                &user,
                restaurant_id,
                UpdateRestaurantModel {
                    google_review_url: Some(String::new()),
                    google_business_url: Some("maps.google.com/?cid=9".to_string()),
                    ..UpdateRestaurantModel::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(dto.google_review_url, None);
    }

    #[tokio::test]
    async fn email_only_update_keeps_snapshot() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        let stored = existing.clone();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        restaurant_repo
            .expect_update()
            .returning(move |_, _| Ok(existing.clone()));

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo.expect_refresh_redirect_snapshot().never();

        let usecase = RestaurantUseCase::new(Arc::new(restaurant_repo), Arc::new(qr_code_repo));

        usecase
            .update(
                &user,
                restaurant_id,
                UpdateRestaurantModel {
                    notification_email: Some("new@example.com".to_string()),
                    ..UpdateRestaurantModel::default()
                },
            )
            .await
            .unwrap();
    }

    fn place_id_update(
        existing: RestaurantEntity,
        expect_reset: bool,
    ) -> RestaurantUseCase<MockRestaurantRepository, MockQrCodeRepository> {
        let mut restaurant_repo = MockRestaurantRepository::new();
        let stored = existing.clone();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        restaurant_repo
            .expect_update()
            .withf(move |_, changeset| {
                let reset = changeset.last_review_count == Some(None)
                    && changeset.last_review_check_at == Some(None);
                let untouched = changeset.last_review_count.is_none()
                    && changeset.last_review_check_at.is_none();
                if expect_reset { reset } else { untouched }
            })
            .times(1)
            .returning(move |_, changeset| {
                let mut updated = existing.clone();
                updated.google_place_id = changeset.google_place_id.flatten();
                Ok(updated)
            });

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo
            .expect_refresh_redirect_snapshot()
            .returning(|_, _| Ok(1));

        RestaurantUseCase::new(Arc::new(restaurant_repo), Arc::new(qr_code_repo))
    }

    #[tokio::test]
    async fn new_place_id_resets_review_baseline() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        place_id_update(existing, true)
            .update(
                &user,
                restaurant_id,
                UpdateRestaurantModel {
                    google_place_id: Some("ChIJ999".to_string()),
                    ..UpdateRestaurantModel::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn same_place_id_keeps_review_baseline() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        place_id_update(existing, false)
            .update(
                &user,
                restaurant_id,
                UpdateRestaurantModel {
                    google_place_id: Some(" ChIJ123 ".to_string()),
                    ..UpdateRestaurantModel::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_update_is_bad_request() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        restaurant_repo.expect_update().never();

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let err = usecase
            .update(&user, restaurant_id, UpdateRestaurantModel::default())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::BadRequest(_)));
    }

    #[tokio::test]
    async fn deactivate_cascades_through_repository() {
        let user = owner(Uuid::new_v4());
        let existing = restaurant(user.user_id);
        let restaurant_id = existing.id;

        let mut restaurant_repo = MockRestaurantRepository::new();
        let mut after = existing.clone();
        after.is_active = false;
        let mut calls = 0;
        restaurant_repo.expect_find_by_id().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(existing.clone()))
            } else {
                Ok(Some(after.clone()))
            }
        });
        restaurant_repo
            .expect_set_active()
            .with(eq(restaurant_id), eq(false))
            .times(1)
            .returning(|_, _| Ok(()));

        let usecase = RestaurantUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(MockQrCodeRepository::new()),
        );

        let dto = usecase.set_active(&user, restaurant_id, false).await.unwrap();

        assert!(!dto.is_active);
    }

    #[test]
    fn redirect_field_rules() {
        assert_eq!(redirect_field(None).unwrap(), None);
        assert_eq!(redirect_field(Some(" ".to_string())).unwrap(), Some(None));
        assert_eq!(
            redirect_field(Some("g.page/x".to_string())).unwrap(),
            Some(Some("https://g.page/x".to_string()))
        );
        assert!(redirect_field(Some("https://exa mple.com".to_string())).is_err());
    }
}
