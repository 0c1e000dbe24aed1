use anyhow::anyhow;
use chrono::Utc;
use crates::domain::{
    entities::{qr_codes::InsertQrCodeEntity, tables::TableEntity},
    repositories::{
        qr_codes::QrCodeRepository, restaurants::RestaurantRepository, tables::TableRepository,
    },
    value_objects::{
        qr_codes::{QrCodeDto, generate_code},
        redirects::select_redirect,
    },
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::{UseCaseError, UseCaseResult, managed_restaurant};
use crate::auth::AuthUser;

const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct IssuedQrCode {
    pub qr_code: QrCodeDto,
    pub created: bool,
}

pub struct QrCodeUseCase<R, T, Q>
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    restaurant_repo: Arc<R>,
    table_repo: Arc<T>,
    qr_code_repo: Arc<Q>,
    public_base_url: String,
}

impl<R, T, Q> QrCodeUseCase<R, T, Q>
where
    R: RestaurantRepository + Send + Sync + 'static,
    T: TableRepository + Send + Sync + 'static,
    Q: QrCodeRepository + Send + Sync + 'static,
{
    pub fn new(
        restaurant_repo: Arc<R>,
        table_repo: Arc<T>,
        qr_code_repo: Arc<Q>,
        public_base_url: String,
    ) -> Self {
        Self {
            restaurant_repo,
            table_repo,
            qr_code_repo,
            public_base_url,
        }
    }

    pub async fn generate(&self, auth: &AuthUser, table_id: Uuid) -> UseCaseResult<IssuedQrCode> {
        let table = self.managed_table(auth, table_id).await?;

        if let Some(existing) = self.qr_code_repo.find_by_table(table_id).await? {
            return Ok(IssuedQrCode {
                qr_code: QrCodeDto::from_entity(existing, &self.public_base_url),
                created: false,
            });
        }

        let restaurant = self
            .restaurant_repo
            .find_by_id(table.restaurant_id)
            .await?
            .ok_or(UseCaseError::NotFound("restaurant"))?;
        let redirect_url = select_redirect(&restaurant).url;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = generate_code();
            let now = Utc::now();
            let stored = self
                .qr_code_repo
                .insert_if_absent(InsertQrCodeEntity {
                    table_id,
                    restaurant_id: table.restaurant_id,
                    code: code.clone(),
                    is_active: true,
                    scan_count: 0,
                    redirect_url: Some(redirect_url.clone()),
                    created_at: now,
                    updated_at: now,
                })
                .await?;

            match stored {
                Some(qr_code) => {
                    // A concurrent request may have issued the table's code first.
                    let created = qr_code.code == code;
                    if created {
                        info!(%table_id, code = %qr_code.code, "qr_codes: issued");
                    }
                    return Ok(IssuedQrCode {
                        qr_code: QrCodeDto::from_entity(qr_code, &self.public_base_url),
                        created,
                    });
                }
                None => warn!(%table_id, attempt, "qr_codes: generated code collided, retrying"),
            }
        }

        Err(UseCaseError::Internal(anyhow!(
            "could not allocate a unique qr code after {MAX_CODE_ATTEMPTS} attempts"
        )))
    }

    pub async fn get(&self, auth: &AuthUser, table_id: Uuid) -> UseCaseResult<QrCodeDto> {
        self.managed_table(auth, table_id).await?;

        let qr_code = self
            .qr_code_repo
            .find_by_table(table_id)
            .await?
            .ok_or(UseCaseError::NotFound("qr code"))?;

        Ok(QrCodeDto::from_entity(qr_code, &self.public_base_url))
    }

    pub async fn set_active(
        &self,
        auth: &AuthUser,
        table_id: Uuid,
        is_active: bool,
    ) -> UseCaseResult<QrCodeDto> {
        self.managed_table(auth, table_id).await?;

        let mut qr_code = self
            .qr_code_repo
            .find_by_table(table_id)
            .await?
            .ok_or(UseCaseError::NotFound("qr code"))?;

        self.qr_code_repo.set_active(qr_code.id, is_active).await?;
        info!(%table_id, qr_code_id = %qr_code.id, is_active, "qr_codes: activation changed");

        qr_code.is_active = is_active;
        Ok(QrCodeDto::from_entity(qr_code, &self.public_base_url))
    }

    async fn managed_table(&self, auth: &AuthUser, table_id: Uuid) -> UseCaseResult<TableEntity> {
        let table = self
            .table_repo
            .find_by_id(table_id)
            .await?
            .ok_or(UseCaseError::NotFound("table"))?;

        managed_restaurant(self.restaurant_repo.as_ref(), auth, table.restaurant_id).await?;

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::fixtures::{owner, qr_code, restaurant, table};
    use crates::domain::{
        entities::qr_codes::QrCodeEntity,
        repositories::{
            qr_codes::MockQrCodeRepository, restaurants::MockRestaurantRepository,
            tables::MockTableRepository,
        },
    };
    use std::sync::Mutex;

    const BASE: &str = "https://scan.example.com";

    fn stored(insert: InsertQrCodeEntity) -> QrCodeEntity {
        QrCodeEntity {
            id: Uuid::new_v4(),
            table_id: insert.table_id,
            restaurant_id: insert.restaurant_id,
            code: insert.code,
            is_active: insert.is_active,
            scan_count: insert.scan_count,
            last_scan_at: None,
            redirect_url: insert.redirect_url,
            created_at: insert.created_at,
            updated_at: insert.updated_at,
        }
    }

    fn repos(user: &AuthUser) -> (MockRestaurantRepository, MockTableRepository, TableEntity) {
        let restaurant = restaurant(user.user_id);
        let table = table(restaurant.id, "T1");

        let mut restaurant_repo = MockRestaurantRepository::new();
        restaurant_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(restaurant.clone())));

        let mut table_repo = MockTableRepository::new();
        let stored_table = table.clone();
        table_repo
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stored_table.clone())));

        (restaurant_repo, table_repo, table)
    }

    #[tokio::test]
    async fn generation_is_idempotent_per_table() {
        let user = owner(Uuid::new_v4());
        let (restaurant_repo, table_repo, table) = repos(&user);
        let table_id = table.id;

        let issued: Arc<Mutex<Option<QrCodeEntity>>> = Arc::new(Mutex::new(None));

        let mut qr_code_repo = MockQrCodeRepository::new();
        let lookup = Arc::clone(&issued);
        qr_code_repo
            .expect_find_by_table()
            .returning(move |_| Ok(lookup.lock().unwrap().clone()));
        let insert_slot = Arc::clone(&issued);
        qr_code_repo
            .expect_insert_if_absent()
            .times(1)
            .returning(move |insert| {
                let qr_code = stored(insert);
                *insert_slot.lock().unwrap() = Some(qr_code.clone());
                Ok(Some(qr_code))
            });

        let usecase = QrCodeUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(table_repo),
            Arc::new(qr_code_repo),
            BASE.to_string(),
        );

        let first = usecase.generate(&user, table_id).await.unwrap();
        let second = usecase.generate(&user, table_id).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.qr_code.code, second.qr_code.code);
        assert_eq!(
            first.qr_code.scan_url,
            format!("{BASE}/scan/{}", first.qr_code.code)
        );
        assert_eq!(
            first.qr_code.redirect_url.as_deref(),
            Some("https://g.page/r/pho99/review")
        );
    }

    #[tokio::test]
    async fn collisions_are_retried() {
        let user = owner(Uuid::new_v4());
        let (restaurant_repo, table_repo, table) = repos(&user);
        let table_id = table.id;

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo.expect_find_by_table().returning(|_| Ok(None));
        let mut calls = 0;
        qr_code_repo
            .expect_insert_if_absent()
            .times(3)
            .returning(move |insert| {
                calls += 1;
                if calls < 3 {
                    Ok(None)
                } else {
                    Ok(Some(stored(insert)))
                }
            });

        let usecase = QrCodeUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(table_repo),
            Arc::new(qr_code_repo),
            BASE.to_string(),
        );

        let issued = usecase.generate(&user, table_id).await.unwrap();

        assert!(issued.created);
    }

    #[tokio::test]
    async fn lost_race_returns_existing_code() {
        let user = owner(Uuid::new_v4());
        let (restaurant_repo, table_repo, table) = repos(&user);
        let table_id = table.id;
        let winner = qr_code(&table, "WINNER2345");

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo.expect_find_by_table().returning(|_| Ok(None));
        qr_code_repo
            .expect_insert_if_absent()
            .times(1)
            .returning(move |_| Ok(Some(winner.clone())));

        let usecase = QrCodeUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(table_repo),
            Arc::new(qr_code_repo),
            BASE.to_string(),
        );

        let issued = usecase.generate(&user, table_id).await.unwrap();

        assert!(!issued.created);
        assert_eq!(issued.qr_code.code, "WINNER2345");
    }

    #[tokio::test]
    async fn get_without_code_is_not_found() {
        let user = owner(Uuid::new_v4());
        let (restaurant_repo, table_repo, table) = repos(&user);

        let mut qr_code_repo = MockQrCodeRepository::new();
        qr_code_repo.expect_find_by_table().returning(|_| Ok(None));

        let usecase = QrCodeUseCase::new(
            Arc::new(restaurant_repo),
            Arc::new(table_repo),
            Arc::new(qr_code_repo),
            BASE.to_string(),
        );

        let err = usecase.get(&user, table.id).await.unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound("qr code")));
    }
}
