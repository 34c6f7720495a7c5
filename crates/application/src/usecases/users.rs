use std::sync::Arc;

use chrono::{Duration, Utc};
use domain::{
    entities::users::{InsertUserEntity, UpdateUserEntity, UserEntity},
    repositories::{profiles::ProfileRepository, users::UserRepository},
    value_objects::{
        enums::user_roles::Role,
        iam::Identity,
        users::{
            AddressModel, BecomeSellerModel, LoginModel, ProfileModel, SignupModel, TokenDto,
            UserProfileDto, VerificationCodeModel,
        },
    },
};
use tracing::{error, info, warn};

use crate::{
    auth::{AuthService, generate_code},
    errors::{UseCaseError, UseCaseResult, store_error},
    interfaces::notification::NotificationSender,
};

const CODE_TTL_MINUTES: i64 = 30;
const INVALID_CREDENTIALS: &str = "invalid email or password";

pub struct UserUseCase<U, P, N>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    user_repository: Arc<U>,
    profile_repository: Arc<P>,
    notifier: Arc<N>,
    auth: AuthService,
}

impl<U, P, N> UserUseCase<U, P, N>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    pub fn new(
        user_repository: Arc<U>,
        profile_repository: Arc<P>,
        notifier: Arc<N>,
        auth: AuthService,
    ) -> Self {
        Self {
            user_repository,
            profile_repository,
            notifier,
            auth,
        }
    }

    pub async fn signup(&self, model: SignupModel) -> UseCaseResult<TokenDto> {
        let email = model.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(UseCaseError::Validation("a valid email is required".to_string()));
        }

        let password = self.auth.hash_password(&model.password)?;
        let now = Utc::now();
        let insert = InsertUserEntity {
            email: email.clone(),
            password,
            phone: model.phone.trim().to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::Buyer.to_string(),
            verified: false,
            created_at: now,
            updated_at: now,
        };

        let user = self
            .user_repository
            .create(insert)
            .await
            .map_err(store_error("users: failed to create user"))?
            .ok_or_else(|| {
                warn!(%email, "users: signup with registered email");
                UseCaseError::Conflict("email is already registered".to_string())
            })?;

        info!(user_id = user.id, "users: signed up");
        let token = self.auth.generate_token(user.id, &user.email, Role::Buyer)?;
        Ok(TokenDto { token })
    }

    pub async fn login(&self, model: LoginModel) -> UseCaseResult<TokenDto> {
        let email = model.email.trim().to_lowercase();
        let user = self
            .user_repository
            .find_by_email(&email)
            .await
            .map_err(store_error("users: failed to look up user by email"))?;
        let Some(user) = user else {
            self.auth.verify_against_dummy(&model.password);
            return Err(UseCaseError::Auth(INVALID_CREDENTIALS.to_string()));
        };

        if !self.auth.verify_password(&model.password, &user.password) {
            warn!(user_id = user.id, "users: login with wrong password");
            return Err(UseCaseError::Auth(INVALID_CREDENTIALS.to_string()));
        }

        let role = role_of(&user)?;
        let token = self.auth.generate_token(user.id, &user.email, role)?;
        info!(user_id = user.id, "users: logged in");
        Ok(TokenDto { token })
    }

    pub async fn request_verification_code(&self, identity: &Identity) -> UseCaseResult<()> {
        let user = self.find_user(identity.user_id).await?;
        if user.verified {
            return Err(UseCaseError::Validation("user already verified".to_string()));
        }
        if user.phone.is_empty() {
            return Err(UseCaseError::Validation(
                "a phone number is required to receive a code".to_string(),
            ));
        }

        let code = generate_code();
        let now = Utc::now();
        let changes = UpdateUserEntity {
            code: Some(Some(code.clone())),
            code_expires_at: Some(Some(now + Duration::minutes(CODE_TTL_MINUTES))),
            updated_at: Some(now),
            ..Default::default()
        };
        let user = self
            .user_repository
            .update(user.id, changes)
            .await
            .map_err(store_error("users: failed to store verification code"))?;

        let message = format!(
            "Your verification code is {code}, it expires in {CODE_TTL_MINUTES} minutes."
        );
        self.notifier
            .send_sms(&user.phone, &message)
            .await
            .map_err(|err| {
                error!(user_id = user.id, error = ?err, "users: failed to send verification sms");
                UseCaseError::Notification(err)
            })?;

        info!(user_id = user.id, "users: verification code sent");
        Ok(())
    }

    pub async fn verify_code(
        &self,
        identity: &Identity,
        model: VerificationCodeModel,
    ) -> UseCaseResult<()> {
        let user = self.find_user(identity.user_id).await?;
        if user.verified {
            return Err(UseCaseError::Validation("user already verified".to_string()));
        }

        let submitted = model.code.trim();
        if submitted.is_empty() || user.code.as_deref() != Some(submitted) {
            warn!(user_id = user.id, "users: verification code mismatch");
            return Err(UseCaseError::Validation(
                "verification code does not match".to_string(),
            ));
        }
        let now = Utc::now();
        match user.code_expires_at {
            Some(expires_at) if now < expires_at => {}
            _ => {
                return Err(UseCaseError::Validation(
                    "verification code expired".to_string(),
                ));
            }
        }

        let changes = UpdateUserEntity {
            verified: Some(true),
            code: Some(None),
            code_expires_at: Some(None),
            updated_at: Some(now),
            ..Default::default()
        };
        self.user_repository
            .update(user.id, changes)
            .await
            .map_err(store_error("users: failed to mark user verified"))?;

        info!(user_id = user.id, "users: verified");
        Ok(())
    }

    pub async fn create_profile(
        &self,
        identity: &Identity,
        model: ProfileModel,
    ) -> UseCaseResult<UserProfileDto> {
        let existing = self
            .profile_repository
            .find_address(identity.user_id)
            .await
            .map_err(store_error("users: failed to load address"))?;
        if existing.is_some() {
            return Err(UseCaseError::Conflict("profile already exists".to_string()));
        }

        self.save_profile(identity, model).await
    }

    pub async fn get_profile(&self, identity: &Identity) -> UseCaseResult<UserProfileDto> {
        let user = self.find_user(identity.user_id).await?;
        let address = self
            .profile_repository
            .find_address(user.id)
            .await
            .map_err(store_error("users: failed to load address"))?;

        let role = role_of(&user)?;
        Ok(UserProfileDto::from_parts(user, role, address))
    }

    pub async fn update_profile(
        &self,
        identity: &Identity,
        model: ProfileModel,
    ) -> UseCaseResult<UserProfileDto> {
        let existing = self
            .profile_repository
            .find_address(identity.user_id)
            .await
            .map_err(store_error("users: failed to load address"))?;
        if existing.is_none() {
            return Err(UseCaseError::NotFound("profile".to_string()));
        }

        self.save_profile(identity, model).await
    }

    /// Promotes a buyer and returns a token that already carries the seller role.
    pub async fn become_seller(
        &self,
        identity: &Identity,
        model: BecomeSellerModel,
    ) -> UseCaseResult<TokenDto> {
        let user = self.find_user(identity.user_id).await?;
        if role_of(&user)? == Role::Seller {
            return Err(UseCaseError::Conflict("you are already a seller".to_string()));
        }
        if model.bank_account_number.trim().is_empty() || model.swift_code.trim().is_empty() {
            return Err(UseCaseError::Validation(
                "bank account number and swift code are required".to_string(),
            ));
        }

        let changes = UpdateUserEntity {
            first_name: non_empty(&model.first_name),
            last_name: non_empty(&model.last_name),
            phone: non_empty(&model.phone_number),
            role: Some(Role::Seller.to_string()),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let seller = self
            .user_repository
            .promote_to_seller(user.id, changes, model.to_bank_account_entity(user.id))
            .await
            .map_err(store_error("users: failed to promote seller"))?
            .ok_or_else(|| {
                warn!(user_id = user.id, "users: bank account already registered");
                UseCaseError::Conflict("bank account is already registered".to_string())
            })?;

        info!(user_id = seller.id, "users: became seller");
        let token = self
            .auth
            .generate_token(seller.id, &seller.email, Role::Seller)?;
        Ok(TokenDto { token })
    }

    async fn save_profile(
        &self,
        identity: &Identity,
        model: ProfileModel,
    ) -> UseCaseResult<UserProfileDto> {
        validate_address(&model.address)?;
        let user = self.find_user(identity.user_id).await?;

        let first_name = non_empty(&model.first_name);
        let last_name = non_empty(&model.last_name);
        let user = if first_name.is_some() || last_name.is_some() {
            let changes = UpdateUserEntity {
                first_name,
                last_name,
                updated_at: Some(Utc::now()),
                ..Default::default()
            };
            self.user_repository
                .update(user.id, changes)
                .await
                .map_err(store_error("users: failed to update names"))?
        } else {
            user
        };

        let address = self
            .profile_repository
            .upsert_address(model.address.to_entity(user.id))
            .await
            .map_err(store_error("users: failed to save address"))?;

        info!(user_id = user.id, "users: profile saved");
        let role = role_of(&user)?;
        Ok(UserProfileDto::from_parts(user, role, Some(address)))
    }

    async fn find_user(&self, user_id: i32) -> UseCaseResult<UserEntity> {
        self.user_repository
            .find_by_id(user_id)
            .await
            .map_err(store_error("users: failed to load user"))?
            .ok_or_else(|| UseCaseError::NotFound("user".to_string()))
    }
}

fn role_of(user: &UserEntity) -> UseCaseResult<Role> {
    Role::from_str(&user.role).ok_or_else(|| {
        UseCaseError::Store(anyhow::anyhow!(
            "user {} has unknown role {:?}",
            user.id,
            user.role
        ))
    })
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn validate_address(address: &AddressModel) -> UseCaseResult<()> {
    let required = [
        &address.address_line1,
        &address.city,
        &address.post_code,
        &address.country,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(UseCaseError::Validation(
            "address line 1, city, post code and country are required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use domain::{
        entities::addresses::AddressEntity,
        repositories::{profiles::MockProfileRepository, users::MockUserRepository},
    };
    use mockall::predicate::eq;

    use crate::interfaces::notification::MockNotificationSender;

    const SECRET: &str = "usecase-test-secret";

    fn auth() -> AuthService {
        AuthService::new(SECRET.to_string())
    }

    fn sample_user(id: i32, role: Role) -> UserEntity {
        let now = Utc::now();
        UserEntity {
            id,
            email: "buyer@example.com".to_string(),
            password: "$argon2id$placeholder".to_string(),
            phone: "+911234567890".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            role: role.to_string(),
            verified: false,
            code: None,
            code_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn identity(user_id: i32, role: Role) -> Identity {
        Identity {
            user_id,
            email: "buyer@example.com".to_string(),
            role,
        }
    }

    fn sample_address(user_id: i32) -> AddressEntity {
        let now = Utc::now();
        AddressEntity {
            id: 1,
            user_id,
            address_line1: "12 Market Road".to_string(),
            address_line2: String::new(),
            city: "Pune".to_string(),
            post_code: "411001".to_string(),
            country: "IN".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn profile_model() -> ProfileModel {
        ProfileModel {
            first_name: "Asha".to_string(),
            last_name: String::new(),
            address: AddressModel {
                address_line1: "12 Market Road".to_string(),
                address_line2: String::new(),
                city: "Pune".to_string(),
                post_code: "411001".to_string(),
                country: "IN".to_string(),
            },
        }
    }

    fn usecase(
        users: MockUserRepository,
        profiles: MockProfileRepository,
        notifier: MockNotificationSender,
    ) -> UserUseCase<MockUserRepository, MockProfileRepository, MockNotificationSender> {
        UserUseCase::new(Arc::new(users), Arc::new(profiles), Arc::new(notifier), auth())
    }

    #[tokio::test]
    async fn signup_then_login_issue_tokens_for_the_same_identity() {
        let mut stored = sample_user(42, Role::Buyer);
        stored.password = auth().hash_password("secret1").unwrap();
        let mut users = MockUserRepository::new();
        let created = stored.clone();
        users
            .expect_create()
            .withf(|insert| insert.email == "buyer@example.com" && insert.role == "buyer")
            .times(1)
            .returning(move |insert| {
                assert_ne!(insert.password, "secret1");
                Ok(Some(created.clone()))
            });
        users
            .expect_find_by_email()
            .withf(|email| email == "buyer@example.com")
            .returning(move |_| Ok(Some(stored.clone())));

        let usecase = usecase(users, MockProfileRepository::new(), MockNotificationSender::new());

        let signup_token = usecase
            .signup(SignupModel {
                email: " Buyer@Example.com ".to_string(),
                password: "secret1".to_string(),
                phone: "+911234567890".to_string(),
            })
            .await
            .unwrap();
        let login_token = usecase
            .login(LoginModel {
                email: "buyer@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();

        let from_signup = auth().verify_token(&signup_token.token).unwrap();
        let from_login = auth().verify_token(&login_token.token).unwrap();
        assert_eq!(from_signup, from_login);
        assert_eq!(from_login.user_id, 42);
        assert_eq!(from_login.role, Role::Buyer);
    }

    #[tokio::test]
    async fn signup_rejects_short_password_before_touching_the_store() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();

        let err = usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .signup(SignupModel {
                email: "buyer@example.com".to_string(),
                password: "12345".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn signup_rejects_malformed_email() {
        let mut users = MockUserRepository::new();
        users.expect_create().never();

        let err = usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .signup(SignupModel {
                email: "not-an-email".to_string(),
                password: "secret1".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn signup_with_registered_email_is_a_conflict() {
        let mut users = MockUserRepository::new();
        users.expect_create().returning(|_| Ok(None));

        let err = usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .signup(SignupModel {
                email: "buyer@example.com".to_string(),
                password: "secret1".to_string(),
                phone: String::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_failures_share_one_message() {
        let mut stored = sample_user(42, Role::Buyer);
        stored.password = auth().hash_password("secret1").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "buyer@example.com")
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_find_by_email()
            .returning(|_| Ok(None));

        let usecase = usecase(users, MockProfileRepository::new(), MockNotificationSender::new());

        let wrong_password = usecase
            .login(LoginModel {
                email: "buyer@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await
            .unwrap_err();
        let unknown_email = usecase
            .login(LoginModel {
                email: "nobody@example.com".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), INVALID_CREDENTIALS);
        assert_eq!(unknown_email.to_string(), INVALID_CREDENTIALS);
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());
    }

    #[tokio::test]
    async fn unknown_email_still_pays_for_a_password_check() {
        let mut stored = sample_user(42, Role::Buyer);
        stored.password = auth().hash_password("secret1").unwrap();
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .withf(|email| email == "buyer@example.com")
            .returning(move |_| Ok(Some(stored.clone())));
        users
            .expect_find_by_email()
            .returning(|_| Ok(None));

        let usecase = usecase(users, MockProfileRepository::new(), MockNotificationSender::new());
        let attempt = |email: &'static str| LoginModel {
            email: email.to_string(),
            password: "wrong-password".to_string(),
        };

        let started = std::time::Instant::now();
        usecase.login(attempt("buyer@example.com")).await.unwrap_err();
        let wrong_password = started.elapsed();

        let started = std::time::Instant::now();
        usecase.login(attempt("nobody@example.com")).await.unwrap_err();
        let unknown_email = started.elapsed();

        assert!(crate::auth::DUMMY_HASH.get().is_some());
        assert!(
            unknown_email * 10 >= wrong_password,
            "unknown email took {unknown_email:?}, wrong password took {wrong_password:?}"
        );
    }

    #[tokio::test]
    async fn verification_code_is_stored_and_sent() {
        let user = sample_user(7, Role::Buyer);
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .with(eq(7))
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_update()
            .withf(|user_id, changes| {
                *user_id == 7
                    && matches!(&changes.code, Some(Some(code)) if code.len() == 6)
                    && matches!(changes.code_expires_at, Some(Some(_)))
            })
            .returning(move |_, changes| {
                let mut updated = user.clone();
                updated.code = changes.code.flatten();
                Ok(updated)
            });

        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send_sms()
            .withf(|phone, message| {
                phone == "+911234567890" && message.contains("verification code")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        usecase(users, MockProfileRepository::new(), notifier)
            .request_verification_code(&identity(7, Role::Buyer))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_sms_surfaces_notification_error() {
        let user = sample_user(7, Role::Buyer);
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_update()
            .returning(move |_, _| Ok(user.clone()));

        let mut notifier = MockNotificationSender::new();
        notifier
            .expect_send_sms()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("twilio unavailable")));

        let err = usecase(users, MockProfileRepository::new(), notifier)
            .request_verification_code(&identity(7, Role::Buyer))
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Notification(_)));
    }

    #[tokio::test]
    async fn verified_user_cannot_request_code() {
        let mut user = sample_user(7, Role::Buyer);
        user.verified = true;
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        users.expect_update().never();

        let err = usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .request_verification_code(&identity(7, Role::Buyer))
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    fn user_with_code(expires_at: DateTime<Utc>) -> UserEntity {
        let mut user = sample_user(7, Role::Buyer);
        user.code = Some("123456".to_string());
        user.code_expires_at = Some(expires_at);
        user
    }

    #[tokio::test]
    async fn matching_code_marks_user_verified() {
        let user = user_with_code(Utc::now() + Duration::minutes(5));
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_update()
            .withf(|_, changes| {
                changes.verified == Some(true)
                    && changes.code == Some(None)
                    && changes.code_expires_at == Some(None)
            })
            .times(1)
            .returning(move |_, _| Ok(user.clone()));

        usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .verify_code(
                &identity(7, Role::Buyer),
                VerificationCodeModel {
                    code: "123456".to_string(),
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn wrong_or_expired_code_is_rejected() {
        let fresh = user_with_code(Utc::now() + Duration::minutes(5));
        let stale = user_with_code(Utc::now() - Duration::minutes(1));

        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(fresh.clone())));
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(stale.clone())));
        users.expect_update().never();

        let usecase = usecase(users, MockProfileRepository::new(), MockNotificationSender::new());
        let mismatch = usecase
            .verify_code(
                &identity(7, Role::Buyer),
                VerificationCodeModel {
                    code: "654321".to_string(),
                },
            )
            .await
            .unwrap_err();
        let expired = usecase
            .verify_code(
                &identity(7, Role::Buyer),
                VerificationCodeModel {
                    code: "123456".to_string(),
                },
            )
            .await
            .unwrap_err();

        assert_eq!(mismatch.to_string(), "verification code does not match");
        assert_eq!(expired.to_string(), "verification code expired");
    }

    #[tokio::test]
    async fn create_profile_saves_names_and_address() {
        let user = sample_user(7, Role::Buyer);
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_update()
            .withf(|_, changes| {
                changes.first_name.as_deref() == Some("Asha") && changes.last_name.is_none()
            })
            .returning(move |_, _| {
                let mut updated = user.clone();
                updated.first_name = "Asha".to_string();
                Ok(updated)
            });

        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_address().returning(|_| Ok(None));
        profiles
            .expect_upsert_address()
            .withf(|address| address.user_id == 7 && address.city == "Pune")
            .returning(|address| Ok(sample_address(address.user_id)));

        let profile = usecase(users, profiles, MockNotificationSender::new())
            .create_profile(&identity(7, Role::Buyer), profile_model())
            .await
            .unwrap();

        assert_eq!(profile.first_name, "Asha");
        assert_eq!(profile.address.unwrap().city, "Pune");
    }

    #[tokio::test]
    async fn create_profile_twice_is_a_conflict_and_update_requires_one() {
        let mut profiles = MockProfileRepository::new();
        profiles
            .expect_find_address()
            .with(eq(7))
            .returning(|user_id| Ok(Some(sample_address(user_id))));
        profiles
            .expect_find_address()
            .with(eq(8))
            .returning(|_| Ok(None));
        profiles.expect_upsert_address().never();

        let usecase = usecase(
            MockUserRepository::new(),
            profiles,
            MockNotificationSender::new(),
        );

        let err = usecase
            .create_profile(&identity(7, Role::Buyer), profile_model())
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::Conflict(_)));

        let err = usecase
            .update_profile(&identity(8, Role::Buyer), profile_model())
            .await
            .unwrap_err();
        assert!(matches!(err, UseCaseError::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_requires_complete_address() {
        let mut profiles = MockProfileRepository::new();
        profiles.expect_find_address().returning(|_| Ok(None));
        profiles.expect_upsert_address().never();

        let mut model = profile_model();
        model.address.city = " ".to_string();

        let err = usecase(MockUserRepository::new(), profiles, MockNotificationSender::new())
            .create_profile(&identity(7, Role::Buyer), model)
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    fn seller_model() -> BecomeSellerModel {
        BecomeSellerModel {
            first_name: "Asha".to_string(),
            last_name: "Rao".to_string(),
            phone_number: "+911234567890".to_string(),
            bank_account_number: "000123456789".to_string(),
            swift_code: "HDFCINBB".to_string(),
            payment_type: "bank".to_string(),
        }
    }

    #[tokio::test]
    async fn become_seller_returns_seller_token() {
        let user = sample_user(7, Role::Buyer);
        let mut users = MockUserRepository::new();
        let found = user.clone();
        users
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_promote_to_seller()
            .withf(|user_id, changes, bank| {
                *user_id == 7
                    && changes.role.as_deref() == Some("seller")
                    && bank.account_number == "000123456789"
            })
            .times(1)
            .returning(move |_, _, _| {
                let mut seller = user.clone();
                seller.role = Role::Seller.to_string();
                Ok(Some(seller))
            });

        let token = usecase(users, MockProfileRepository::new(), MockNotificationSender::new())
            .become_seller(&identity(7, Role::Buyer), seller_model())
            .await
            .unwrap();

        let identity = auth().verify_token(&token.token).unwrap();
        assert_eq!(identity.role, Role::Seller);
        assert!(identity.is_seller());
    }

    #[tokio::test]
    async fn become_seller_conflicts() {
        let seller = sample_user(7, Role::Seller);
        let buyer = sample_user(8, Role::Buyer);
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(7))
            .returning(move |_| Ok(Some(seller.clone())));
        users
            .expect_find_by_id()
            .with(eq(8))
            .returning(move |_| Ok(Some(buyer.clone())));
        users
            .expect_promote_to_seller()
            .times(1)
            .returning(|_, _, _| Ok(None));

        let usecase = usecase(users, MockProfileRepository::new(), MockNotificationSender::new());

        let already = usecase
            .become_seller(&identity(7, Role::Seller), seller_model())
            .await
            .unwrap_err();
        let duplicate_account = usecase
            .become_seller(&identity(8, Role::Buyer), seller_model())
            .await
            .unwrap_err();

        assert!(matches!(already, UseCaseError::Conflict(_)));
        assert!(matches!(duplicate_account, UseCaseError::Conflict(_)));
    }
}
