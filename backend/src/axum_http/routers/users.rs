use std::sync::Arc;

use application::{
    auth::AuthService, interfaces::notification::NotificationSender, usecases::users::UserUseCase,
};
use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use domain::{
    repositories::{profiles::ProfileRepository, users::UserRepository},
    value_objects::{
        iam::Identity,
        users::{BecomeSellerModel, LoginModel, ProfileModel, SignupModel, VerificationCodeModel},
    },
};
use infra::{
    notifications::twilio_client::TwilioClient,
    postgres::{
        postgres_connection::PgPoolSquad,
        repositories::{profiles::ProfilePostgres, users::UserPostgres},
    },
};
use serde_json::json;

use crate::{auth::authorize, axum_http::error_responses::AppError};

type Users = UserUseCase<UserPostgres, ProfilePostgres, TwilioClient>;

pub fn routes(
    db_pool: Arc<PgPoolSquad>,
    auth: Arc<AuthService>,
    notifier: Arc<TwilioClient>,
) -> Router {
    let user_repository = UserPostgres::new(Arc::clone(&db_pool));
    let profile_repository = ProfilePostgres::new(Arc::clone(&db_pool));
    let usecase: Users = UserUseCase::new(
        Arc::new(user_repository),
        Arc::new(profile_repository),
        notifier,
        AuthService::clone(&auth),
    );

    let protected = Router::new()
        .route(
            "/verify",
            get(request_verification_code::<UserPostgres, ProfilePostgres, TwilioClient>)
                .post(verify_code::<UserPostgres, ProfilePostgres, TwilioClient>),
        )
        .route(
            "/profile",
            get(get_profile::<UserPostgres, ProfilePostgres, TwilioClient>)
                .post(create_profile::<UserPostgres, ProfilePostgres, TwilioClient>)
                .patch(update_profile::<UserPostgres, ProfilePostgres, TwilioClient>),
        )
        .route(
            "/become-seller",
            post(become_seller::<UserPostgres, ProfilePostgres, TwilioClient>),
        )
        .route_layer(from_fn_with_state(auth, authorize));

    Router::new()
        .route(
            "/register",
            post(register::<UserPostgres, ProfilePostgres, TwilioClient>),
        )
        .route("/login", post(login::<UserPostgres, ProfilePostgres, TwilioClient>))
        .merge(protected)
        .with_state(Arc::new(usecase))
}

pub async fn register<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Json(model): Json<SignupModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let token = usecase.signup(model).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn login<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Json(model): Json<LoginModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let token = usecase.login(model).await?;
    Ok(Json(token))
}

pub async fn request_verification_code<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    usecase.request_verification_code(&identity).await?;
    Ok(Json(json!({ "message": "verification code sent" })))
}

pub async fn verify_code<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
    Json(model): Json<VerificationCodeModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    usecase.verify_code(&identity, model).await?;
    Ok(Json(json!({ "message": "verified successfully" })))
}

pub async fn create_profile<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
    Json(model): Json<ProfileModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let profile = usecase.create_profile(&identity, model).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn get_profile<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let profile = usecase.get_profile(&identity).await?;
    Ok(Json(profile))
}

pub async fn update_profile<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
    Json(model): Json<ProfileModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let profile = usecase.update_profile(&identity, model).await?;
    Ok(Json(profile))
}

pub async fn become_seller<U, P, N>(
    State(usecase): State<Arc<UserUseCase<U, P, N>>>,
    Extension(identity): Extension<Identity>,
    Json(model): Json<BecomeSellerModel>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Send + Sync + 'static,
    P: ProfileRepository + Send + Sync + 'static,
    N: NotificationSender + 'static,
{
    let token = usecase.become_seller(&identity, model).await?;
    Ok(Json(token))
}
