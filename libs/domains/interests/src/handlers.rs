use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{BadRequestValidationResponse, InternalServerErrorResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::InterestResult;
use crate::models::{
    CreateUser, DEFAULT_LIMIT, Interest, InterestInput, InterestSet, MatchedInterest,
    MessageResponse, Recommendation, RecommendedUser, SimilarInterest, SimilarQuery,
};
use crate::repository::InterestRepository;
use crate::service::InterestService;

const PROFILE_TAG: &str = "profile";
const INTERESTS_TAG: &str = "interests";

/// OpenAPI documentation for the profile and interests API
#[derive(OpenApi)]
#[openapi(
    paths(create_profile, get_interests, update_interests, similar_interests),
    components(
        schemas(
            CreateUser,
            Interest,
            InterestInput,
            MessageResponse,
            Recommendation,
            SimilarInterest,
            RecommendedUser,
            MatchedInterest
        ),
        responses(BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = PROFILE_TAG, description = "User profiles and interest sets"),
        (name = INTERESTS_TAG, description = "Similar interests and people to meet")
    )
)]
pub struct ApiDoc;

/// Create the router with all profile and interest endpoints
pub fn router<R: InterestRepository + 'static>(service: InterestService<R>) -> Router {
    router_with_shared(Arc::new(service))
}

/// Same as [`router`] for a service that is also used elsewhere (e.g. readiness checks).
pub fn router_with_shared<R: InterestRepository + 'static>(
    service: Arc<InterestService<R>>,
) -> Router {
    Router::new()
        .route("/profile/{user_id}", post(create_profile))
        .route(
            "/profile/interests/{user_id}",
            get(get_interests).put(update_interests),
        )
        .route("/interests/similar/{interest_id}", get(similar_interests))
        .with_state(service)
}

/// Create a user profile if it does not exist yet
#[utoipa::path(
    post,
    path = "/profile/{user_id}",
    tag = PROFILE_TAG,
    params(("user_id" = String, Path, description = "User ID")),
    request_body(content = CreateUser, description = "Optional profile fields"),
    responses(
        (status = 200, description = "User created or already present", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_profile<R: InterestRepository>(
    State(service): State<Arc<InterestService<R>>>,
    Path(user_id): Path<String>,
    body: Option<Json<CreateUser>>,
) -> InterestResult<Json<MessageResponse>> {
    let input = body.map(|Json(input)| input).unwrap_or_default();
    let outcome = service.create_user(&user_id, input).await?;
    Ok(Json(MessageResponse::new(outcome.message())))
}

/// Get a user's interests, creating the user on first access
#[utoipa::path(
    get,
    path = "/profile/interests/{user_id}",
    tag = PROFILE_TAG,
    params(("user_id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Interests of the user", body = Vec<Interest>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_interests<R: InterestRepository>(
    State(service): State<Arc<InterestService<R>>>,
    Path(user_id): Path<String>,
) -> InterestResult<Json<Vec<Interest>>> {
    let interests = service.get_interests(&user_id).await?;
    Ok(Json(interests))
}

/// Replace a user's interest set
#[utoipa::path(
    put,
    path = "/profile/interests/{user_id}",
    tag = PROFILE_TAG,
    params(("user_id" = String, Path, description = "User ID")),
    request_body = Vec<InterestInput>,
    responses(
        (status = 200, description = "Interests replaced", body = MessageResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_interests<R: InterestRepository>(
    State(service): State<Arc<InterestService<R>>>,
    Path(user_id): Path<String>,
    ValidatedJson(set): ValidatedJson<InterestSet>,
) -> InterestResult<Json<MessageResponse>> {
    service.set_interests(&user_id, set.interests).await?;
    Ok(Json(MessageResponse::new("Interests updated successfully")))
}

/// Similar interests and the users to recommend for them
#[utoipa::path(
    get,
    path = "/interests/similar/{interest_id}",
    tag = INTERESTS_TAG,
    params(
        ("interest_id" = String, Path, description = "Source interest ID"),
        SimilarQuery
    ),
    responses(
        (status = 200, description = "Similar interests and recommended users", body = Recommendation),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn similar_interests<R: InterestRepository>(
    State(service): State<Arc<InterestService<R>>>,
    Path(interest_id): Path<String>,
    Query(query): Query<SimilarQuery>,
) -> InterestResult<Json<Recommendation>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    let recommendation = service.recommend(&interest_id, limit).await?;
    Ok(Json(recommendation))
}
