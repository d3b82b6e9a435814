use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Kindred API",
        version = "0.1.0",
        description = "User interests, similar interests and people to meet"
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
struct BaseDoc;

/// Full API document: base info plus the profile and interest routes.
pub struct ApiDoc;

impl OpenApi for ApiDoc {
    fn openapi() -> utoipa::openapi::OpenApi {
        BaseDoc::openapi().merge_from(domain_interests::handlers::ApiDoc::openapi())
    }
}
