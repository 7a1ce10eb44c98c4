use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "User Admin API",
        version = "0.1.0",
        description = "User administration behind form login. `/rest` requires the ADMIN role."
    ),
    nest(
        (path = "/rest", api = domain_users::RestApiDoc)
    )
)]
pub struct ApiDoc;
