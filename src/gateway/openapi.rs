//! OpenAPI / Swagger UI Documentation
//!
//! - Swagger UI: `http://localhost:8080/docs`
//! - OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::audit::ActionRecord;
use crate::gateway::handlers::HealthResponse;
use crate::user_auth::{ChangePasswordRequest, CredentialsRequest, IssuedToken, RegisteredUser};

/// HS256 bearer token security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from /api/v1/users/login, sent as `Authorization: Bearer <token>`",
                        ))
                        .build(),
                ),
            );
        }
    }
}

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Store Auth API",
        version = "1.0.0",
        description = "Credential verification and token issuance for the store catalog admin API.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::user_auth::handlers::register,
        crate::user_auth::handlers::check_credentials,
        crate::user_auth::handlers::login,
        crate::user_auth::handlers::renew_token,
        crate::user_auth::handlers::change_password,
        crate::user_auth::handlers::list_actions,
    ),
    components(
        schemas(
            HealthResponse,
            CredentialsRequest,
            ChangePasswordRequest,
            RegisteredUser,
            IssuedToken,
            ActionRecord,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "System", description = "Health and diagnostics"),
        (name = "Users", description = "Registration, login and password management"),
        (name = "Actions", description = "Audit log of user actions"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_auth_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/v1/health",
            "/api/v1/users/register",
            "/api/v1/users/login",
            "/api/v1/users/renew",
            "/api/v1/users/change-password",
            "/api/v1/actions",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_jwt"));
    }
}
