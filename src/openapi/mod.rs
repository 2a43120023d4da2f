use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "PVZ Service API",
        version = "1.0.0",
        description = r#"
# Pickup Point Operations API

Backend for pickup points (PVZ): registering points, running intake
receptions and recording the products received.

## Roles

- `moderator` registers pickup points
- `employee` opens and closes receptions, adds products and undoes the last one

Both roles may list pickup points. Obtain a token from `/dummyLogin`, `/login`
or register first via `/register`, then send it as:

```
Authorization: Bearer <token>
```

## Receptions

A pickup point has at most one reception in progress. Products can only be
added to, and removed from, that open reception; removal always takes the most
recently added product.

## Listing

`GET /pvz` pages through pickup points having at least one reception created
inside `[startDate, endDate]`, newest registration first. Dates accept
`YYYY-MM-DD HH:MM:SS[.fraction]` (UTC) or RFC 3339.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "auth", description = "Token issuance and staff accounts"),
        (name = "pvz", description = "Pickup point registration and listing"),
        (name = "receptions", description = "Reception lifecycle"),
        (name = "products", description = "Products within the open reception")
    ),
    paths(
        crate::handlers::users::dummy_login,
        crate::handlers::users::register,
        crate::handlers::users::login,
        crate::handlers::pickup_points::create_pickup_point,
        crate::handlers::pickup_points::list_pickup_points,
        crate::handlers::receptions::create_reception,
        crate::handlers::receptions::close_last_reception,
        crate::handlers::products::add_product,
        crate::handlers::products::delete_last_product,
    ),
    components(
        schemas(
            crate::handlers::users::DummyLoginRequest,
            crate::handlers::users::RegisterRequest,
            crate::handlers::users::LoginRequest,
            crate::handlers::users::TokenResponse,
            crate::handlers::users::UserResponse,
            crate::handlers::pickup_points::CreatePickupPointRequest,
            crate::handlers::pickup_points::PickupPointResponse,
            crate::handlers::pickup_points::PickupPointListItem,
            crate::handlers::pickup_points::ReceptionListItem,
            crate::handlers::receptions::CreateReceptionRequest,
            crate::handlers::receptions::ReceptionResponse,
            crate::handlers::products::AddProductRequest,
            crate::handlers::products::ProductResponse,
            crate::handlers::products::DeletedProductResponse,
            crate::entities::user::UserRole,
            crate::entities::reception::ReceptionStatus,
            crate::ResponseMeta,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_every_route_and_bearer_scheme() {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi()).unwrap();
        for path in [
            "/dummyLogin",
            "/register",
            "/login",
            "/pvz",
            "/receptions",
            "/products",
            "/pvz/{pvzId}/close_last_reception",
            "/pvz/{pvzId}/delete_last_product",
        ] {
            assert!(json.contains(path), "missing {}", path);
        }
        assert!(json.contains("bearer_auth"));
    }
}
