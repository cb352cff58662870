//! Discovery endpoint: serves the built permission catalog as a read-only
//! document at the application's well-known path.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use log::{error, info};
use serde_json::json;

use crate::catalog::PermissionCatalog;
use crate::error::SdkResult;

/// Downstream caches may hold the discovery document this long by default
pub const DEFAULT_CACHE_MAX_AGE: u32 = 300;

/// State injected into the discovery route.
///
/// The catalog is an explicitly passed immutable value, shared by actix's
/// `web::Data`; there is no process-wide registry behind it.
#[derive(Debug, Clone)]
pub struct DiscoveryState {
    catalog: PermissionCatalog,
    cache_max_age: u32,
}

impl DiscoveryState {
    pub fn new(catalog: PermissionCatalog) -> Self {
        Self {
            catalog,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
        }
    }

    /// Override the advertised cache lifetime
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.cache_max_age = cache_max_age;
        self
    }

    pub fn catalog(&self) -> &PermissionCatalog {
        &self.catalog
    }

    /// `/.well-known/{application}-permissions`
    pub fn well_known_path(&self) -> String {
        format!(
            "/.well-known/{}-permissions",
            self.catalog.application_name
        )
    }
}

/// Serve the permission catalog.
///
/// Registered for every method so the method guard can answer non-GET
/// requests itself; only a GET ever reads the catalog.
pub async fn serve_discovery(req: HttpRequest, state: web::Data<DiscoveryState>) -> HttpResponse {
    if req.method() != Method::GET {
        return HttpResponse::MethodNotAllowed().json(json!({
            "error": "Method not allowed",
            "message": "Only GET requests are supported"
        }));
    }

    match serde_json::to_string(state.catalog()) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/json")
            .insert_header((
                header::CACHE_CONTROL,
                format!("public, max-age={}", state.cache_max_age),
            ))
            .body(body),
        Err(e) => {
            error!("failed to serialize permission catalog: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "error": "Internal server error",
                "message": "Failed to load permission configuration",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
        }
    }
}

/// Mount the discovery route onto an existing actix `App`:
///
/// ```ignore
/// App::new().configure(discovery::configure(DiscoveryState::new(catalog)))
/// ```
pub fn configure(state: DiscoveryState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let path = state.well_known_path();
        cfg.app_data(web::Data::new(state))
            .route(&path, web::route().to(serve_discovery));
    }
}

/// Standalone HTTP server for the discovery document.
///
/// For applications that do not already run an actix server. Serves the
/// well-known path with permissive CORS: any origin, method `GET`, header
/// `Content-Type`.
pub struct DiscoveryServer {
    state: DiscoveryState,
    bind_address: String,
}

impl DiscoveryServer {
    /// Create a server for the given catalog.
    ///
    /// # Arguments
    ///
    /// * `catalog` - The built permission catalog to publish
    /// * `bind_address` - The address to bind to (e.g., "127.0.0.1:9080")
    pub fn new(catalog: PermissionCatalog, bind_address: &str) -> Self {
        Self {
            state: DiscoveryState::new(catalog),
            bind_address: bind_address.to_string(),
        }
    }

    /// Override the advertised cache lifetime
    pub fn with_cache_max_age(mut self, cache_max_age: u32) -> Self {
        self.state = self.state.with_cache_max_age(cache_max_age);
        self
    }

    /// Bind and serve until the server is stopped.
    pub async fn run(self) -> SdkResult<()> {
        let state = self.state;
        let bind_address = self.bind_address;

        let server = HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .send_wildcard()
                .allowed_methods(vec!["GET"])
                .allowed_header(header::CONTENT_TYPE);

            App::new()
                .wrap(cors)
                .configure(configure(state.clone()))
        })
        .bind(&bind_address)?
        .run();

        info!("discovery server listening on {}", bind_address);
        server.await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_builder::{crud, CatalogBuilder};
    use actix_web::test as actix_test;

    fn state() -> web::Data<DiscoveryState> {
        let catalog = CatalogBuilder::new("acme")
            .add_scopes(crud("tribes", None))
            .build()
            .unwrap();
        web::Data::new(DiscoveryState::new(catalog))
    }

    #[tokio::test]
    async fn test_get_serves_catalog() {
        let req = actix_test::TestRequest::get().to_http_request();
        let resp = serve_discovery(req, state()).await;

        assert_eq!(resp.status(), 200);
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=300"
        );
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn test_non_get_is_method_not_allowed() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let req = actix_test::TestRequest::default()
                .method(method.clone())
                .to_http_request();
            let resp = serve_discovery(req, state()).await;
            assert_eq!(resp.status(), 405, "method {} should be rejected", method);
        }
    }

    #[tokio::test]
    async fn test_cache_max_age_override() {
        let catalog = CatalogBuilder::new("acme")
            .add_scopes(crud("tribes", None))
            .build()
            .unwrap();
        let state = web::Data::new(DiscoveryState::new(catalog).with_cache_max_age(60));

        let req = actix_test::TestRequest::get().to_http_request();
        let resp = serve_discovery(req, state).await;
        assert_eq!(
            resp.headers().get(header::CACHE_CONTROL).unwrap(),
            "public, max-age=60"
        );
    }

    #[test]
    fn test_well_known_path() {
        assert_eq!(
            state().well_known_path(),
            "/.well-known/acme-permissions"
        );
    }
}
