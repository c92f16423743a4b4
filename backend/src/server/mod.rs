//! Server construction and middleware wiring.

mod adapters;
mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod settings;
mod state_builders;

pub use adapters::build_outbound_adapters;
pub use config::ServerConfig;
pub use settings::AppSettings;

#[cfg(feature = "metrics")]
use metrics::OptionalMetrics;
use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use marketplace::Trace;
#[cfg(debug_assertions)]
use marketplace::doc::ApiDoc;
use marketplace::inbound::http::{
    self,
    health::{HealthState, live, ready},
    state::HttpState,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(http::configure))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is flipped once the listener is bound. Signal handling is left
/// to the caller so it can mark the process as draining first.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config);
    let bind_addr = config.bind_addr();

    #[cfg(feature = "metrics")]
    let metrics_layer = OptionalMetrics::new(config.prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .disable_signals()
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    //! Route table checks against the assembled app.

    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;

    use marketplace::domain::ports::FIXTURE_TOKEN;
    use marketplace::domain::TRACE_ID_HEADER;

    fn deps(is_ready: bool) -> AppDependencies {
        let health_state = HealthState::new();
        if is_ready {
            health_state.mark_ready();
        }
        AppDependencies {
            health_state: web::Data::new(health_state),
            http_state: web::Data::new(HttpState::default()),
        }
    }

    #[rstest]
    #[case::ready(true, StatusCode::OK)]
    #[case::starting(false, StatusCode::SERVICE_UNAVAILABLE)]
    #[actix_web::test]
    async fn readiness_reflects_health_state(#[case] is_ready: bool, #[case] expected: StatusCode) {
        let app = test::init_service(build_app(deps(is_ready))).await;

        let response =
            test::call_service(&app, test::TestRequest::get().uri("/health/ready").to_request())
                .await;

        assert_eq!(response.status(), expected);
    }

    #[actix_web::test]
    async fn api_routes_are_mounted_under_v1_and_traced() {
        let app = test::init_service(build_app(deps(true))).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/v1/notifications/count")
                .insert_header(("Authorization", format!("Bearer {FIXTURE_TOKEN}")))
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(TRACE_ID_HEADER));
    }

    #[actix_web::test]
    async fn api_requires_a_bearer_token() {
        let app = test::init_service(build_app(deps(true))).await;

        let response = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/bookings").to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
