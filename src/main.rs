//! 토큰 인증 서비스 진입점
//!
//! 환경 설정을 로드하고, 인증 상태(키, 폐기 저장소, 자격 증명)를 조립한 뒤 HTTP 서버를 시작합니다.
//! 서버가 종료되면 폐기 저장소 연결을 닫습니다.

use std::sync::Arc;

use actix_cors::Cors;
use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::http::header::{self, HeaderName};
use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;
use log::{error, info};

use token_auth_service::config::{AuthSettings, Environment, RateLimitConfig, ServerConfig};
use token_auth_service::core::{AppError, AppState, SystemClock};
use token_auth_service::repositories::users::InMemoryCredentialRepository;
use token_auth_service::routes::configure_all_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // 환경 설정 및 로깅 초기화
    load_env_file();
    init_logging();

    info!("🚀 토큰 인증 서비스 시작중... ({:?})", Environment::current());

    let state = initialize_state().await.map_err(|e| {
        error!("❌ 인증 상태 초기화 실패: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // HTTP 서버 시작
    let result = start_http_server(state.clone()).await;

    state.shutdown().await;
    info!("👋 서버 종료");

    result
}

async fn initialize_state() -> Result<AppState, AppError> {
    let settings = AuthSettings::from_env()?;
    info!(
        "🔐 토큰 설정: issuer={}, access={}분, refresh={}일, revocation={} ({:?})",
        settings.jwt.issuer,
        settings.jwt.access_lifetime.num_minutes(),
        settings.jwt.refresh_lifetime.num_days(),
        settings.revocation.backend.as_str(),
        settings.revocation.failure_policy
    );

    let credentials = Arc::new(InMemoryCredentialRepository::from_env()?);

    info!("📡 폐기 저장소 연결 중...");
    AppState::from_settings(&settings, credentials, Arc::new(SystemClock)).await
}

async fn start_http_server(state: AppState) -> std::io::Result<()> {
    let bind_address = ServerConfig::bind_address();

    info!("🌐 서버가 http://{} 에서 실행중입니다", bind_address);
    info!("📍 Health check: http://{}/health", bind_address);
    info!("📍 JWKS: http://{}/.well-known/jwks.json", bind_address);

    // Rate Limiting 설정
    let rate_limit_config = RateLimitConfig::from_env();
    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_second(rate_limit_config.per_second)
        .burst_size(rate_limit_config.burst_size)
        .use_headers()
        .finish()
        .ok_or_else(|| std::io::Error::other("invalid rate limit configuration"))?;

    info!(
        "🛡️ Rate Limiting 활성화: 초당 {}요청, 버스트 {}개",
        rate_limit_config.per_second,
        rate_limit_config.burst_size
    );

    let state = web::Data::new(state);

    HttpServer::new(move || {
        // CORS 설정
        let cors = configure_cors();

        App::new()
            .app_data(state.clone())
            // Rate Limiting 미들웨어 (가장 먼저 적용)
            .wrap(Governor::new(&governor_conf))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::NormalizePath::trim())
            // 라우트 설정
            .configure(configure_all_routes)
    })
    .bind(bind_address)?
    .workers(4) // 워커 스레드 수
    .run()
    .await
}

fn load_env_file() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "dev".to_string());

    info!("Current profile: {}", profile);

    match profile.as_str() {
        "prod" => match dotenv::from_filename(".env.prod") {
            Ok(_) => info!(".env.prod 파일 로드 됨"),
            Err(e) => error!(".env.prod 파일 로드 실패: {}", e),
        },
        "dev" => match dotenv::from_filename(".env.dev") {
            Ok(_) => info!(".env.dev 파일 로드 됨"),
            Err(e) => error!(".env.dev 파일 로드 실패: {}", e),
        },
        _ => {
            // 기본 .env 파일 로드
            dotenv().ok();
            info!("기본 .env 파일 로드");
        }
    }
}

fn init_logging() {
    env_logger::init_from_env(Env::default().default_filter_or("info,actix_web=debug"));
}

fn configure_cors() -> Cors {
    Cors::default()
        // 허용할 Origin 설정
        .allowed_origin("http://localhost:3000")
        .allowed_origin("http://127.0.0.1:3000")
        .allowed_origin("http://localhost:8080")
        .allowed_origin("http://127.0.0.1:8080")
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-refresh"),
        ])
        // 재발급된 액세스 토큰을 브라우저 클라이언트가 읽을 수 있도록 노출
        .expose_headers(vec![HeaderName::from_static("x-access-token")])
        .supports_credentials()
        // Preflight 요청 캐시 시간 (초)
        .max_age(3600)
}
