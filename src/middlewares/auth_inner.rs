//! AuthMiddleware 인증 로직의 핵심적인 기능
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{web, Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::core::{AppError, AppState};
use crate::domain::models::auth::AuthMode;
use crate::middlewares::pipeline::{Credentials, Decision, ACCESS_TOKEN_HEADER};

/// 실제 인증 로직을 수행하는 서비스
pub struct AuthMiddlewareService<S> {
    pub service: Rc<S>,
    pub mode: AuthMode,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, actix_web::Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let mode = self.mode;

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                log::error!("AppState가 등록되지 않아 인증을 수행할 수 없습니다");
                let err = AppError::InternalError("application state is not configured".to_string());
                return Ok(short_circuit(req, &err));
            };

            let credentials = Credentials::from_headers(req.headers());

            let rotated = match state.pipeline.run(&credentials).await {
                Decision::Authenticated { identity, rotated } => {
                    log::debug!("인증 성공: 사용자 ID {}", identity.user_id);
                    req.extensions_mut().insert(identity);
                    rotated
                }
                // Required 모드에서 인증 실패
                Decision::Unauthenticated(reason) if mode.is_required() => {
                    log::warn!("인증 실패 ({}): {} {}", reason.code(), req.method(), req.path());
                    return Ok(short_circuit(req, &reason));
                }
                // Optional 모드에서 인증 실패 (진행 허용)
                Decision::Unauthenticated(reason) => {
                    log::debug!("선택적 인증: 익명으로 진행 ({})", reason.code());
                    None
                }
                Decision::Rejected(reason) => {
                    log::warn!("인증 거부 ({}): {} {}", reason.code(), req.method(), req.path());
                    return Ok(short_circuit(req, &reason));
                }
            };

            let mut res = service.call(req).await?;

            if let Some(issued) = rotated {
                match HeaderValue::from_str(&issued.token) {
                    Ok(value) => {
                        res.headers_mut()
                            .insert(HeaderName::from_static("x-access-token"), value);
                    }
                    Err(e) => log::error!("{} 헤더 생성 실패: {}", ACCESS_TOKEN_HEADER, e),
                }
            }

            Ok(res.map_into_left_body())
        })
    }
}

/// 다음 서비스를 호출하지 않고 에러 응답을 반환합니다.
fn short_circuit<B>(req: ServiceRequest, err: &AppError) -> ServiceResponse<EitherBody<B>> {
    let (req, _) = req.into_parts();
    ServiceResponse::new(req, err.error_response()).map_into_right_body()
}
