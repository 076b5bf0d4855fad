//! 신원 필수 게이트
//!
//! [`AuthMiddleware`](crate::middlewares::AuthMiddleware) 뒤에서 실행되어, 요청에 검증된 신원이
//! 없으면 파이프라인 결과와 무관하게 403으로 응답합니다.
//!
//! actix는 마지막에 등록한 `wrap`을 먼저 실행하므로 `RequireIdentity`를 먼저 등록합니다.
//!
//! ```rust,ignore
//! web::scope("/me")
//!     .wrap(RequireIdentity)
//!     .wrap(AuthMiddleware::optional())
//!     .service(me)
//! ```

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::LocalBoxFuture;

use crate::core::AppError;
use crate::domain::models::auth::AuthenticatedUser;

pub struct RequireIdentity;

impl<S, B> Transform<S, ServiceRequest> for RequireIdentity
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RequireIdentityService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireIdentityService {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireIdentityService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireIdentityService<S>
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

        Box::pin(async move {
            let has_identity = req.extensions().contains::<AuthenticatedUser>();

            if !has_identity {
                log::warn!("신원 없는 요청 차단: {} {}", req.method(), req.path());
                let (req, _) = req.into_parts();
                let res = ServiceResponse::new(req, AppError::Forbidden.error_response());
                return Ok(res.map_into_right_body());
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}
