use crate::{
    api::{attendance, auto_checkout, employee, leave_request, report, work_summary},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::{Context, Result};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Per-route rate limiters, built once and shared by every worker.
#[derive(Clone)]
pub struct Limiters {
    login: Limiter,
    refresh: Limiter,
    protected: Limiter,
    sweep: Limiter,
}

impl Limiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        fn build_limiter(name: &str, requests_per_min: u32) -> Result<Limiter> {
            let requests_per_min = requests_per_min.max(1);
            let per_ms = (60_000 / requests_per_min as u64).max(1);
            let cfg = GovernorConfigBuilder::default()
                .per_millisecond(per_ms)
                .burst_size(requests_per_min)
                .key_extractor(PeerIpKeyExtractor)
                .finish()
                .with_context(|| format!("invalid {name} rate limit"))?;
            Ok(Arc::new(Governor::new(&cfg)))
        }

        Ok(Self {
            login: build_limiter("login", config.rate_login_per_min)?,
            refresh: build_limiter("refresh", config.rate_refresh_per_min)?,
            protected: build_limiter("protected", config.rate_protected_per_min)?,
            sweep: build_limiter("auto-checkout", config.rate_sweep_per_min)?,
        })
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config, limiters: &Limiters) {
    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(limiters.refresh.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(limiters.login.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Scheduler or admin; authorizes itself
    cfg.service(
        web::resource("/auto-checkout")
            .wrap(limiters.sweep.clone())
            .route(web::post().to(auto_checkout::execute))
            .route(web::get().to(auto_checkout::preview)),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(limiters.protected.clone()) // rate limiting
            .service(web::resource("/me").route(web::get().to(employee::me)))
            .service(
                web::scope("/attendance")
                    .service(web::resource("/check-in").route(web::post().to(attendance::check_in)))
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(web::resource("/today").route(web::get().to(attendance::today))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave_request::create_leave)))
                    // /leave/mine
                    .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
                    // /leave/{id}/cancel
                    .service(
                        web::resource("/{id}/cancel")
                            .route(web::put().to(leave_request::cancel_leave)),
                    ),
            )
            .service(
                web::scope("/work-summary")
                    .service(
                        web::resource("")
                            .route(web::get().to(work_summary::my_summary))
                            .route(web::post().to(work_summary::add_item)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(work_summary::update_item))
                            .route(web::delete().to(work_summary::delete_item)),
                    ),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/employees")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /admin/leave
                    .service(web::resource("/leave").route(web::get().to(leave_request::leave_list)))
                    // /admin/leave/{id}
                    .service(
                        web::resource("/leave/{id}").route(web::get().to(leave_request::get_leave)),
                    )
                    // /admin/leave/{id}/approve
                    .service(
                        web::resource("/leave/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /admin/leave/{id}/reject
                    .service(
                        web::resource("/leave/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    )
                    .service(web::resource("/reports/monthly").route(web::get().to(report::monthly)))
                    .service(web::resource("/reports/daily").route(web::get().to(report::daily)))
                    .service(
                        web::resource("/work-summary/{employee_id}")
                            .route(web::get().to(work_summary::employee_summary)),
                    ),
            ),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days, jti stored)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ old jti revoked, new pair returned
