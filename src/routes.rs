use crate::{
    api::{attendance, employee, feedback, payroll, report, search, settings},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    // Public session routes; each resource gets its own limiter instance
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(build_limiter(config.rate_refresh_per_min))
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_protected_per_min)) // rate limiting
            .service(
                web::scope("/accounts")
                    // /accounts/me
                    .service(
                        web::resource("/me")
                            .route(web::get().to(handlers::current_account))
                            .route(web::put().to(handlers::update_own_account)),
                    )
                    // /accounts — account creation keeps its own tighter limit
                    .service(
                        web::resource("")
                            .wrap(build_limiter(config.rate_register_per_min))
                            .route(web::get().to(handlers::list_accounts))
                            .route(web::post().to(handlers::register)),
                    )
                    // /accounts/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(handlers::update_account_role))
                            .route(web::delete().to(handlers::delete_account)),
                    ),
            )
            .service(
                web::scope("/employees")
                    .service(
                        web::resource("")
                            .route(web::get().to(employee::list_employees))
                            .route(web::post().to(employee::create_employee)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("")
                            .route(web::get().to(attendance::list_attendance))
                            .route(web::post().to(attendance::create_attendance)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(attendance::delete_attendance)),
                    ),
            )
            .service(
                web::scope("/payrolls")
                    .service(
                        web::resource("")
                            .route(web::get().to(payroll::list_payrolls))
                            .route(web::post().to(payroll::create_payroll)),
                    )
                    .service(
                        web::resource("/{id}").route(web::delete().to(payroll::delete_payroll)),
                    ),
            )
            .service(
                web::scope("/reports")
                    .service(
                        web::resource("")
                            .route(web::get().to(report::list_reports))
                            .route(web::post().to(report::create_report)),
                    )
                    .service(web::resource("/{id}").route(web::delete().to(report::delete_report))),
            )
            .service(
                web::scope("/feedback")
                    .service(web::resource("").route(web::post().to(feedback::create_feedback)))
                    .service(
                        web::resource("/{id}").route(web::delete().to(feedback::delete_feedback)),
                    ),
            )
            .service(
                web::resource("/settings")
                    .route(web::get().to(settings::get_settings))
                    .route(web::put().to(settings::update_settings))
                    .route(web::delete().to(settings::delete_settings)),
            )
            .service(web::resource("/search").route(web::get().to(search::search))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)
//
// API REQUEST
//  └─ Authorization: Bearer access_token
//
// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token
