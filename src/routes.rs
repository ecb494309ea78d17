// routes.rs - the route table and the router built from it
//
// Every endpoint is listed once in `route_table` together with its access
// policy. `app` turns each entry into a method router wrapped in the matching
// guard layers and mounts it on its path.

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{Role, CSRF_HEADER};
use crate::config::AppConfig;
use crate::database::models::{
    AdcpReading, EquipmentDocument, LidarWindCubeReading, LidarZephirReading, LocationRecord, MaintenanceRecord,
    SodarReading, SolarimetricReading, TowerReading,
};
use crate::database::Resource;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{require_csrf, require_role, RoleGuard};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn filter(self) -> MethodFilter {
        match self {
            Verb::Get => MethodFilter::GET,
            Verb::Post => MethodFilter::POST,
            Verb::Put => MethodFilter::PUT,
            Verb::Delete => MethodFilter::DELETE,
        }
    }

    pub fn is_mutating(self) -> bool {
        self != Verb::Get
    }
}

/// Who may call a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Public,
    Guarded { role: Role, csrf: bool },
}

const CSRF: bool = true;
const NO_CSRF: bool = false;

fn guarded(role: Role, csrf: bool) -> Policy {
    Policy::Guarded { role, csrf }
}

pub struct RouteEntry {
    pub verb: Verb,
    pub path: &'static str,
    pub policy: Policy,
    handler: MethodRouter<AppState>,
}

impl RouteEntry {
    fn new<H, T>(verb: Verb, path: &'static str, policy: Policy, handler: H) -> Self
    where
        H: Handler<T, AppState>,
        T: 'static,
    {
        Self {
            verb,
            path,
            policy,
            handler: on(verb.filter(), handler),
        }
    }

    /// The method router with its guards applied. The role check is the outer
    /// layer so it runs before the CSRF check.
    fn into_method_router(self, state: &AppState) -> MethodRouter<AppState> {
        match self.policy {
            Policy::Public => self.handler,
            Policy::Guarded { role, csrf } => {
                let handler: MethodRouter<AppState> = if csrf {
                    self.handler.layer(from_fn(require_csrf))
                } else {
                    self.handler
                };
                handler.layer(from_fn_with_state(
                    RoleGuard::new(state.tokens.clone(), role),
                    require_role,
                ))
            }
        }
    }
}

/// GET list/get for colaborador; writes for administrador_equipamentos.
fn series<T: Resource>(collection: &'static str, item: &'static str) -> Vec<RouteEntry> {
    use protected::readings;
    let read = guarded(Role::Colaborador, NO_CSRF);
    let write = guarded(Role::AdministradorEquipamentos, CSRF);
    vec![
        RouteEntry::new(Verb::Get, collection, read, readings::list::<T>),
        RouteEntry::new(Verb::Post, collection, write, readings::create::<T>),
        RouteEntry::new(Verb::Get, item, read, readings::get::<T>),
        RouteEntry::new(Verb::Put, item, write, readings::update::<T>),
        RouteEntry::new(Verb::Delete, item, write, readings::delete::<T>),
    ]
}

pub fn route_table() -> Vec<RouteEntry> {
    use Verb::*;

    let mut routes = vec![
        // System
        RouteEntry::new(Get, "/", Policy::Public, public::system::root),
        RouteEntry::new(Get, "/health", Policy::Public, public::system::health),
        // Session
        RouteEntry::new(Post, "/api/auth/login", Policy::Public, public::auth::login),
        RouteEntry::new(Post, "/api/auth/register", Policy::Public, public::auth::register),
        RouteEntry::new(Post, "/api/auth/refresh", Policy::Public, public::auth::refresh),
        RouteEntry::new(Get, "/api/auth/validate-token", Policy::Public, public::auth::validate_token),
        RouteEntry::new(Get, "/api/auth/me", guarded(Role::Leitor, NO_CSRF), protected::auth::me),
        RouteEntry::new(Post, "/api/auth/logout", guarded(Role::Leitor, CSRF), protected::auth::logout),
        RouteEntry::new(Get, "/api/auth/profile", guarded(Role::Leitor, NO_CSRF), protected::auth::profile_get),
        RouteEntry::new(Put, "/api/auth/profile", guarded(Role::Leitor, CSRF), protected::auth::profile_put),
        // Publications
        RouteEntry::new(Get, "/api/publicacoes", Policy::Public, public::publications::list),
        RouteEntry::new(Get, "/api/publicacoes/:id/:slug", Policy::Public, public::publications::get_by_slug),
        RouteEntry::new(
            Get,
            "/api/publicacoes/usuario",
            guarded(Role::Colaborador, NO_CSRF),
            protected::publications::list_mine,
        ),
        RouteEntry::new(
            Get,
            "/api/publicacoes/usuario/:identifier/:slug",
            guarded(Role::Colaborador, NO_CSRF),
            protected::publications::get_mine_by_slug,
        ),
        RouteEntry::new(Post, "/api/publicacoes", guarded(Role::Colaborador, CSRF), protected::publications::create),
        RouteEntry::new(Put, "/api/publicacoes/:id", guarded(Role::Colaborador, CSRF), protected::publications::update),
        RouteEntry::new(
            Delete,
            "/api/publicacoes/:id",
            guarded(Role::Colaborador, CSRF),
            protected::publications::delete,
        ),
        // News
        RouteEntry::new(Get, "/api/noticias", Policy::Public, public::news::list),
        RouteEntry::new(Get, "/api/noticias/:id", Policy::Public, public::news::get_by_id),
        RouteEntry::new(Get, "/api/noticias/:id/:slug", Policy::Public, public::news::get_by_slug),
        RouteEntry::new(
            Get,
            "/api/noticias/usuario",
            guarded(Role::GestorConteudo, NO_CSRF),
            protected::news::list_mine,
        ),
        RouteEntry::new(
            Get,
            "/api/noticias/usuario/:identifier/:slug",
            guarded(Role::GestorConteudo, NO_CSRF),
            protected::news::get_mine_by_slug,
        ),
        RouteEntry::new(Post, "/api/noticias", guarded(Role::GestorConteudo, CSRF), protected::news::create),
        RouteEntry::new(Put, "/api/noticias/:id", guarded(Role::GestorConteudo, CSRF), protected::news::update),
        RouteEntry::new(Delete, "/api/noticias/:id", guarded(Role::GestorConteudo, CSRF), protected::news::delete),
        // Favorites
        RouteEntry::new(Get, "/api/favoritos", guarded(Role::Leitor, NO_CSRF), protected::favorites::list),
        RouteEntry::new(
            Get,
            "/api/favoritos/:id/:slug",
            guarded(Role::Leitor, NO_CSRF),
            protected::favorites::get_by_slug,
        ),
        RouteEntry::new(Post, "/api/favoritos", guarded(Role::Leitor, CSRF), protected::favorites::create),
        RouteEntry::new(Delete, "/api/favoritos/:id", guarded(Role::Leitor, CSRF), protected::favorites::delete),
        // Notifications
        RouteEntry::new(Get, "/api/notificacoes", guarded(Role::Leitor, NO_CSRF), protected::notifications::list),
        RouteEntry::new(
            Get,
            "/api/notificacoes/:id",
            guarded(Role::Leitor, NO_CSRF),
            protected::notifications::get,
        ),
        RouteEntry::new(
            Post,
            "/api/notificacoes",
            guarded(Role::GestorConteudo, CSRF),
            protected::notifications::create,
        ),
        RouteEntry::new(
            Put,
            "/api/notificacoes/:id",
            guarded(Role::GestorConteudo, CSRF),
            protected::notifications::update,
        ),
        RouteEntry::new(
            Delete,
            "/api/notificacoes/:id",
            guarded(Role::Leitor, CSRF),
            protected::notifications::delete,
        ),
        // Campaigns
        RouteEntry::new(Get, "/api/campaigns", guarded(Role::Colaborador, NO_CSRF), protected::campaigns::list),
        RouteEntry::new(Get, "/api/campaigns/:id", guarded(Role::Colaborador, NO_CSRF), protected::campaigns::get),
        RouteEntry::new(
            Post,
            "/api/campaigns",
            guarded(Role::AdministradorCampanhas, CSRF),
            protected::campaigns::create,
        ),
        RouteEntry::new(
            Put,
            "/api/campaigns/:id",
            guarded(Role::AdministradorCampanhas, CSRF),
            protected::campaigns::update,
        ),
        RouteEntry::new(
            Delete,
            "/api/campaigns/:id",
            guarded(Role::AdministradorCampanhas, CSRF),
            protected::campaigns::delete,
        ),
        // Equipment
        RouteEntry::new(Get, "/api/equipments", guarded(Role::Colaborador, NO_CSRF), protected::equipment::list),
        RouteEntry::new(Get, "/api/equipments/:id", guarded(Role::Colaborador, NO_CSRF), protected::equipment::get),
        RouteEntry::new(
            Post,
            "/api/equipments",
            guarded(Role::AdministradorEquipamentos, CSRF),
            protected::equipment::create,
        ),
        RouteEntry::new(
            Put,
            "/api/equipments/:id",
            guarded(Role::AdministradorEquipamentos, CSRF),
            protected::equipment::update,
        ),
        RouteEntry::new(
            Delete,
            "/api/equipments/:id",
            guarded(Role::AdministradorEquipamentos, CSRF),
            protected::equipment::delete,
        ),
        // Users
        RouteEntry::new(Get, "/api/usuarios", guarded(Role::Superusuario, NO_CSRF), elevated::users::list),
        RouteEntry::new(Get, "/api/usuarios/:id", guarded(Role::Superusuario, NO_CSRF), elevated::users::get),
        RouteEntry::new(Post, "/api/usuarios", guarded(Role::Superusuario, CSRF), elevated::users::create),
        RouteEntry::new(Put, "/api/usuarios/:id", guarded(Role::Superusuario, CSRF), elevated::users::update),
        RouteEntry::new(Delete, "/api/usuarios/:id", guarded(Role::Superusuario, CSRF), elevated::users::delete),
    ];

    // Instrument series and equipment history
    routes.extend(series::<LidarZephirReading>("/api/lidarzephydata", "/api/lidarzephydata/:id"));
    routes.extend(series::<LidarWindCubeReading>("/api/lidarwindcobedata", "/api/lidarwindcobedata/:id"));
    routes.extend(series::<SodarReading>("/api/sodardata", "/api/sodardata/:id"));
    routes.extend(series::<TowerReading>(
        "/api/towermicrometeorologicaldata",
        "/api/towermicrometeorologicaldata/:id",
    ));
    routes.extend(series::<AdcpReading>("/api/adcpdata", "/api/adcpdata/:id"));
    routes.extend(series::<SolarimetricReading>("/api/estacao-solarimetrica", "/api/estacao-solarimetrica/:id"));
    routes.extend(series::<MaintenanceRecord>("/api/maintenancehistory", "/api/maintenancehistory/:id"));
    routes.extend(series::<LocationRecord>("/api/locationhistory", "/api/locationhistory/:id"));
    routes.extend(series::<EquipmentDocument>("/api/equipmentdocuments", "/api/equipmentdocuments/:id"));

    routes
}

pub fn app(state: AppState) -> Router {
    let mut router = Router::new();
    // Entries sharing a path are merged into one method router by axum.
    for entry in route_table() {
        let path = entry.path;
        router = router.route(path, entry.into_method_router(&state));
    }

    router = router
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(cors_layer(&state.config));
    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router.with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();

    if origins.is_empty() && !config.is_production() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(CSRF_HEADER),
        ])
}
