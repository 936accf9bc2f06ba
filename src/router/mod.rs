//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea el endpoint de un request (target truncado en la última '/') a
//! una [`Route`].
//!
//! ```text
//! Request → Router → Route → Handler → Response
//! ```
//!
//! La búsqueda es exacta: `/echo/abc` llega al handler de echo solo porque
//! su endpoint es `/echo`; `/echo/a/b` tiene endpoint `/echo/a` y termina
//! en 404. La tabla se arma una vez al arrancar y se comparte entre todos
//! los workers sin locks.

use crate::handlers::{self, HandlerContext};
use crate::http::{Request, Response};
use std::collections::HashMap;

/// Endpoints soportados, más el fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    UserAgent,
    Echo,
    Files,
    NotFound,
}

impl Route {
    /// Ejecuta el handler correspondiente sobre la respuesta
    pub fn handle(self, request: &Request, response: &mut Response, ctx: &HandlerContext) {
        match self {
            Route::Root => handlers::root_handler(request, response),
            Route::UserAgent => handlers::user_agent_handler(request, response),
            Route::Echo => handlers::echo_handler(request, response),
            Route::Files => handlers::files_handler(request, response, ctx.files()),
            Route::NotFound => handlers::not_found_handler(request, response),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Route::Root => "root",
            Route::UserAgent => "user-agent",
            Route::Echo => "echo",
            Route::Files => "files",
            Route::NotFound => "not-found",
        }
    }
}

/// Router que mapea endpoints a rutas
#[derive(Debug, Clone)]
pub struct Router {
    routes: HashMap<String, Route>,
}

impl Router {
    /// Crea un router vacío (todo resuelve a `NotFound`)
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Registra un endpoint
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::router::{Route, Router};
    ///
    /// let mut router = Router::new();
    /// router.register("/echo", Route::Echo);
    /// assert_eq!(router.resolve("/echo"), Route::Echo);
    /// assert_eq!(router.resolve("/echo/x"), Route::NotFound);
    /// ```
    pub fn register(&mut self, endpoint: &str, route: Route) {
        self.routes.insert(endpoint.to_string(), route);
    }

    /// Una sola búsqueda; lo que no esté registrado es `NotFound`
    pub fn resolve(&self, endpoint: &str) -> Route {
        self.routes.get(endpoint).copied().unwrap_or(Route::NotFound)
    }

    /// Resuelve el endpoint del request y ejecuta su handler.
    /// Retorna la ruta usada (para logging).
    pub fn dispatch(&self, request: &Request, response: &mut Response, ctx: &HandlerContext) -> Route {
        let route = self.resolve(request.endpoint());
        route.handle(request, response, ctx);
        route
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    /// Tabla estándar: `/`, `/user-agent`, `/echo`, `/files`
    fn default() -> Self {
        let mut router = Self::new();
        router.register("/", Route::Root);
        router.register("/user-agent", Route::UserAgent);
        router.register("/echo", Route::Echo);
        router.register("/files", Route::Files);
        router
    }
}
