use axum::Router;

/// A route registered by a controller, kept for the startup route table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub handler: &'static str,
}

/// Implemented by `#[harbor_macros::controller]`.
pub trait Controller {
    type State: Clone + Send + Sync + 'static;

    fn router() -> Router<Self::State>;

    fn routes() -> &'static [RouteInfo];
}
