use std::sync::Arc;

use crate::auth::TokenIssuer;
use crate::models::driver::GeoPoint;
use crate::observability::metrics::Metrics;
use crate::store::DispatchStore;

pub struct AppState {
    pub store: Arc<dyn DispatchStore>,
    pub auth: TokenIssuer,
    pub metrics: Metrics,
    pub bcrypt_cost: u32,
    pub default_location: GeoPoint,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DispatchStore>,
        auth: TokenIssuer,
        bcrypt_cost: u32,
        default_location: GeoPoint,
    ) -> Self {
        Self {
            store,
            auth,
            metrics: Metrics::new(),
            bcrypt_cost,
            default_location,
        }
    }
}
