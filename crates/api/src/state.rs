use roster_db::DbPool;

/// State shared by every handler. Cloning only bumps the pool's reference count.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}
