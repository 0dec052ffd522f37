use crate::{auth::auth, models::{ApiError, DiagnosticsResponse}, state::AppState};
use axum::{extract::{State, Extension}, http::StatusCode, Json};
use std::sync::Arc;
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Room and process diagnostics
pub async fn diagnostics(
    State(app_state): State<Arc<AppState>>,
    Extension(prpls): Extension<Vec<String>>,
) -> Result<(StatusCode, Json<DiagnosticsResponse>), ApiError> {

    // Ensure the caller is a service or an admin
    let _ = auth::ensure_service_or_admin(&prpls)?;

    let stats = app_state.room.stats();

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| {
            Mutex::new(System::new_all())
        });
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0)
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Conn: {}, Away: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        stats.connections,
        stats.away
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_conn: stats.connections,
            n_active: stats.active,
            n_away: stats.away,
            n_busy: stats.busy,
            n_colors_assigned: stats.colors_assigned,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    ))
}
