use actix_web::HttpResponse;
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static REQUEST_COUNT: AtomicU64 = AtomicU64::new(0);
static ERROR_COUNT: AtomicU64 = AtomicU64::new(0);
static LOGIN_FAILURES: AtomicU64 = AtomicU64::new(0);
static REGISTRATIONS: AtomicU64 = AtomicU64::new(0);
static APPLICATIONS: AtomicU64 = AtomicU64::new(0);

lazy_static! {
    static ref STARTED_AT: Instant = Instant::now();
}

/// Pins the uptime origin; called once at startup.
pub fn mark_started() {
    lazy_static::initialize(&STARTED_AT);
}

pub fn increment_request_count() {
    REQUEST_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_error_count() {
    ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_login_failures() {
    LOGIN_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_registrations() {
    REGISTRATIONS.fetch_add(1, Ordering::Relaxed);
}

pub fn increment_applications() {
    APPLICATIONS.fetch_add(1, Ordering::Relaxed);
}

fn counter(out: &mut String, name: &str, help: &str, value: u64) {
    out.push_str(&format!(
        "# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n\n"
    ));
}

pub fn render() -> String {
    let mut out = String::new();
    counter(
        &mut out,
        "http_requests_total",
        "Total number of HTTP requests",
        REQUEST_COUNT.load(Ordering::Relaxed),
    );
    counter(
        &mut out,
        "http_errors_total",
        "Total number of HTTP responses with a 4xx/5xx status",
        ERROR_COUNT.load(Ordering::Relaxed),
    );
    counter(
        &mut out,
        "login_failures_total",
        "Rejected login attempts",
        LOGIN_FAILURES.load(Ordering::Relaxed),
    );
    counter(
        &mut out,
        "registrations_total",
        "Accounts created",
        REGISTRATIONS.load(Ordering::Relaxed),
    );
    counter(
        &mut out,
        "investor_applications_total",
        "Seed partner applications accepted",
        APPLICATIONS.load(Ordering::Relaxed),
    );
    out.push_str(&format!(
        "# HELP process_uptime_seconds Seconds since startup\n# TYPE process_uptime_seconds gauge\nprocess_uptime_seconds {}\n",
        STARTED_AT.elapsed().as_secs()
    ));
    out
}

#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain")
    )
)]
pub async fn get_metrics() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(render())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_every_counter() {
        increment_registrations();
        let text = render();
        for name in [
            "http_requests_total",
            "http_errors_total",
            "login_failures_total",
            "registrations_total",
            "investor_applications_total",
            "process_uptime_seconds",
        ] {
            assert!(text.contains(&format!("# TYPE {}", name)), "missing {}", name);
        }
    }
}
