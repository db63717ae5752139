//! HTML pages and browser scripts.
//!
//! Templates and scripts are embedded at compile time via `include_str!` so
//! the binary has no external file dependencies at runtime. Pages are
//! rendered with minijinja; `.html` templates are auto-escaped.

use std::sync::OnceLock;

use axum::response::Html;
use minijinja::{context, Environment};
use tracing::error;

use crate::error::ApiError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("signup.html", include_str!("../templates/signup.html")),
    ("index.html", include_str!("../templates/index.html")),
];

/// Chat client served at `/static/js/main.js`.
pub const MAIN_JS: &str = include_str!("../assets/js/main.js");

/// Theme toggle served at `/static/js/darkmode.js`.
pub const DARKMODE_JS: &str = include_str!("../assets/js/darkmode.js");

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            if let Err(e) = env.add_template(name, source) {
                error!(template = name, error = %e, "Failed to compile template");
            }
        }
        env
    })
}

fn render(name: &str, ctx: minijinja::Value) -> Result<Html<String>, ApiError> {
    let template = environment().get_template(name)?;
    Ok(Html(template.render(ctx)?))
}

/// Login form, optionally with an error banner.
pub fn login(error: Option<&str>) -> Result<Html<String>, ApiError> {
    render("login.html", context! { error })
}

pub fn signup() -> Result<Html<String>, ApiError> {
    render("signup.html", context! {})
}

/// Main chat page for `username`.
pub fn index(username: &str) -> Result<Html<String>, ApiError> {
    render("index.html", context! { username })
}
