//! Login redirect targets.
//!
//! SYSTEM CONTEXT
//! ==============
//! The route guard sends anonymous visitors to the login route with their
//! original path attached; the login page sends them back after sign-in.
//! Only same-origin absolute paths are ever followed back.

#[cfg(test)]
#[path = "redirect_test.rs"]
mod redirect_test;

use url::form_urlencoded;

pub const REDIRECT_PARAM: &str = "redirect";

/// `<login_path>?redirect=<encoded from>`, or the bare login path when there
/// is nothing worth returning to.
pub fn login_href(login_path: &str, from: Option<&str>) -> String {
    match from.filter(|path| is_safe_return_path(path) && !is_login_route(login_path, path)) {
        Some(path) => {
            let encoded: String = form_urlencoded::byte_serialize(path.as_bytes()).collect();
            format!("{login_path}?{REDIRECT_PARAM}={encoded}")
        }
        None => login_path.to_owned(),
    }
}

/// Where to go after a successful login, given the raw `redirect` query value.
pub fn login_return_target(redirect: Option<&str>) -> String {
    redirect
        .map(str::trim)
        .filter(|path| is_safe_return_path(path))
        .map_or_else(|| "/".to_owned(), str::to_owned)
}

/// Rejoin a router pathname with its query string (with or without `?`).
pub fn path_with_query(pathname: &str, search: &str) -> String {
    let query = search.trim_start_matches('?');
    if query.is_empty() { pathname.to_owned() } else { format!("{pathname}?{query}") }
}

/// `path` is the login route itself, one of its subpaths, or it with a query.
fn is_login_route(login_path: &str, path: &str) -> bool {
    path.strip_prefix(login_path)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

fn is_safe_return_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
