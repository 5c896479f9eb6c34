use super::*;

#[test]
fn login_href_encodes_origin_path() {
    assert_eq!(login_href("/login", Some("/rooms")), "/login?redirect=%2Frooms");
    assert_eq!(
        login_href("/login", Some("/tasks?status=open")),
        "/login?redirect=%2Ftasks%3Fstatus%3Dopen"
    );
}

#[test]
fn login_href_without_origin_is_bare_login_path() {
    assert_eq!(login_href("/login", None), "/login");
}

#[test]
fn login_href_does_not_loop_back_to_login() {
    assert_eq!(login_href("/login", Some("/login?redirect=%2Frooms")), "/login");
}

#[test]
fn login_href_drops_offsite_origin() {
    assert_eq!(login_href("/login", Some("//evil.example/x")), "/login");
}

#[test]
fn login_return_target_accepts_local_paths() {
    assert_eq!(login_return_target(Some("/rooms/12")), "/rooms/12");
}

#[test]
fn login_return_target_rejects_offsite_and_missing() {
    assert_eq!(login_return_target(None), "/");
    assert_eq!(login_return_target(Some("")), "/");
    assert_eq!(login_return_target(Some("https://evil.example")), "/");
    assert_eq!(login_return_target(Some("//evil.example")), "/");
    assert_eq!(login_return_target(Some("/\\evil.example")), "/");
}

#[test]
fn path_with_query_normalizes_question_mark() {
    assert_eq!(path_with_query("/tasks", ""), "/tasks");
    assert_eq!(path_with_query("/tasks", "status=open"), "/tasks?status=open");
    assert_eq!(path_with_query("/tasks", "?status=open"), "/tasks?status=open");
    assert_eq!(path_with_query("/tasks", "?"), "/tasks");
}

#[test]
fn login_href_keeps_routes_that_merely_share_the_login_prefix() {
    assert_eq!(login_href("/login", Some("/login-audit")), "/login?redirect=%2Flogin-audit");
    assert_eq!(login_href("/login", Some("/loginfo?day=3")), "/login?redirect=%2Floginfo%3Fday%3D3");
    assert_eq!(login_href("/login", Some("/login")), "/login");
    assert_eq!(login_href("/login", Some("/login/sso")), "/login");
}
