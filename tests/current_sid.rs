// Windows-only integration tests comparing the token and lookup bindings with `whoami`
#![cfg(windows)]
#![cfg(feature = "std")]
#![allow(clippy::expect_used, reason = "Expect is not an issue in tests")]
#![allow(clippy::unwrap_used, reason = "Unwrap is not an issue in tests")]

use std::process::{Command, Stdio};

use win_advapi_security::{
    DomainAndName, GetCurrentSid, ImpersonationLevel, SecurityIdentifier, Sid, Token,
    TokenAccess, current_user_name,
    sid_lookup::{SidType, lookup_account_name},
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `DOMAIN\name` and SID of the current user as printed by `whoami /user`.
fn whoami() -> (String, SecurityIdentifier) {
    let out = Command::new("whoami")
        .args(["/user", "/fo", "csv", "/nh"])
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to launch whoami");
    assert!(
        out.status.success(),
        "whoami failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let line = String::from_utf8_lossy(&out.stdout).trim().to_owned();
    let (account, sid) = line
        .split_once(',')
        .expect("whoami prints two CSV columns");
    let sid = sid.trim_matches('"').parse().expect("whoami prints a valid SID");
    (account.trim_matches('"').to_owned(), sid)
}

fn check_current_user<T>()
where
    T: GetCurrentSid + AsRef<Sid>,
    for<'a> &'a Sid: Into<T>,
{
    init_logging();
    let (account, expected) = whoami();

    let sid = T::get_current_user_sid().expect("Failed to get current user SID");
    assert_eq!(sid.as_ref(), expected.as_sid(), "SID does not match whoami");

    let lookup = sid.as_ref().lookup_local_sid().unwrap();
    assert!(
        lookup
            .domain_name
            .to_string()
            .eq_ignore_ascii_case(&account),
        "{} does not match whoami ({account})",
        lookup.domain_name
    );
    assert_eq!(lookup.sid_type().ok(), Some(SidType::User));
}

#[test]
fn current_user_sid_and_account() {
    check_current_user::<SecurityIdentifier>();
}

#[test]
fn current_user_sid_boxed() {
    check_current_user::<Box<Sid>>();
}

#[test]
fn account_name_resolves_back_to_the_sid() {
    init_logging();
    let (account, expected) = whoami();
    let domain_name: DomainAndName = account.parse().unwrap();

    let lookup = lookup_account_name(None, &domain_name.to_account_name()).unwrap();
    assert_eq!(lookup.sid, expected);
    assert_eq!(lookup.sid_type().ok(), Some(SidType::User));
    assert!(
        lookup
            .domain
            .to_string_lossy()
            .eq_ignore_ascii_case(&domain_name.domain.to_string_lossy())
    );
}

#[test]
fn impersonating_self_keeps_the_user() {
    init_logging();
    let before = current_user_name().unwrap();
    let token = Token::current_process(TokenAccess::DUPLICATE | TokenAccess::QUERY)
        .unwrap()
        .duplicate(ImpersonationLevel::Impersonation)
        .unwrap();

    let (name, effective) = token
        .run_as(|| {
            (
                current_user_name().unwrap(),
                SecurityIdentifier::get_effective_user_sid().unwrap(),
            )
        })
        .unwrap();

    assert_eq!(name, before);
    assert_eq!(effective, SecurityIdentifier::get_current_user_sid().unwrap());
    assert!(
        Token::current_thread(TokenAccess::QUERY, true)
            .unwrap()
            .is_none()
    );
}
