use async_trait::async_trait;
use clipper_browser::{BrowserActions, BrowserCookie, BrowserError, Result as BrowserResult};
use clipper_core::{SessionConfig, SiteConfig};
use clipper_session::{
    AuthError, AuthState, ChallengeSignal, CredentialStore, Credentials, SessionCredential,
    SessionManager,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const HOME: &str = "https://site/";
const LOGIN: &str = "https://site/login";

/// How the fake site behaves
#[derive(Default, Clone, Copy)]
struct Behavior {
    cookies_still_valid: bool,
    login_form_present: bool,
    challenge_after_submit: bool,
    rejects_credentials: bool,
    tab_crashed: bool,
}

#[derive(Default)]
struct FakePage {
    behavior: Behavior,
    current_url: Mutex<String>,
    visited: Mutex<Vec<String>>,
    applied_cookies: Mutex<Vec<BrowserCookie>>,
    typed: Mutex<Vec<(String, String)>>,
    submitted: Mutex<bool>,
}

impl FakePage {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            ..Self::default()
        }
    }

    fn current(&self) -> String {
        self.current_url.lock().unwrap().clone()
    }

    fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

fn cookie(name: &str) -> BrowserCookie {
    BrowserCookie {
        name: name.to_string(),
        value: "v".to_string(),
        domain: ".site".to_string(),
        path: "/".to_string(),
        expires: None,
        secure: true,
        http_only: true,
    }
}

#[async_trait]
impl BrowserActions for FakePage {
    async fn navigate(&self, url: &str) -> BrowserResult<()> {
        *self.current_url.lock().unwrap() = url.to_string();
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn wait_for_navigation(&self) -> BrowserResult<()> {
        Ok(())
    }

    async fn wait_for_selector(&self, _selector: &str, _timeout_ms: u64) -> BrowserResult<()> {
        Ok(())
    }

    async fn exists(&self, selector: &str) -> BrowserResult<bool> {
        if self.behavior.tab_crashed {
            return Err(BrowserError::ChromiumError("target crashed".to_string()));
        }
        let on_login = self.current() == LOGIN;
        let submitted = *self.submitted.lock().unwrap();
        Ok(match selector {
            s if s.contains("email") => on_login && self.behavior.login_form_present,
            s if s.contains("captcha") => submitted && self.behavior.challenge_after_submit,
            _ => false,
        })
    }

    async fn type_text(&self, selector: &str, value: &str, _delay: Duration) -> BrowserResult<()> {
        self.typed
            .lock()
            .unwrap()
            .push((selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&self, _selector: &str) -> BrowserResult<()> {
        *self.submitted.lock().unwrap() = true;
        Ok(())
    }

    async fn body_text(&self) -> BrowserResult<String> {
        let logged_in_home = self.current() == HOME
            && !self.applied_cookies.lock().unwrap().is_empty()
            && self.behavior.cookies_still_valid;
        let rejected = *self.submitted.lock().unwrap() && self.behavior.rejects_credentials;

        Ok(if logged_in_home {
            "Home Find Friends Marketplace".to_string()
        } else if rejected {
            "Wrong credentials. Find your account and log in.".to_string()
        } else {
            String::new()
        })
    }

    async fn content(&self) -> BrowserResult<String> {
        Ok(String::new())
    }

    async fn scroll_height(&self) -> BrowserResult<u64> {
        Ok(0)
    }

    async fn scroll_to_bottom(&self) -> BrowserResult<()> {
        Ok(())
    }

    async fn cookies(&self) -> BrowserResult<Vec<BrowserCookie>> {
        Ok(vec![cookie("c_user"), cookie("xs")])
    }

    async fn set_cookies(&self, cookies: &[BrowserCookie]) -> BrowserResult<()> {
        self.applied_cookies
            .lock()
            .unwrap()
            .extend_from_slice(cookies);
        Ok(())
    }

    async fn close(&self) -> BrowserResult<()> {
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemoryStore {
    slot: Arc<Mutex<Option<SessionCredential>>>,
    saves: Arc<AtomicUsize>,
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn load(&self) -> clipper_session::Result<Option<SessionCredential>> {
        Ok(self.slot.lock().unwrap().clone())
    }

    async fn save(&self, credential: &SessionCredential) -> clipper_session::Result<()> {
        *self.slot.lock().unwrap() = Some(credential.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct CountingSignal {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ChallengeSignal for CountingSignal {
    async fn wait_for_resolution(&self) -> clipper_session::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn manager(store: MemoryStore, signal: CountingSignal) -> SessionManager {
    let site = SiteConfig {
        origin: "https://site".to_string(),
        home_url: HOME.to_string(),
        login_url: LOGIN.to_string(),
    };
    SessionManager::new(
        site,
        SessionConfig::default(),
        Credentials::new("crawler@example.com", "hunter2"),
        Box::new(store),
        Box::new(signal),
    )
}

fn stored(store: &MemoryStore) {
    *store.slot.lock().unwrap() = Some(SessionCredential::new(vec![cookie("c_user")]));
}

#[tokio::test(start_paused = true)]
async fn test_valid_stored_session_skips_login() {
    let store = MemoryStore::default();
    stored(&store);
    let signal = CountingSignal::default();
    let manager = manager(store.clone(), signal.clone());
    let page = FakePage::new(Behavior {
        cookies_still_valid: true,
        login_form_present: true,
        ..Behavior::default()
    });

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(manager.state(), AuthState::Authenticated);
    assert_eq!(page.visited(), vec![HOME]);
    assert!(page.typed.lock().unwrap().is_empty());
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_fresh_login_persists_new_credential() {
    let store = MemoryStore::default();
    let signal = CountingSignal::default();
    let manager = manager(store.clone(), signal.clone());
    let page = FakePage::new(Behavior {
        login_form_present: true,
        ..Behavior::default()
    });

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(manager.state(), AuthState::Authenticated);
    assert_eq!(page.visited(), vec![LOGIN]);
    let typed = page.typed.lock().unwrap().clone();
    assert_eq!(typed.len(), 2);
    assert_eq!(typed[0].1, "crawler@example.com");
    assert_eq!(typed[1].1, "hunter2");
    assert_eq!(signal.calls.load(Ordering::SeqCst), 0);

    let saved = store.slot.lock().unwrap().clone().expect("credential saved");
    let names: Vec<_> = saved.cookies.iter().map(|c| c.name.clone()).collect();
    assert_eq!(names, vec!["c_user", "xs"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_cookies_fall_back_to_login() {
    let store = MemoryStore::default();
    stored(&store);
    let manager = manager(store.clone(), CountingSignal::default());
    let page = FakePage::new(Behavior {
        cookies_still_valid: false,
        login_form_present: true,
        ..Behavior::default()
    });

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(page.visited(), vec![HOME, LOGIN]);
    assert_eq!(store.saves.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_challenge_waits_for_human_signal() {
    let signal = CountingSignal::default();
    let manager = manager(MemoryStore::default(), signal.clone());
    let page = FakePage::new(Behavior {
        login_form_present: true,
        challenge_after_submit: true,
        ..Behavior::default()
    });

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(signal.calls.load(Ordering::SeqCst), 1);
    assert_eq!(manager.state(), AuthState::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credentials_are_fatal() {
    let store = MemoryStore::default();
    let manager = manager(store.clone(), CountingSignal::default());
    let page = FakePage::new(Behavior {
        login_form_present: true,
        rejects_credentials: true,
        ..Behavior::default()
    });

    let err = manager
        .ensure_authenticated(&page)
        .await
        .expect_err("login must fail");

    assert!(matches!(err, AuthError::Rejected));
    assert!(err.is_fatal());
    assert_eq!(manager.state(), AuthState::Rejected);
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_login_controls_counts_as_authenticated() {
    let store = MemoryStore::default();
    let manager = manager(store.clone(), CountingSignal::default());
    let page = FakePage::new(Behavior::default());

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(manager.state(), AuthState::Authenticated);
    assert!(page.typed.lock().unwrap().is_empty());
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_stored_cookies_are_not_probed() {
    let store = MemoryStore::default();
    let mut expired = cookie("c_user");
    expired.expires = Some(1.0);
    *store.slot.lock().unwrap() = Some(SessionCredential::new(vec![expired]));

    let manager = manager(store, CountingSignal::default());
    let page = FakePage::new(Behavior {
        cookies_still_valid: true,
        login_form_present: true,
        ..Behavior::default()
    });

    manager.ensure_authenticated(&page).await.expect("authenticated");

    assert_eq!(page.visited(), vec![LOGIN]);
    assert!(page.applied_cookies.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_failed_control_lookup_is_not_authenticated() {
    let store = MemoryStore::default();
    let manager = manager(store.clone(), CountingSignal::default());
    let page = FakePage::new(Behavior {
        login_form_present: true,
        tab_crashed: true,
        ..Behavior::default()
    });

    let err = manager
        .ensure_authenticated(&page)
        .await
        .expect_err("a crashed tab must not count as logged in");

    assert!(matches!(err, AuthError::Browser(_)));
    assert!(!err.is_fatal());
    assert_eq!(manager.state(), AuthState::Unauthenticated);
    assert!(page.typed.lock().unwrap().is_empty());
    assert_eq!(store.saves.load(Ordering::SeqCst), 0);
}
