//! Access control for protected views.
//!
//! [`AuthGuard`] sits in front of a view and decides, on every render, whether
//! to show a loading placeholder, send the visitor to the sign-in page, or
//! render the view for the signed-in identity.

use serde::Deserialize;

use crate::identity::Identity;
use crate::navigation::{Navigator, SIGN_IN_PATH};
use crate::session::{Session, SessionProvider};

/// Where a guarded view stands relative to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    /// The session is still resolving.
    Checking,
    /// Resolution finished with no identity.
    Unauthorized,
    /// Resolution finished with an identity.
    Authorized(Identity),
}

impl GuardState {
    /// Level-triggered classification of a session snapshot.
    pub fn from_session(session: &Session) -> Self {
        if session.loading {
            return GuardState::Checking;
        }
        Self::from_user(session.user.as_ref())
    }

    fn from_user(user: Option<&Identity>) -> Self {
        match user {
            Some(identity) => GuardState::Authorized(identity.clone()),
            None => GuardState::Unauthorized,
        }
    }
}

/// How the guard treats the session's loading flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardMode {
    /// Recompute the state from the session on every render. A session that
    /// goes back to loading puts the guard back into `Checking`.
    #[default]
    Level,
    /// Single-shot gate. The first render always shows the placeholder; the
    /// gate opens on the first render that sees `loading == false` and never
    /// closes again, so later loading phases are ignored.
    Latched,
}

/// What a render produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardView<V> {
    Loading,
    Redirect(&'static str),
    Content(V),
}

impl<V> GuardView<V> {
    pub fn is_loading(&self) -> bool {
        matches!(self, GuardView::Loading)
    }

    pub fn content(self) -> Option<V> {
        match self {
            GuardView::Content(v) => Some(v),
            _ => None,
        }
    }
}

/// Gate in front of a protected view.
///
/// The session and the navigator are injected so the guard can be driven
/// from an HTTP middleware, a test, or any other host. The guard keeps just
/// enough local state to issue the sign-in redirect once per entry into
/// [`GuardState::Unauthorized`].
pub struct AuthGuard<P, N> {
    provider: P,
    navigator: N,
    mode: GuardMode,
    state: GuardState,
    latch_closed: bool,
}

impl<P: SessionProvider, N: Navigator> AuthGuard<P, N> {
    pub fn new(provider: P, navigator: N, mode: GuardMode) -> Self {
        Self {
            provider,
            navigator,
            mode,
            state: GuardState::Checking,
            latch_closed: true,
        }
    }

    /// Runs one render pass.
    ///
    /// `child` is only invoked when the guard is authorized. In
    /// [`GuardMode::Latched`] the host is expected to render again after a
    /// pass that opened the latch, the same way a state change would
    /// trigger a re-render.
    pub fn render<V, F>(&mut self, child: F) -> GuardView<V>
    where
        F: FnOnce(&Identity) -> V,
    {
        let session = self.provider.current();
        let next = self.next_state(&session);

        let view = match &next {
            GuardState::Checking => GuardView::Loading,
            GuardState::Unauthorized => {
                if self.state != GuardState::Unauthorized {
                    tracing::info!(target_path = SIGN_IN_PATH, "No identity on session, redirecting");
                    self.navigator.replace(SIGN_IN_PATH);
                }
                GuardView::Redirect(SIGN_IN_PATH)
            }
            GuardState::Authorized(identity) => GuardView::Content(child(identity)),
        };

        if next != self.state {
            tracing::debug!(from = ?self.state, to = ?next, "Guard state changed");
        }
        self.state = next;
        view
    }

    fn next_state(&mut self, session: &Session) -> GuardState {
        match self.mode {
            GuardMode::Level => GuardState::from_session(session),
            GuardMode::Latched => {
                if self.latch_closed {
                    if !session.loading {
                        self.latch_closed = false;
                    }
                    GuardState::Checking
                } else {
                    GuardState::from_user(session.user.as_ref())
                }
            }
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn into_navigator(self) -> N {
        self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Role;
    use crate::navigation::HistoryNavigator;
    use crate::session::SessionHandle;

    fn guard(handle: &SessionHandle, mode: GuardMode) -> AuthGuard<SessionHandle, HistoryNavigator> {
        AuthGuard::new(handle.clone(), HistoryNavigator::new(), mode)
    }

    fn traveller() -> Identity {
        Identity::new("user-1", Role::Customer)
    }

    #[test]
    fn test_loading_then_anonymous_redirects_once() {
        for mode in [GuardMode::Level, GuardMode::Latched] {
            let handle = SessionHandle::new();
            let mut guard = guard(&handle, mode);
            let mut rendered_children = 0;

            assert!(guard.render(|_| rendered_children += 1).is_loading());

            handle.resolve(None);
            for _ in 0..4 {
                let view = guard.render(|_| rendered_children += 1);
                assert!(matches!(view, GuardView::Loading | GuardView::Redirect("/sign-in")));
            }

            assert_eq!(guard.state(), &GuardState::Unauthorized);
            assert_eq!(guard.navigator().redirects().collect::<Vec<_>>(), vec!["/sign-in"]);
            assert_eq!(rendered_children, 0, "mode {:?}", mode);
        }
    }

    #[test]
    fn test_loading_then_signed_in_renders_children() {
        for mode in [GuardMode::Level, GuardMode::Latched] {
            let handle = SessionHandle::new();
            let mut guard = guard(&handle, mode);

            assert!(guard.render(|id| id.id.clone()).is_loading());

            handle.resolve(Some(traveller()));
            let mut last = guard.render(|id| id.id.clone());
            if mode == GuardMode::Latched {
                assert!(last.is_loading());
                last = guard.render(|id| id.id.clone());
            }

            assert_eq!(last, GuardView::Content("user-1".to_string()));
            assert_eq!(guard.navigator().entries().len(), 0);
        }
    }

    #[test]
    fn test_rerender_with_same_state_is_idempotent() {
        let session = Session::anonymous();
        let mut guard = AuthGuard::new(&session, HistoryNavigator::new(), GuardMode::Level);

        for _ in 0..5 {
            assert_eq!(guard.render(|_| ()), GuardView::Redirect("/sign-in"));
        }
        assert_eq!(guard.navigator().redirects().count(), 1);
    }

    #[test]
    fn test_latched_shows_placeholder_before_first_redirect() {
        // Session already resolved to anonymous before the first render.
        let session = Session::anonymous();
        let mut guard = AuthGuard::new(&session, HistoryNavigator::new(), GuardMode::Latched);

        assert_eq!(guard.render(|_| ()), GuardView::Loading);
        assert_eq!(guard.navigator().entries().len(), 0);

        assert_eq!(guard.render(|_| ()), GuardView::Redirect("/sign-in"));
        assert_eq!(guard.navigator().redirects().count(), 1);
    }

    #[test]
    fn test_level_skips_placeholder_when_already_resolved() {
        let session = Session::signed_in(traveller());
        let mut guard = AuthGuard::new(&session, HistoryNavigator::new(), GuardMode::Level);

        assert_eq!(guard.render(|id| id.role), GuardView::Content(Role::Customer));
    }

    #[test]
    fn test_latched_ignores_later_loading() {
        let handle = SessionHandle::with_state(Session::signed_in(traveller()));
        let mut guard = guard(&handle, GuardMode::Latched);

        guard.render(|_| ());
        assert!(guard.render(|_| ()).content().is_some());

        handle.begin_loading();
        assert!(guard.render(|_| ()).content().is_some());
        assert!(matches!(guard.state(), GuardState::Authorized(_)));
    }

    #[test]
    fn test_level_reenters_checking_on_reload() {
        let handle = SessionHandle::with_state(Session::signed_in(traveller()));
        let mut guard = guard(&handle, GuardMode::Level);

        assert!(guard.render(|_| ()).content().is_some());

        handle.begin_loading();
        assert!(guard.render(|_| ()).is_loading());
        assert_eq!(guard.state(), &GuardState::Checking);
    }

    #[test]
    fn test_level_redirects_again_after_new_sign_out() {
        let handle = SessionHandle::new();
        let mut guard = guard(&handle, GuardMode::Level);

        handle.resolve(None);
        guard.render(|_| ());
        handle.resolve(Some(traveller()));
        guard.render(|_| ());
        handle.resolve(None);
        guard.render(|_| ());
        guard.render(|_| ());

        assert_eq!(guard.navigator().redirects().count(), 2);
    }

    #[test]
    fn test_session_never_resolving_keeps_placeholder() {
        let handle = SessionHandle::new();
        let mut guard = guard(&handle, GuardMode::Level);

        for _ in 0..10 {
            assert!(guard.render(|_| ()).is_loading());
        }
        assert!(guard.navigator().entries().is_empty());
    }

    #[test]
    fn test_guard_mode_from_config_value() {
        let mode: GuardMode = serde_json::from_str("\"latched\"").unwrap();
        assert_eq!(mode, GuardMode::Latched);
        assert_eq!(GuardMode::default(), GuardMode::Level);
    }
}
