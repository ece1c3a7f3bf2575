use crate::identity::Role;

pub const HOME_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/sign-in";

/// Client-side navigation primitive.
pub trait Navigator {
    /// Redirect, replacing the current history entry.
    fn replace(&mut self, path: &str);

    /// Programmatic navigation that adds a history entry.
    fn push(&mut self, path: &str);
}

impl<N: Navigator + ?Sized> Navigator for &mut N {
    fn replace(&mut self, path: &str) {
        (**self).replace(path)
    }

    fn push(&mut self, path: &str) {
        (**self).push(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    Replace,
    Push,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEntry {
    pub kind: NavigationKind,
    pub path: String,
}

/// Navigator that only records what was asked of it.
#[derive(Debug, Default, Clone)]
pub struct HistoryNavigator {
    entries: Vec<NavigationEntry>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn redirects(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.kind == NavigationKind::Replace)
            .map(|e| e.path.as_str())
    }
}

impl Navigator for HistoryNavigator {
    fn replace(&mut self, path: &str) {
        self.entries.push(NavigationEntry {
            kind: NavigationKind::Replace,
            path: path.to_string(),
        });
    }

    fn push(&mut self, path: &str) {
        self.entries.push(NavigationEntry {
            kind: NavigationKind::Push,
            path: path.to_string(),
        });
    }
}

/// The buttons on the role selection page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChoice {
    Customer,
    Admin,
    Back,
}

impl RoleChoice {
    pub const ALL: [RoleChoice; 3] = [RoleChoice::Customer, RoleChoice::Admin, RoleChoice::Back];

    pub fn destination(&self) -> &'static str {
        match self {
            RoleChoice::Customer => "/auth/customer",
            RoleChoice::Admin => "/auth/admin",
            RoleChoice::Back => HOME_PATH,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoleChoice::Customer => "I'm a traveller",
            RoleChoice::Admin => "I'm an administrator",
            RoleChoice::Back => "Back",
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            RoleChoice::Customer => Some(Role::Customer),
            RoleChoice::Admin => Some(Role::Admin),
            RoleChoice::Back => None,
        }
    }

    pub fn choose<N: Navigator>(&self, navigator: &mut N) {
        navigator.push(self.destination());
    }
}
