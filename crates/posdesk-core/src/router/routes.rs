use std::collections::BTreeMap;
use std::fmt;

/// Where an authenticated user lands when no other destination is pending.
pub const AUTHENTICATED_LANDING: &str = "/app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteName {
    Login,
    Register,
    ProductList,
    ProductCreate,
    ProductEdit,
    ProductDetail,
    CategoryList,
    SalesList,
    Reports,
}

impl RouteName {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteName::Login => "Login",
            RouteName::Register => "Register",
            RouteName::ProductList => "ProductList",
            RouteName::ProductCreate => "ProductCreate",
            RouteName::ProductEdit => "ProductEdit",
            RouteName::ProductDetail => "ProductDetail",
            RouteName::CategoryList => "CategoryList",
            RouteName::SalesList => "SalesList",
            RouteName::Reports => "Reports",
        }
    }

    /// Screens an already signed-in user is bounced away from
    pub fn is_auth_page(&self) -> bool {
        matches!(self, RouteName::Login | RouteName::Register)
    }

    /// Path pattern of the named route, `:param` placeholders included
    pub fn pattern(&self) -> &'static str {
        ROUTES
            .iter()
            .find(|r| r.name == Some(*self))
            .map(|r| r.path)
            .unwrap_or(AUTHENTICATED_LANDING)
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static route definition.
#[derive(Debug)]
pub struct RouteRecord {
    pub path: &'static str,
    pub name: Option<RouteName>,
    pub requires_auth: bool,
    pub redirect: Option<&'static str>,
}

const fn route(path: &'static str, name: RouteName, requires_auth: bool) -> RouteRecord {
    RouteRecord {
        path,
        name: Some(name),
        requires_auth,
        redirect: None,
    }
}

const fn redirect(path: &'static str, to: &'static str, requires_auth: bool) -> RouteRecord {
    RouteRecord {
        path,
        name: None,
        requires_auth,
        redirect: Some(to),
    }
}

/// Everything under `/app` requires a session.
pub static ROUTES: &[RouteRecord] = &[
    redirect("/", "/app/products", false),
    route("/login", RouteName::Login, false),
    route("/register", RouteName::Register, false),
    redirect("/app", "/app/products", true),
    route("/app/products", RouteName::ProductList, true),
    route("/app/products/new", RouteName::ProductCreate, true),
    route("/app/products/edit/:id", RouteName::ProductEdit, true),
    route("/app/products/:id", RouteName::ProductDetail, true),
    route("/app/categories", RouteName::CategoryList, true),
    route("/app/sales", RouteName::SalesList, true),
    route("/app/reports", RouteName::Reports, true),
];

impl RouteRecord {
    /// Match a normalized path, capturing `:param` segments
    fn matches(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(self.path);
        let actual: Vec<&str> = segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            if let Some(param) = expected.strip_prefix(':') {
                params.insert(param.to_string(), got.to_string());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }

    fn static_segments(&self) -> usize {
        segments(self.path).iter().filter(|s| !s.starts_with(':')).count()
    }
}

/// Find the best record for a path. Literal segments beat parameters, so
/// `/app/products/new` never resolves to the detail route.
pub fn find(path: &str) -> Option<(&'static RouteRecord, BTreeMap<String, String>)> {
    ROUTES
        .iter()
        .filter_map(|record| record.matches(path).map(|params| (record, params)))
        .max_by_key(|(record, _)| record.static_segments())
}

pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_static_routes() {
        let (record, params) = find("/login").expect("login route");
        assert_eq!(record.name, Some(RouteName::Login));
        assert!(!record.requires_auth);
        assert!(params.is_empty());

        let (record, _) = find("/app/sales").expect("sales route");
        assert_eq!(record.name, Some(RouteName::SalesList));
        assert!(record.requires_auth);
    }

    #[test]
    fn test_literal_segment_beats_param() {
        let (record, params) = find("/app/products/new").expect("create route");
        assert_eq!(record.name, Some(RouteName::ProductCreate));
        assert!(params.is_empty());

        let (record, params) = find("/app/products/42").expect("detail route");
        assert_eq!(record.name, Some(RouteName::ProductDetail));
        assert_eq!(params.get("id").map(String::as_str), Some("42"));

        let (record, params) = find("/app/products/edit/42").expect("edit route");
        assert_eq!(record.name, Some(RouteName::ProductEdit));
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_redirect_records() {
        let (record, _) = find("/").expect("root route");
        assert_eq!(record.redirect, Some("/app/products"));
        let (record, _) = find("/app").expect("app route");
        assert_eq!(record.redirect, Some("/app/products"));
        assert!(record.requires_auth);
    }

    #[test]
    fn test_unknown_path() {
        assert!(find("/admin").is_none());
        assert!(find("/app/products/1/2").is_none());
    }

    #[test]
    fn test_pattern_lookup() {
        assert_eq!(RouteName::Login.pattern(), "/login");
        assert_eq!(RouteName::ProductEdit.pattern(), "/app/products/edit/:id");
        assert!(RouteName::Register.is_auth_page());
        assert!(!RouteName::Reports.is_auth_page());
    }
}
