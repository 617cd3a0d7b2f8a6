macro_rules! v1_path {
    ($path:literal) => {
        concat!("/api/v1", $path)
    };
}

/// Versioned API route definitions
pub mod v1 {
    pub const ROOT: &str = "/api/v1";
    pub const HEALTH: &str = v1_path!("/health");

    pub mod auth {
        pub const REGISTER: &str = v1_path!("/auth/register");
        pub const TOKEN: &str = v1_path!("/auth/token");
        pub const CONFIRM: &str = v1_path!("/auth/confirm");
        pub const CONFIRM_RESEND: &str = v1_path!("/auth/confirm/resend");
        pub const PASSWORD_CHANGE: &str = v1_path!("/auth/password/change");
        pub const PASSWORD_RESET_REQUEST: &str =
            v1_path!("/auth/password/reset-request");
        pub const PASSWORD_RESET: &str = v1_path!("/auth/password/reset");
        pub const EMAIL_CHANGE_REQUEST: &str =
            v1_path!("/auth/email/change-request");
        pub const EMAIL_CHANGE: &str = v1_path!("/auth/email/change");
    }

    pub mod movies {
        pub const COLLECTION: &str = v1_path!("/movies");
        pub const SEARCH: &str = v1_path!("/movies/search");
        pub const ITEM: &str = v1_path!("/movies/{id}");
        pub const BORROW: &str = v1_path!("/movies/{id}/borrow");
        pub const RETURN: &str = v1_path!("/movies/{id}/return");
    }

    pub mod users {
        pub const CURRENT: &str = v1_path!("/users/me");
        pub const BY_USERNAME: &str = v1_path!("/users/{username}");
    }
}

/// Replace a single path parameter (e.g. `"{id}"`) with the provided value.
pub fn replace_param(route: &str, param: &str, value: impl AsRef<str>) -> String {
    route.replace(param, value.as_ref())
}

/// Append a query parameter to the provided route.
pub fn with_query(route: &str, key: &str, value: impl std::fmt::Display) -> String {
    format!("{route}?{key}={value}")
}
