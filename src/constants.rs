pub mod network {
    pub const DEFAULT_API_BASE_URL: &str = "https://api.ouraring.com";
    pub const TOKEN_PATH: &str = "/oauth/token";
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const TIMEOUT_TOKEN_VERIFY_MS: u64 = 10_000;
    pub const USER_AGENT: &str = "oura-mcp/1.0";
}

pub mod oauth {
    pub const AUTHORIZATION_ENDPOINT: &str = "https://cloud.ouraring.com/oauth/authorize";
    pub const TOKEN_ENDPOINT: &str = "https://api.ouraring.com/oauth/token";
    pub const REDIRECT_PATH: &str = "/mcp/auth/callback";
    pub const DEFAULT_DEPLOYED_URL: &str = "https://oura-mcp.fastmcp.app";
    pub const PERSONAL_TOKEN_URL: &str = "https://cloud.ouraring.com/personal-access-tokens";
    pub const SCOPES: &[&str] = &[
        "email",
        "personal",
        "daily",
        "heartrate",
        "workout",
        "session",
        "tag",
        "spo2Daily",
    ];
}

pub mod env {
    pub const ACCESS_TOKEN: &str = "OURA_ACCESS_TOKEN";
    pub const REFRESH_TOKEN: &str = "OURA_REFRESH_TOKEN";
    pub const CLIENT_ID: &str = "OURA_CLIENT_ID";
    pub const CLIENT_SECRET: &str = "OURA_CLIENT_SECRET";
    pub const TOKEN_FILE: &str = "OURA_TOKEN_FILE";
    pub const API_BASE_URL: &str = "OURA_API_BASE_URL";
    pub const DEPLOYED_URL: &str = "DEPLOYED_URL";
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
}

pub mod storage {
    pub const DEFAULT_TOKEN_FILE: &str = ".oura_tokens.json";
    pub const TOKEN_FILE_MODE: u32 = 0o600;
}

pub mod pagination {
    pub const MAX_PAGES: usize = 1_000;
    pub const CURSOR_PARAM: &str = "next_token";
}

pub mod dates {
    pub const FORMAT: &str = "%Y-%m-%d";
    pub const DEFAULT_START: &str = "last week";
    pub const LAST_WEEK_DAYS: i64 = 7;
    pub const LAST_MONTH_DAYS: i64 = 30;
    pub const RECENT_WINDOW_DAYS: i64 = 7;
}
