/// Single-page search console served at `/`.
pub const CONSOLE_HTML: &str = include_str!("../../static/console.html");
