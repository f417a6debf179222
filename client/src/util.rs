use uuid::Uuid;

pub fn make_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

pub fn sanitize_color(color: &str, fallback: &str) -> String {
    let color = color.trim();
    if color.is_empty() {
        return fallback.to_string();
    }
    color.chars().take(32).collect()
}
