/// Escapes user-supplied text before it is interpolated into an HTML mail body.
///
/// Every character with meaning in HTML is entity-encoded, so a display name
/// like `<b>Eve</b>` shows up literally instead of being rendered.
pub fn escape_text(input: &str) -> String {
    ammonia::clean_text(input)
}
