/// Sanitizes free text that other users will see (exam descriptions, student
/// queries, admin responses).
///
/// Safe inline markup such as <b> survives; <script> blocks, event-handler
/// attributes and similar are stripped. Surrounding whitespace is trimmed.
/// The result is HTML-ready: bare `&`, `<` and `>` in text come back as entities.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input.trim())
}
