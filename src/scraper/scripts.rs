use crate::scraper::config::SelectorConfig;

/// Marker comments that open each snapshot script.
pub const CARDS_TAG: &str = "/* notecrawl:cards */";
pub const DETAIL_TAG: &str = "/* notecrawl:detail */";
pub const COMMENTS_TAG: &str = "/* notecrawl:comments */";

/// Builds the JavaScript snippets evaluated inside the page.
///
/// Each snapshot script reads everything it needs in one round trip and
/// returns plain JSON. Every individual read is wrapped so a missing or
/// broken element turns into `null` instead of failing the whole script.
pub struct PageScripts<'a> {
    selectors: &'a SelectorConfig,
}

impl<'a> PageScripts<'a> {
    pub fn new(selectors: &'a SelectorConfig) -> Self {
        Self { selectors }
    }

    /// Snapshot of every rendered search result card
    pub fn search_cards(&self) -> String {
        let s = self.selectors;
        let card = js_string(&s.result_card);
        let bundle = js_string(&s.bundle_marker);
        let link = js_string(&s.card_link);
        let author = js_string(&s.card_author);
        let date = js_string(&s.card_date);

        format!(
            r#"{CARDS_TAG}
            (() => {{
                {HELPERS}
                return Array.from(document.querySelectorAll({card})).map(card => ({{
                    href: attr(card, {link}, 'href'),
                    author: text(card, {author}),
                    date: text(card, {date}),
                    bundle: card.querySelector({bundle}) !== null
                }}));
            }})()
            "#
        )
    }

    /// Snapshot of the detail page fields other than comments
    pub fn detail(&self) -> String {
        let s = self.selectors;
        let slide = js_string(&s.media_slide);
        let content = js_string(&s.note_content);
        let tag = js_string(&s.tag_link);
        let date = js_string(&s.publish_date);
        let likes = js_string(&s.like_count);
        let collects = js_string(&s.collect_count);
        let comments = js_string(&s.comment_count);

        format!(
            r#"{DETAIL_TAG}
            (() => {{
                {HELPERS}
                const media = [];
                try {{
                    for (const slide of document.querySelectorAll({slide})) {{
                        const src = attr(slide, 'img', 'src');
                        if (src) media.push(src);
                    }}
                }} catch (e) {{}}
                let tags = [];
                try {{
                    tags = Array.from(document.querySelectorAll({tag}))
                        .map(el => el.innerText.trim())
                        .filter(t => t.length > 0);
                }} catch (e) {{}}
                return {{
                    media,
                    content: rawText(document, {content}),
                    tags,
                    date: text(document, {date}),
                    likes: text(document, {likes}),
                    collects: text(document, {collects}),
                    comments: text(document, {comments})
                }};
            }})()
            "#
        )
    }

    /// Snapshot of every rendered comment row, in DOM order
    pub fn comments(&self) -> String {
        let s = self.selectors;
        let rows = js_string(&format!("{} {}", s.comment_container, s.comment_item));
        let body = js_string(&s.comment_text);
        let date = js_string(&s.comment_date);
        let like = js_string(&s.comment_like);

        format!(
            r#"{COMMENTS_TAG}
            (() => {{
                {HELPERS}
                return Array.from(document.querySelectorAll({rows})).map(row => ({{
                    text: rawText(row, {body}),
                    date: text(row, {date}),
                    like: text(row, {like})
                }}));
            }})()
            "#
        )
    }

    /// True when the first match of `selector` is rendered with a non-empty box
    pub fn visibility(selector: &str) -> String {
        let selector = js_string(selector);
        format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                const style = window.getComputedStyle(el);
                if (style.display === 'none' || style.visibility === 'hidden') return false;
                const rect = el.getBoundingClientRect();
                return rect.width > 0 && rect.height > 0;
            }})()
            "#
        )
    }

    /// Scroll one container by `delta_px`, leaving the window untouched.
    /// Evaluates to false when the container is missing.
    pub fn scroll_by(selector: &str, delta_px: i64) -> String {
        let selector = js_string(selector);
        format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.scrollTop += {delta_px};
                return true;
            }})()
            "#
        )
    }

    /// Clear an input so typed text replaces its previous value
    pub fn clear_input(selector: &str) -> String {
        let selector = js_string(selector);
        format!(
            r#"
            (() => {{
                const el = document.querySelector({selector});
                if (!el) return false;
                el.value = '';
                el.focus();
                return true;
            }})()
            "#
        )
    }
}

const HELPERS: &str = r#"
                const text = (root, sel) => {
                    try {
                        const el = root.querySelector(sel);
                        return el ? el.innerText.trim() : null;
                    } catch (e) { return null; }
                };
                const rawText = (root, sel) => {
                    try {
                        const el = root.querySelector(sel);
                        return el ? el.innerText : null;
                    } catch (e) { return null; }
                };
                const attr = (root, sel, name) => {
                    try {
                        const el = root.querySelector(sel);
                        return el ? el.getAttribute(name) : null;
                    } catch (e) { return null; }
                };"#;

/// Quote a value as a JavaScript string literal
fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    serde_json::Value::String(value.to_string()).to_string()
}
