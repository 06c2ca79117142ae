//! catalog-render-html: Render catalog DomNode trees to HTML strings
//!
//! Produces SSR-ready HTML with data-key and data-a_ attributes so the
//! browser-side patcher can take over event delegation once it loads.

use catalog_dom::DomNode;

/// Void elements that must not have closing tags
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Render a DomNode tree to an HTML string.
pub fn render_to_html(node: &DomNode) -> String {
    let mut buf = String::with_capacity(4096);
    write_node(node, &mut buf);
    buf
}

/// Render a full HTML page with SSR content, scripts, and styles.
pub fn render_page(opts: &PageOptions) -> String {
    let body_html = render_to_html(&opts.root);

    // Extract <catalog:head> nodes for <head> injection
    let mut head_extra = String::new();
    extract_head_html(&opts.root, &mut head_extra);

    let extracted_title = extract_title(&opts.root);

    let mut html = String::with_capacity(body_html.len() + 2048);
    html.push_str("<!DOCTYPE html>\n<html lang=\"");
    html.push_str(&escape_attr(opts.lang.as_deref().unwrap_or("en")));
    html.push_str("\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\" />\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n");

    // Head-node title wins over opts.title
    if let Some(t) = &extracted_title {
        html.push_str(&format!("<title>{}</title>\n", escape_html(t)));
    } else if let Some(title) = &opts.title {
        html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }
    if let Some(desc) = &opts.description {
        html.push_str(&format!("<meta name=\"description\" content=\"{}\" />\n", escape_attr(desc)));
    }

    let head_no_title = remove_title_from_head_html(&head_extra);
    html.push_str(&head_no_title);

    if let Some(css) = &opts.inline_css {
        html.push_str(&format!("<style>{}</style>", css));
    }

    for href in &opts.styles {
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\" />", escape_attr(href)));
    }

    html.push_str("\n</head>\n<body>\n");

    // Mount point with SSR content
    let mount = opts.mount_selector.as_deref().unwrap_or("#app");
    let id = mount.trim_start_matches('#');
    html.push_str(&format!("<div id=\"{}\">{}</div>\n", escape_attr(id), body_html));

    for src in &opts.scripts {
        html.push_str(&format!("<script src=\"{}\"></script>\n", escape_attr(src)));
    }

    // Client bootstrap
    if let Some(sse_url) = &opts.sse_url {
        html.push_str("<script>\n");
        html.push_str(&format!(
            "CatalogClient.connect(\"{}\", \"{}\");\n",
            escape_js(sse_url),
            escape_js(mount)
        ));
        if let Some(wasm_url) = &opts.wasm_url {
            html.push_str(&format!("CatalogClient.loadWasm(\"{}\");\n", escape_js(wasm_url)));
        }
        html.push_str("</script>\n");
    }

    html.push_str("</body>\n</html>");
    html
}

/// Options for rendering a full HTML page.
pub struct PageOptions {
    pub root: DomNode,
    pub lang: Option<String>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
    pub inline_css: Option<String>,
    pub sse_url: Option<String>,
    pub mount_selector: Option<String>,
    pub wasm_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl PageOptions {
    /// Page options with nothing but the root node set.
    pub fn new(root: DomNode) -> Self {
        Self {
            root,
            lang: None,
            scripts: Vec::new(),
            styles: Vec::new(),
            inline_css: None,
            sse_url: None,
            mount_selector: None,
            wasm_url: None,
            title: None,
            description: None,
        }
    }
}

fn write_node(node: &DomNode, buf: &mut String) {
    // Skip head nodes from body output
    if node.is_head() {
        return;
    }

    let is_void = VOID_ELEMENTS.contains(&node.tag.as_str());

    buf.push('<');
    buf.push_str(&node.tag);

    if let Some(key) = &node.key {
        buf.push_str(" data-key=\"");
        buf.push_str(&escape_attr(key));
        buf.push('"');
    }

    if let Some(attrs) = &node.attrs {
        // Sort for deterministic output
        let mut keys: Vec<&String> = attrs.keys().collect();
        keys.sort();
        for k in keys {
            let v = &attrs[k];
            buf.push(' ');
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(v));
            buf.push('"');
        }
    }

    // Event attributes → data-a_ prefix
    if let Some(events) = &node.events {
        let mut keys: Vec<&String> = events.keys().collect();
        keys.sort();
        for k in keys {
            let v = &events[k];
            buf.push_str(" data-a_");
            buf.push_str(k);
            buf.push_str("=\"");
            buf.push_str(&escape_attr(v));
            buf.push('"');
        }
    }

    buf.push('>');

    if is_void {
        return;
    }

    if let Some(text) = &node.text {
        buf.push_str(&escape_html(text));
    }

    for child in node.children_iter() {
        write_node(child, buf);
    }

    buf.push_str("</");
    buf.push_str(&node.tag);
    buf.push('>');
}

/// Extract head-node children and render them as HTML
fn extract_head_html(node: &DomNode, buf: &mut String) {
    if node.is_head() {
        for child in node.children_iter() {
            write_node(child, buf);
        }
        return;
    }
    for child in node.children_iter() {
        extract_head_html(child, buf);
    }
}

/// Extract the text content of a <title> node inside a head node
fn extract_title(node: &DomNode) -> Option<String> {
    if node.is_head() {
        return node
            .children_iter()
            .iter()
            .find(|c| c.tag == "title")
            .and_then(|c| c.text.clone());
    }
    node.children_iter().iter().find_map(extract_title)
}

/// Remove <title>...</title> from already-rendered head HTML to avoid duplicates
fn remove_title_from_head_html(html: &str) -> String {
    let mut result = html.to_string();
    while let Some(start) = result.find("<title>") {
        if let Some(end) = result[start..].find("</title>") {
            result = format!("{}{}", &result[..start], &result[start + end + 8..]);
        } else {
            break;
        }
    }
    result
}

/// Escape text content.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value (double-quoted).
pub fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_js(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('<', "\\u003c")
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_dom::DomNode;
    use std::collections::HashMap;

    #[test]
    fn test_simple_render() {
        let node = DomNode {
            tag: "div".into(),
            key: Some("app".into()),
            attrs: Some(HashMap::from([("class".into(), "container".into())])),
            events: None,
            text: None,
            children: Some(vec![
                DomNode::text("h1", "Profiles"),
                DomNode {
                    tag: "input".into(),
                    key: Some("search".into()),
                    attrs: None,
                    events: Some(HashMap::from([("input".into(), "search_input".into())])),
                    text: None,
                    children: None,
                },
            ]),
        };

        let html = render_to_html(&node);
        assert!(html.contains("data-key=\"app\""));
        assert!(html.contains("class=\"container\""));
        assert!(html.contains("data-a_input=\"search_input\""));
        assert!(html.contains("<h1>Profiles</h1>"));
    }

    #[test]
    fn test_void_element() {
        let node = DomNode::el("img").attr("src", "a.png");
        let html = render_to_html(&node);
        assert_eq!(html, "<img src=\"a.png\">");
    }

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let node = DomNode::text("p", "<script>alert(1)</script> & co")
            .attr("title", "say \"hi\" <b>");
        let html = render_to_html(&node);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; co"));
        assert!(html.contains("title=\"say &quot;hi&quot; &lt;b&gt;\""));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_attributes_render_in_sorted_order() {
        let node = DomNode::el("a").attr("target", "_blank").attr("href", "x").attr("class", "l");
        assert_eq!(
            render_to_html(&node),
            "<a class=\"l\" href=\"x\" target=\"_blank\"></a>"
        );
    }

    #[test]
    fn test_page_uses_head_title_and_mount() {
        let root = DomNode::el("div")
            .child(DomNode::el("catalog:head").child(DomNode::text("title", "Catalog")))
            .child(DomNode::text("p", "body"));
        let mut opts = PageOptions::new(root);
        opts.title = Some("Fallback".into());
        opts.sse_url = Some("/sse".into());
        opts.mount_selector = Some("#catalog".into());

        let page = render_page(&opts);
        assert!(page.contains("<title>Catalog</title>"));
        assert!(!page.contains("Fallback"));
        assert!(page.contains("<div id=\"catalog\"><div><p>body</p></div></div>"));
        assert!(page.contains("CatalogClient.connect(\"/sse\", \"#catalog\");"));
    }
}
