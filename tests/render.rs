use inkdown::{parse, to_html, HtmlRenderer, RenderConfig};
use pretty_assertions::assert_eq;

#[test]
fn headings_carry_slug_ids() {
    assert_eq!(
        to_html("# Hello World"),
        "<h1 id=\"hello-world\">Hello World</h1>"
    );
}

#[test]
fn paragraphs_with_hard_breaks() {
    assert_eq!(to_html("a  \nb"), "<p>a<br />b</p>");
}

#[test]
fn unordered_list() {
    assert_eq!(to_html("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn thematic_break() {
    assert_eq!(to_html("---"), "<hr />");
}

#[test]
fn sanitized_link_renders_without_href() {
    assert_eq!(to_html("[x](javascript:alert(1))"), "<a>x</a>");
}

#[test]
fn image_attributes() {
    assert_eq!(
        to_html("![alt](/img.png)"),
        "<img src=\"/img.png\" alt=\"alt\" />"
    );
}

#[test]
fn fenced_code_keeps_language_class() {
    let html = to_html("```rust\nfn main() {}\n```");
    assert!(html.starts_with("<pre><code class=\"lang-rust\">"));
    assert!(html.contains("fn main() {}"));
    assert!(html.ends_with("</code></pre>"));
}

#[test]
fn table_alignment_flows_into_cells() {
    let html = to_html("| a |\n|:-:|\n| 1 |\n");
    assert!(html.contains("<th style=\"text-align: center;\">a</th>"));
    assert!(html.contains("<td style=\"text-align: center;\">1</td>"));
}

#[test]
fn blockquote_alert_header() {
    let html = to_html("> [!NOTE]\n> hi");
    assert!(html.contains("<header class=\"alert\">NOTE</header>"));
}

#[test]
fn task_list_checkboxes() {
    let html = to_html("- [x] done\n- [ ] todo");
    assert!(html.contains("<input type=\"checkbox\" checked disabled />"));
    assert!(html.contains("<input type=\"checkbox\" disabled />"));
}

#[test]
fn footnotes_render_reference_and_footer() {
    let html = to_html("x[^1]\n\n[^1]: note");
    assert!(html.contains("<a href=\"#footnote-1\"><sup>1</sup></a>"));
    assert!(html.ends_with("<footer><div id=\"footnote-1\"><p>note</p></div></footer>"));
}

#[test]
fn footnote_footer_can_be_disabled() {
    let doc = parse("x[^1]\n\n[^1]: note");
    let renderer = HtmlRenderer::new(
        RenderConfig::builder().footnote_footer(false).build(),
    );
    assert!(!renderer.render(&doc).contains("<footer>"));
}

#[test]
fn inline_styles_map_to_their_tags() {
    assert_eq!(
        to_html("*a* **b** ~~c~~ ==d=="),
        "<em>a</em> <strong>b</strong> <del>c</del> <mark>d</mark>"
    );
}
