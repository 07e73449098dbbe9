use pretty_assertions::assert_eq;
use template_parser::{parse, Dialect, ParseOptions, TemplateInfo};
use template_rewriter::{parse_markers, Rewriter, ValueGenerator};

fn parse_with(source: &str, attribute: &str) -> TemplateInfo {
    let options = ParseOptions {
        identity_attribute: attribute.to_string(),
    };
    parse(source, Dialect::soy(), &options).expect("template parses")
}

fn rewrite_with(source: &str, attribute: &str) -> String {
    let mut info = parse_with(source, attribute);
    let mut generator = ValueGenerator::new("_");
    Rewriter::new(attribute, "_")
        .unwrap()
        .rewrite(&mut info, &mut generator)
}

fn rewrite_id(source: &str) -> String {
    rewrite_with(source, "id")
}

#[test]
fn test_text_variable_tag() {
    assert_eq!(
        rewrite_id("<html><body>{$content}</body></html>"),
        "<html><body id=\"_0\">{$content}</body></html>"
    );
}

#[test]
fn test_self_closing_tag() {
    for source in ["<img src='{$url}' />", "<img src='{$url}'        />"] {
        assert_eq!(rewrite_id(source), "<img src='{$url}' id=\"_0\" />");
    }
}

#[test]
fn test_variable_outside_tags_untouched() {
    let source = "{$title}<html>test</html>";
    assert_eq!(rewrite_id(source), source);
}

#[test]
fn test_dotted_and_directive_expressions() {
    assert_eq!(
        rewrite_id("<html><title>{$p.title}</title></html>"),
        "<html><title id=\"_0\">{$p.title}</title></html>"
    );
    assert_eq!(
        rewrite_id("<title>{$title|escapeUri}</title>"),
        "<title id=\"_0\">{$title|escapeUri}</title>"
    );
}

#[test]
fn test_one_value_per_tag() {
    assert_eq!(
        rewrite_id("<html><body>{$content1}{$content2}</body></html>"),
        "<html><body id=\"_0\">{$content1}{$content2}</body></html>"
    );
    assert_eq!(
        rewrite_id("<html><body>{$content}{$content}</body></html>"),
        "<html><body id=\"_0\">{$content}{$content}</body></html>"
    );
}

#[test]
fn test_unclosed_siblings() {
    assert_eq!(
        rewrite_id("<html><body><p>{$content}<p>{$content}</body></html>"),
        "<html><body><p id=\"_0\">{$content}<p id=\"_1\">{$content}</body></html>"
    );
}

#[test]
fn test_attribute_and_text_variables() {
    assert_eq!(
        rewrite_id("<html><body attr='{$content1}'>{$content2}</body></html>"),
        "<html><body attr='{$content1}' id=\"_0\">{$content2}</body></html>"
    );
}

#[test]
fn test_empty_sibling_before_variable() {
    assert_eq!(
        rewrite_id("<html><body><p></p>{$content}</body></html>"),
        "<html><body id=\"_0\"><p></p>{$content}</body></html>"
    );
}

#[test]
fn test_existing_identity_kept() {
    let source = "<html><body id='content'>{$content}</body></html>";
    assert_eq!(rewrite_id(source), source);
}

#[test]
fn test_anchor_variants() {
    assert_eq!(
        rewrite_id("<a href='{$url}'></a>"),
        "<a href='{$url}' id=\"_0\"></a>"
    );
    assert_eq!(
        rewrite_id("<a href='{$url}'>{$url}</a>"),
        "<a href='{$url}' id=\"_0\">{$url}</a>"
    );
    assert_eq!(
        rewrite_id("<html>{foreach $url in $urls}<a href='{$url}'>{$url}</a>{/foreach}</html>"),
        "<html>{foreach $url in $urls}<a href='{$url}' id=\"_0\">{$url}</a>{/foreach}</html>"
    );
}

#[test]
fn test_interactive_tag_without_variable() {
    assert_eq!(
        rewrite_id("<nav><a href='/home'>Home</a></nav>"),
        "<nav><a href='/home' id=\"_0\">Home</a></nav>"
    );
}

#[test]
fn test_class_mode_emits_markers() {
    insta::assert_snapshot!(
        rewrite_with("<html><body attr='{$content1}'>{$content2}</body></html>", "class"),
        @r#"<html><!--POGEN,_0,content1,{$content1}--><!--POGEN,_0,content2,{$content2}--><body attr='{$content1}' class="_0">{$content2}</body></html>"#
    );
}

#[test]
fn test_class_mode_prepends_to_existing_value() {
    let out = rewrite_with("<p class='lead'>{$x}</p>", "class");
    assert_eq!(out, "<!--POGEN,_0,x,{$x}--><p class='_0 lead'>{$x}</p>");

    let markers = parse_markers(&out);
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].attribute_value, "_0");
    assert_eq!(markers[0].variable_name, "x");
}

#[test]
fn test_rewrite_is_idempotent() {
    for (source, attribute) in [
        ("<html><body><p>{$a}<p>{$b}</body></html>", "id"),
        ("<ul>{foreach $i in $is}<li class='row'>{$i}</li>{/foreach}</ul>", "class"),
    ] {
        let once = rewrite_with(source, attribute);
        let twice = rewrite_with(&once, attribute);
        assert_eq!(twice, once, "{attribute}: {source}");
    }
}

#[test]
fn test_offsets_refer_to_original_template() {
    let source = "<div>{$a}</div><div>{$b}</div>";
    let mut info = parse_with(source, "id");
    let offsets: Vec<usize> = info
        .variables()
        .map(|(_, variable)| usize::from(variable.offset))
        .collect();

    let mut generator = ValueGenerator::new("_");
    let out = Rewriter::new("id", "_").unwrap().rewrite(&mut info, &mut generator);
    assert_eq!(out, "<div id=\"_0\">{$a}</div><div id=\"_1\">{$b}</div>");

    let after: Vec<usize> = info
        .variables()
        .map(|(_, variable)| usize::from(variable.offset))
        .collect();
    assert_eq!(after, offsets);
    assert_eq!(&source[offsets[1]..offsets[1] + 4], "{$b}");
    assert_eq!(info.template(), source);
}

#[test]
fn test_generator_shared_across_templates() {
    let rewriter = Rewriter::new("id", "_").unwrap();
    let mut generator = ValueGenerator::new("_");

    let mut first = parse_with("<p>{$a}</p>", "id");
    let mut second = parse_with("<p>{$b}</p><p>{$c}</p>", "id");
    let first = rewriter.rewrite(&mut first, &mut generator);
    let second = rewriter.rewrite(&mut second, &mut generator);

    assert_eq!(first, "<p id=\"_0\">{$a}</p>");
    assert_eq!(second, "<p id=\"_1\">{$b}</p><p id=\"_2\">{$c}</p>");
    assert_eq!(generator.issued(), 3);
}

#[test]
fn test_empty_identity_attribute_filled() {
    assert_eq!(rewrite_id("<p id=\"\">{$x}</p>"), "<p id=\"_0\">{$x}</p>");
}

#[test]
fn test_other_dialects() {
    let mut generator = ValueGenerator::new("_");
    let rewriter = Rewriter::new("id", "_").unwrap();

    let mut ejs = parse(
        "<ul><% for (var i of items) { %><li><%= i.name %></li><% } %></ul>",
        Dialect::ejs(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        rewriter.rewrite(&mut ejs, &mut generator),
        "<ul><% for (var i of items) { %><li id=\"_0\"><%= i.name %></li><% } %></ul>"
    );

    let mut jsf = parse(
        "<h:panelGroup><span>#{user.name}</span></h:panelGroup>",
        Dialect::jsf(),
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(
        rewriter.rewrite(&mut jsf, &mut generator),
        "<h:panelGroup><span id=\"_1\">#{user.name}</span></h:panelGroup>"
    );
}

#[test]
fn test_unquoted_value_ending_in_slash() {
    assert_eq!(
        rewrite_id("<a href=/home/>{$t}</a>"),
        "<a href=/home/ id=\"_0\">{$t}</a>"
    );
    assert_eq!(
        rewrite_id("<a href=/home/ />{$t}"),
        "<a href=/home/ id=\"_0\" />{$t}"
    );
}

#[test]
fn test_value_less_identity_attribute_filled() {
    assert_eq!(rewrite_id("<p id>{$x}</p>"), "<p id=\"_0\">{$x}</p>");

    let out = rewrite_with("<p class hidden>{$x}</p>", "class");
    assert_eq!(out, "<!--POGEN,_0,x,{$x}--><p class=\"_0\" hidden>{$x}</p>");
    assert_eq!(rewrite_with(&out, "class"), out);
}

#[test]
fn test_template_code_left_untouched() {
    let source = "<% for (i=0; i<n; i++) { %><%= x %><% } %>";
    let mut info = parse(source, Dialect::ejs(), &ParseOptions::default()).unwrap();
    let mut generator = ValueGenerator::new("_");
    let out = Rewriter::new("id", "_").unwrap().rewrite(&mut info, &mut generator);
    assert_eq!(out, source);
    assert_eq!(generator.issued(), 0);
}
