//! Joined-string assembly: literal text, escapes and segment stringification.

use weft_engine::{Engine, Value};

fn engine() -> Engine {
    let mut engine = Engine::new();
    weft_functions::register_all(&mut engine);
    engine
}

async fn render(input: &str) -> String {
    engine()
        .evaluate_to_string(input)
        .await
        .expect("input should evaluate")
}

#[tokio::test]
async fn test_multiple_segments_keep_source_order() {
    assert_eq!(
        render("x=@{first(createArray(7))} y=@{empty('')}").await,
        "x=7 y=true"
    );
}

#[tokio::test]
async fn test_at_escape_round_trips() {
    for tail in ["plain", "with space", "punct!.,", ""] {
        let input = format!("@@{tail}");
        assert_eq!(render(&input).await, format!("@{tail}"));
    }
}

#[tokio::test]
async fn test_lone_at_in_literal_text() {
    assert_eq!(render("mail me @ home").await, "mail me @ home");
}

#[tokio::test]
async fn test_whitespace_in_literals_is_significant() {
    assert_eq!(render("  @{toUpper('a')}  ").await, "  A  ");
    assert_eq!(render("line1\nline2").await, "line1\nline2");
}

#[tokio::test]
async fn test_array_segment_uses_bracketed_form() {
    assert_eq!(render("items: @{createArray(1,2)}").await, "items: [1, 2]");
}

#[tokio::test]
async fn test_object_segment_uses_braced_form() {
    assert_eq!(
        render("cfg=@{createObject('a',1,'b','x')}").await,
        "cfg={a=1,b=x}"
    );
}

#[tokio::test]
async fn test_null_segment_renders_marker() {
    assert_eq!(render("v=@{first(createArray())}").await, "v=<null>");
}

#[tokio::test]
async fn test_decimal_segment_drops_trailing_zeros() {
    assert_eq!(render("d=@{decimal('1.500')}").await, "d=1.5");
}

#[tokio::test]
async fn test_date_segment_formats() {
    assert_eq!(
        render("on @{formatDateTime('2024-05-17T09:30:00+01:00', '%d/%m/%Y')}").await,
        "on 17/05/2024"
    );
}

#[tokio::test]
async fn test_string_segment_is_spliced_verbatim() {
    assert_eq!(render("<@{concat('a', 'b')}>").await, "<ab>");
}

#[tokio::test]
async fn test_adjacent_enclosed_expressions() {
    assert_eq!(render("@{toUpper('a')}@{toLower('B')}").await, "Ab");
}

#[tokio::test]
async fn test_empty_input_renders_empty_string() {
    assert_eq!(render("").await, "");
}

#[tokio::test]
async fn test_macros_substitute_inside_literal_input() {
    let mut engine = engine();
    engine.register_macro("{{name}}", "@{toUpper('ada')}");
    assert_eq!(
        engine.evaluate_to_string("hello {{name}}!").await.unwrap(),
        "hello ADA!"
    );
}
