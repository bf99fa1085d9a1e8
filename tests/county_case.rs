use serde_json::json;
use shimmybars::{compile, render};

const TEMPLATE: &str = concat!(
    "{{#each County}}",
    "{{#if @first}}",
    "{{this}}",
    "{{else}}",
    "{{#if @last}}",
    " and {{this}}",
    "{{else}}",
    ", {{this}}",
    "{{/if}}",
    "{{/if}}",
    "{{/each}}",
);

#[test]
fn county_has_one_value() {
    let rendered = render(TEMPLATE, &json!({"County": ["Kane"]})).unwrap();
    assert_eq!(rendered, "Kane");
}

#[test]
fn county_has_two_values() {
    let rendered = render(TEMPLATE, &json!({"County": ["Kane", "Salt Lake"]})).unwrap();
    assert_eq!(rendered, "Kane and Salt Lake");
}

#[test]
fn county_has_more_than_two_values() {
    let rendered = render(TEMPLATE, &json!({"County": ["Kane", "Salt Lake", "Weber"]})).unwrap();
    assert_eq!(rendered, "Kane, Salt Lake and Weber");
}

#[test]
fn county_renders_concurrently_from_one_compile() {
    let template = compile(TEMPLATE).unwrap();
    let inputs = [
        (json!({"County": ["Kane"]}), "Kane"),
        (json!({"County": ["Kane", "Salt Lake"]}), "Kane and Salt Lake"),
        (json!({"County": ["Kane", "Salt Lake", "Weber"]}), "Kane, Salt Lake and Weber"),
        (json!({"County": []}), ""),
    ];

    std::thread::scope(|s| {
        for (data, expected) in &inputs {
            let template = &template;
            s.spawn(move || {
                for _ in 0..50 {
                    assert_eq!(template.render(data).unwrap(), *expected);
                }
            });
        }
    });
}
