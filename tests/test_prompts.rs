//! Tests for the prompt templates in config/prompts

use std::fs;

fn template(name: &str) -> String {
    fs::read_to_string(format!("config/prompts/{name}"))
        .unwrap_or_else(|e| panic!("{name} prompt file missing: {e}"))
}

#[test]
fn test_opening_prompt_template_vars() {
    let text = template("opening.md");
    assert!(text.contains("{{lead}}"), "opening.md should contain {{lead}} variable");
    assert!(text.contains("{{label}}"), "opening.md should contain {{label}} variable");
}

#[test]
fn test_follow_up_prompt_asks_for_detail() {
    assert!(template("follow_up.md").contains("深掘り"));
}

#[test]
fn test_wrap_up_prompt_closes_hearing() {
    assert!(template("wrap_up.md").contains("ヒアリング終了"));
}

#[test]
fn test_analysis_prompt_template_vars() {
    let text = template("analysis.md");
    for var in ["{{title}}", "{{label}}", "{{transcript}}"] {
        assert!(text.contains(var), "analysis.md should contain {var} variable");
    }
    for key in ["\"skills\"", "\"jobs\"", "\"desc\""] {
        assert!(text.contains(key), "analysis.md should describe the {key} key");
    }
}

#[test]
fn test_advice_prompt_template_vars() {
    let text = template("advice.md");
    assert!(text.contains("{{title}}"), "advice.md should contain {{title}} variable");
    assert!(text.contains("{{jobs}}"), "advice.md should contain {{jobs}} variable");
}
