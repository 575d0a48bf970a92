//! HTML report for extracted policy rules
//!
//! Values are interpolated as-is unless [`RenderOptions::escape_html`] is set.

use std::fmt::Write as _;

use serde_json::Value;

use super::{PolicyData, Rule};

/// Returned when there is nothing to report
pub const NO_DATA_HTML: &str = "<h1>No Data Found</h1>";

/// Shown for fields the rule does not carry
const MISSING: &str = "None";

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Escape `<`, `>`, `&` and quotes in every interpolated value
    pub escape_html: bool,
}

/// Display form of a field: strings as-is, anything else in its list/literal form
fn display_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => literal_text(other),
        None => MISSING.to_string(),
    }
}

/// Literal form used inside lists and maps, e.g. `['99213', 'X1']`
fn literal_text(value: &Value) -> String {
    match value {
        Value::Null => MISSING.to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(literal_text).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let entries: Vec<String> = map.iter()
                .map(|(k, v)| format!("'{}': {}", k, literal_text(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
    }
}

struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    fn field(&self, value: &Option<Value>) -> String {
        let text = display_text(value.as_ref());
        if self.options.escape_html {
            html_escape::encode_quoted_attribute(&text).into_owned()
        } else {
            text
        }
    }

    fn rule(&self, html: &mut String, rule: &Rule) {
        let _ = write!(
            html,
            r#"
        <div>
            <h2>Rule Name: {}</h2>
            <p><b>Description:</b> {}</p>
            <p><b>SQL-based implementation:</b></p>
            <pre style="background:#eee; padding:10px;">{}</pre>
            <p><b>SQL Validation:</b> {}</p>
            <p><b>Invalid Codes Found:</b> {}</p>
            <p><b>Logic Confidence:</b> {}</p>
            <p><b>Classification (Rule Type):</b> {}</p>
            <p><b>Quote:</b> <i>"{}"</i></p>
            <p><b>Quote Validation:</b> {}</p>
        </div>
        <hr>
        "#,
            self.field(&rule.rule_name),
            self.field(&rule.description),
            self.field(&rule.sql),
            self.field(&rule.sql_valid),
            self.field(&rule.invalid_codes),
            self.field(&rule.logic_confidence),
            self.field(&rule.classification),
            self.field(&rule.quote),
            self.field(&rule.quote_valid),
        );
    }

    fn document(&self, data: &PolicyData) -> String {
        let mut html = String::from("<html><body>");
        let _ = write!(html, "<h1>Policy Name: {}</h1>", self.field(&data.policy_name));
        html.push_str("<hr><h3>Rules List:</h3>");
        for rule in &data.rules {
            self.rule(&mut html, rule);
        }
        html.push_str("</body></html>");
        html
    }
}

/// Render policy data as an HTML report, values unescaped.
/// `None` is the only input without a report.
pub fn generate_html(data: Option<&PolicyData>) -> String {
    generate_html_with(data, &RenderOptions::default())
}

pub fn generate_html_with(data: Option<&PolicyData>, options: &RenderOptions) -> String {
    match data {
        Some(data) => Renderer { options: *options }.document(data),
        None => NO_DATA_HTML.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_rule(name: &str) -> Rule {
        Rule {
            rule_name: Some(json!(name)),
            description: Some(json!("Deny E/M with modifier 25 on same day")),
            sql: Some(json!("SELECT * FROM claims WHERE modifier = '25'")),
            sql_valid: Some(json!(true)),
            invalid_codes: Some(json!(["99999", "X1"])),
            logic_confidence: Some(json!("High")),
            classification: Some(json!("Modifier")),
            quote: Some(json!("Modifier 25 is not separately reimbursed")),
            quote_valid: Some(json!(false)),
        }
    }

    fn policy(name: &str, rules: Vec<Rule>) -> PolicyData {
        PolicyData { policy_name: Some(json!(name)), rules }
    }

    #[test]
    fn test_no_data() {
        assert_eq!(generate_html(None), "<h1>No Data Found</h1>");
    }

    #[test]
    fn test_nameless_objects_still_render() {
        let expected = "<html><body><h1>Policy Name: None</h1><hr><h3>Rules List:</h3></body></html>";
        for input in [r#"{"rules": []}"#, r#"{"policy_name": null}"#, r#"{"foo": 1}"#] {
            let data = PolicyData::from_json_str(input).unwrap();
            assert_eq!(generate_html(data.as_ref()), expected, "input: {}", input);
        }
        assert_eq!(generate_html(Some(&PolicyData::default())), expected);
    }

    #[test]
    fn test_document_frame() {
        assert_eq!(
            generate_html(Some(&policy("RP-035", vec![]))),
            "<html><body><h1>Policy Name: RP-035</h1><hr><h3>Rules List:</h3></body></html>"
        );
    }

    #[test]
    fn test_rule_fields_in_order() {
        let html = generate_html(Some(&policy("RP-035", vec![sample_rule("Same-day E/M")])));

        let expected_order = [
            "<h2>Rule Name: Same-day E/M</h2>",
            "<p><b>Description:</b> Deny E/M with modifier 25 on same day</p>",
            "<p><b>SQL-based implementation:</b></p>",
            "<pre style=\"background:#eee; padding:10px;\">SELECT * FROM claims WHERE modifier = '25'</pre>",
            "<p><b>SQL Validation:</b> True</p>",
            "<p><b>Invalid Codes Found:</b> ['99999', 'X1']</p>",
            "<p><b>Logic Confidence:</b> High</p>",
            "<p><b>Classification (Rule Type):</b> Modifier</p>",
            "<p><b>Quote:</b> <i>\"Modifier 25 is not separately reimbursed\"</i></p>",
            "<p><b>Quote Validation:</b> False</p>",
            "</div>",
            "<hr>",
            "</body></html>",
        ];
        let mut pos = 0;
        for piece in expected_order {
            let found = html[pos..].find(piece)
                .unwrap_or_else(|| panic!("missing or out of order: {}", piece));
            pos += found + piece.len();
        }
    }

    #[test]
    fn test_rules_in_document_order() {
        let rules = vec![sample_rule("first"), sample_rule("second"), sample_rule("third")];
        let html = generate_html(Some(&policy("P", rules)));

        let first = html.find("Rule Name: first").unwrap();
        let second = html.find("Rule Name: second").unwrap();
        let third = html.find("Rule Name: third").unwrap();
        assert!(first < second && second < third);
        assert_eq!(html.matches("<div>").count(), 3);
    }

    #[test]
    fn test_missing_fields_render_none() {
        let data = PolicyData { policy_name: None, rules: vec![Rule::default()] };
        let html = generate_html(Some(&data));

        assert!(html.contains("<h1>Policy Name: None</h1>"));
        assert!(html.contains("<h2>Rule Name: None</h2>"));
        assert!(html.contains("<p><b>SQL Validation:</b> None</p>"));
        assert!(html.contains("<i>\"None\"</i>"));
    }

    #[test]
    fn test_values_are_not_escaped() {
        let mut rule = sample_rule("<b>bold</b>");
        rule.sql = Some(json!("SELECT a FROM t WHERE x < 5 AND y > 2"));
        let html = generate_html(Some(&policy("A & B", vec![rule])));

        assert!(html.contains("<h1>Policy Name: A & B</h1>"));
        assert!(html.contains("<h2>Rule Name: <b>bold</b></h2>"));
        assert!(html.contains("WHERE x < 5 AND y > 2</pre>"));
    }

    #[test]
    fn test_escape_option() {
        let mut rule = sample_rule("<script>");
        rule.quote = Some(json!("say \"hi\""));
        let html = generate_html_with(Some(&policy("A & B", vec![rule])), &RenderOptions { escape_html: true });

        assert!(html.contains("<h1>Policy Name: A &amp; B</h1>"));
        assert!(html.contains("<h2>Rule Name: &lt;script&gt;</h2>"));
        assert!(html.contains("<i>\"say &quot;hi&quot;\"</i>"));
    }

    #[test]
    fn test_value_forms() {
        let mut rule = sample_rule("r");
        rule.logic_confidence = Some(json!(0.85));
        rule.invalid_codes = Some(json!([]));
        rule.sql_valid = Some(json!("Valid"));
        rule.description = Some(json!(12));
        rule.quote_valid = Some(json!([true, null, 3, {"code": "A1"}]));
        let html = generate_html(Some(&policy("P", vec![rule])));

        assert!(html.contains("<p><b>Logic Confidence:</b> 0.85</p>"));
        assert!(html.contains("<p><b>Invalid Codes Found:</b> []</p>"));
        assert!(html.contains("<p><b>SQL Validation:</b> Valid</p>"));
        assert!(html.contains("<p><b>Description:</b> 12</p>"));
        assert!(html.contains("<p><b>Quote Validation:</b> [True, None, 3, {'code': 'A1'}]</p>"));
    }
}
