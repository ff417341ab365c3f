//! HTML rendering with embedded minijinja templates.

use cardiorisk_common::{Question, RecordTable, Selections};
use minijinja::{context, Environment};
use serde::Serialize;

use crate::form::FormView;

pub const RECORD_PAGE: &str = "render_data.html";

pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(RECORD_PAGE, include_str!("../templates/render_data.html"))?;
    Ok(env)
}

/// One radio group of the risk form.
#[derive(Debug, Serialize)]
struct QuestionField {
    name: &'static str,
    prompt: &'static str,
    marker_id: String,
    marker_visible: bool,
    selected: Option<&'static str>,
}

fn question_fields(selections: &Selections, view: &FormView) -> Vec<QuestionField> {
    Question::ALL
        .into_iter()
        .map(|q| QuestionField {
            name: q.field_name(),
            prompt: q.prompt(),
            marker_id: q.error_marker_id(),
            marker_visible: view.marker_visible(q),
            selected: selections.get(q).map(|a| if a.is_yes() { "yes" } else { "no" }),
        })
        .collect()
}

pub fn record_page(
    env: &Environment<'_>,
    record: &RecordTable,
    derived: &RecordTable,
    selections: &Selections,
    view: &FormView,
) -> Result<String, minijinja::Error> {
    env.get_template(RECORD_PAGE)?.render(context! {
        rows => record.rows(),
        derived => derived.rows(),
        questions => question_fields(selections, view),
        result_text => &view.result_text,
        result_visible => view.result_visible,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form;
    use cardiorisk_common::Answer;

    fn table() -> RecordTable {
        RecordTable::new().with_row("Name", "Anna Lee").with_row("Age", "55")
    }

    #[test]
    fn test_fresh_page_hides_markers_and_result() {
        let env = environment().unwrap();
        let html =
            record_page(&env, &table(), &RecordTable::new(), &Selections::default(), &FormView::new())
                .unwrap();

        assert!(html.contains("<td>Anna Lee</td>"));
        assert!(html.contains(r#"id="diabetesError" hidden"#));
        assert!(html.contains(r#"id="treatingHTNError" hidden"#));
        assert!(html.contains(r#"id="result" hidden"#));
    }

    #[test]
    fn test_blocked_submission_renders_markers_and_message() {
        let env = environment().unwrap();
        let selections = Selections::default().with(Question::Smoking, Answer::Yes);
        let mut view = FormView::new();
        let _ = form::validate(&table(), &selections, &mut view);

        let html = record_page(&env, &table(), &RecordTable::new(), &selections, &view).unwrap();
        assert!(html.contains(r#"id="diabetesError">"#));
        assert!(html.contains(r#"id="smokingError" hidden"#));
        assert!(html.contains(r#"value="yes" checked"#));
        assert!(html.contains("There are unanswered questions."));
        assert!(!html.contains(r#"id="result" hidden"#));
    }
}
