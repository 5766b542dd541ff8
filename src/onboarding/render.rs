//! HTML rendering for the wizard pages.
//!
//! Pages are handlebars templates; values are HTML-escaped by the engine.

use handlebars::Handlebars;
use serde::Serialize;

use super::controller::FormState;
use super::progress::Progress;
use crate::error::RenderError;

const LAYOUT_PARTIAL: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{{title}}</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; }
.shell { min-height: 100vh; display: grid; grid-template-columns: 1fr 3fr; }
aside { border-right: 1px solid #e5e7eb; padding: 1rem; }
aside nav { display: flex; flex-direction: column; gap: 1rem; }
.nav-item { display: flex; align-items: center; gap: .5rem; }
.check { width: 1rem; height: 1rem; border: 1px solid #9ca3af; border-radius: 9999px; display: inline-flex; align-items: center; justify-content: center; font-size: .7rem; }
.check.done { background: #15803d; border-color: #15803d; color: #fff; }
a { color: #374151; text-decoration: none; }
a:hover, a.active { color: #000; }
a.active { font-weight: 500; }
.disabled { color: #9ca3af; cursor: not-allowed; }
main { padding: 2rem; }
form { display: flex; flex-direction: column; gap: 2rem; max-width: 28rem; }
label { display: block; font-weight: 500; margin-bottom: .5rem; }
input { width: 100%; padding: .5rem; border: 1px solid #d1d5db; border-radius: .375rem; }
.required, .error { color: #ef4444; }
.error { font-size: .875rem; margin-top: .25rem; }
button, .button { background: #2563eb; color: #fff; border: 0; border-radius: .375rem; padding: .5rem 1rem; cursor: pointer; }
.done-page { min-height: 100vh; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 1.5rem; text-align: center; }
.badge { background: #22c55e; color: #fff; border-radius: 9999px; width: 4rem; height: 4rem; display: flex; align-items: center; justify-content: center; font-size: 2rem; }
</style>
</head>
<body>
{{> @partial-block }}
</body>
</html>"#;

const STEP_TEMPLATE: &str = r#"{{#> layout}}
<div class="shell">
  <aside>
    <nav>
      {{#each nav}}
      <div class="nav-item">
        <span class="check{{#if completed}} done{{/if}}">{{#if completed}}&#10003;{{/if}}</span>
        {{#if enabled}}
        <a href="{{href}}"{{#if active}} class="active"{{/if}}>{{label}}</a>
        {{else}}
        <span class="disabled">{{label}}</span>
        {{/if}}
      </div>
      {{/each}}
    </nav>
  </aside>
  <main>
    <form method="post" action="{{action}}">
      {{#each fields}}
      <div>
        <label for="{{name}}">{{label}}{{#if required}} <span class="required">*</span>{{/if}}</label>
        <input id="{{name}}" name="{{name}}" value="{{value}}" placeholder="{{placeholder}}">
        {{#if error}}<p class="error">{{error}}</p>{{/if}}
      </div>
      {{/each}}
      <button type="submit">Submit</button>
    </form>
  </main>
</div>
{{/layout}}"#;

const COMPLETED_TEMPLATE: &str = r#"{{#> layout}}
<div class="done-page">
  <div class="badge">&#10003;</div>
  <h1>You are ready to go!</h1>
  <p>Click the button below to start using {{product}}</p>
  <a class="button" href="{{dashboard_href}}">Go to Dashboard</a>
</div>
{{/layout}}"#;

#[derive(Serialize)]
struct NavLink {
    href: String,
    label: &'static str,
    completed: bool,
    enabled: bool,
    active: bool,
}

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'static str,
    label: &'static str,
    placeholder: &'static str,
    value: &'a str,
    error: Option<&'a str>,
    required: bool,
}

#[derive(Serialize)]
struct StepPage<'a> {
    title: String,
    action: String,
    nav: Vec<NavLink>,
    fields: Vec<FieldView<'a>>,
}

#[derive(Serialize)]
struct CompletedPage {
    title: &'static str,
    product: &'static str,
    dashboard_href: &'static str,
}

/// Renders wizard pages from form state and progress.
pub struct Renderer {
    handlebars: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        handlebars.register_partial("layout", LAYOUT_PARTIAL)?;
        handlebars.register_template_string("step", STEP_TEMPLATE)?;
        handlebars.register_template_string("completed", COMPLETED_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// A step's form page, with the navigation chrome built from `progress`.
    pub fn render_step(&self, form: &FormState, progress: &Progress) -> Result<String, RenderError> {
        let step = form.step;
        let nav = progress
            .steps()
            .iter()
            .map(|s| NavLink {
                href: s.step.path(),
                label: s.step.label(),
                completed: s.completed,
                enabled: s.enabled,
                active: s.step == step,
            })
            .collect();
        let fields = step
            .fields()
            .iter()
            .map(|f| FieldView {
                name: f.name(),
                label: f.label(),
                placeholder: f.placeholder(),
                value: form.value(*f),
                error: form.error(*f),
                required: step.completion_fields().contains(f),
            })
            .collect();

        let page = StepPage {
            title: format!("Onboarding · {}", step.label()),
            action: step.path(),
            nav,
            fields,
        };
        Ok(self.handlebars.render("step", &page)?)
    }

    /// The terminal screen.
    pub fn render_completed(&self) -> Result<String, RenderError> {
        let page = CompletedPage {
            title: "Onboarding complete",
            product: "Pursuit",
            dashboard_href: "/onboarding",
        };
        Ok(self.handlebars.render("completed", &page)?)
    }
}
