/*
[INPUT]:  FormSpec and values already given on the command line
[OUTPUT]: FieldValues entered by the user
[POS]:    CLI interactive flow - terminal stand-in for the web form
[UPDATE]: When FormSpec fields gain new kinds or rules
*/

use anyhow::Result;
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};

use megaweb_tracker::FieldValues;
use megaweb_tracker::forms::{FieldKind, FormSpec};

pub fn prompt_fields(form: &FormSpec, prefilled: &FieldValues) -> Result<FieldValues> {
    let theme = ColorfulTheme::default();
    println!(
        "{}",
        style(format!("{} ({})", form.task_type.description(), form.task_type))
            .bold()
            .cyan()
    );

    let mut values = FieldValues::new();
    for field in &form.fields {
        let prompt = match field.kind {
            FieldKind::Text => field.label.to_string(),
            FieldKind::TextArea => format!("{} (single line)", field.label),
        };
        let initial = prefilled
            .get(field.name)
            .cloned()
            .or_else(|| field.default.clone())
            .filter(|value| !value.is_empty());

        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(!field.required);
        if let Some(initial) = initial {
            input = input.default(initial);
        }
        if field.required {
            input = input.validate_with(|value: &String| -> Result<(), &str> {
                if value.trim().is_empty() {
                    Err("this field is required")
                } else {
                    Ok(())
                }
            });
        }

        let value = input.interact_text()?;
        values.insert(field.name.to_string(), value);
    }

    // Names the form does not know are kept so validation reports them.
    for (name, value) in prefilled {
        values.entry(name.clone()).or_insert_with(|| value.clone());
    }

    Ok(values)
}
