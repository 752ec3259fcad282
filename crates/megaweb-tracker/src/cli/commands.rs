/*
[INPUT]:  Parsed Command and TrackerConfig
[OUTPUT]: Task submissions, status output and process exit code
[POS]:    CLI layer - subcommand dispatch
[UPDATE]: When adding subcommands or changing their output
*/

use anyhow::{Context, Result};
use console::style;
use megaweb_adapter::{MegaWebClient, TaskApi, TaskHandle};
use megaweb_tracker::forms::{FieldKind, FormCatalog, FormSpec};
use megaweb_tracker::{FieldValues, TaskTracker, TrackerConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use crate::cli::interactive::prompt_fields;
use crate::cli::watch::watch_until_done;
use crate::cli::{Command, SubmitArgs};

pub async fn run(command: Command, config: TrackerConfig) -> Result<ExitCode> {
    let forms = FormCatalog::new(config.forms.default_folder());

    if let Command::Forms = command {
        print_forms(&forms);
        return Ok(ExitCode::SUCCESS);
    }

    let client = MegaWebClient::with_config(config.server.client_config(), &config.server.base_url)
        .context("build Mega-Web client")?;
    let api: Arc<dyn TaskApi> = Arc::new(client);
    let mut tracker = TaskTracker::new(api, forms, config.polling.policy());

    match command {
        Command::Submit(args) => submit(&mut tracker, args).await,
        Command::Status { task_id, json } => status(&tracker, &task_id, json).await,
        Command::Watch { task_ids } => {
            for task_id in task_ids {
                tracker.track(TaskHandle::new(task_id));
            }
            Ok(watch_until_done(&mut tracker).await)
        }
        Command::Forms | Command::Init { .. } => Ok(ExitCode::SUCCESS),
    }
}

async fn submit(tracker: &mut TaskTracker, args: SubmitArgs) -> Result<ExitCode> {
    let mut values: FieldValues = args.fields.into_iter().collect();
    if args.interactive {
        values = prompt_fields(tracker.forms().get(args.task_type), &values)?;
    }

    let submitted = if args.no_watch {
        tracker.submit_only(args.task_type, &values).await
    } else {
        tracker.submit(args.task_type, &values).await
    };
    let submission = match submitted {
        Ok(submission) => submission,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(task_id = %submission.handle, "submission accepted");
    if args.no_watch {
        println!("{}", submission.handle);
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!(
        "{} {} task {}",
        style("submitted").green().bold(),
        submission.task_type.description(),
        style(&submission.handle).cyan()
    );
    Ok(watch_until_done(tracker).await)
}

async fn status(tracker: &TaskTracker, task_id: &str, json: bool) -> Result<ExitCode> {
    let handle = TaskHandle::new(task_id);
    let record = match tracker.refresh(&handle).await {
        Ok(record) => record,
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            return Ok(ExitCode::FAILURE);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        let table = tracker.table();
        print!("{}", table.lock().await.render(console::colors_enabled()));
    }
    Ok(ExitCode::SUCCESS)
}

fn print_forms(forms: &FormCatalog) {
    for form in forms.iter() {
        println!("{}", describe_form(form));
    }
}

fn describe_form(form: &FormSpec) -> String {
    let mut out = format!(
        "{} ({})\n",
        style(form.task_type).bold(),
        form.task_type.description()
    );
    let name_width = form.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
    for field in &form.fields {
        let mut notes = Vec::new();
        if field.required {
            notes.push("required".to_string());
        }
        if let Some(suffix) = field.suffix {
            notes.push(format!("must end with {suffix}"));
        }
        if field.kind == FieldKind::TextArea {
            notes.push("multi-line".to_string());
        }
        match field.default.as_deref() {
            Some("") => notes.push("default: empty".to_string()),
            Some(default) => notes.push(format!("default: {default}")),
            None => {}
        }
        out.push_str(&format!(
            "  {:<name_width$}  {}  [{}]\n",
            field.name,
            field.label,
            notes.join(", ")
        ));
    }
    out
}

pub fn load_config(path: Option<&std::path::Path>) -> Result<TrackerConfig> {
    TrackerConfig::load(path).context("load config")
}
