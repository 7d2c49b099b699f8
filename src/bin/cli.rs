use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};
use study_planner::frame::{daily_load, plan_frame, subject_load};
use study_planner::{
    Difficulty, Direction, DynStore, FileStore, NewSubject, PlannerConfig, PlannerSnapshot,
    Priority, StudyPlanner, SystemClock, TaskStatus, ViewMode, export_plan_to_csv,
    import_plan_from_csv, load_state_from_json, navigate, resolve_range, save_state_to_json,
};
use tracing_subscriber::EnvFilter;

type Planner = StudyPlanner<DynStore>;

fn cell_text(av: AnyValue<'_>) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Float64(v) => format!("{v:.1}"),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(cell_text).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, value) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(value.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| -> String {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(value.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  subjects                                    List subjects\n  add <priority> <difficulty> <YYYY-MM-DD> <name...>\n                                              Add a subject and regenerate the plan\n  delete <id>                                 Delete a subject and regenerate the plan\n  plan                                        Show every scheduled task\n  view [daily|weekly|monthly] [YYYY-MM-DD]    Show the tasks in a view\n  next | prev                                 Move the current view forward/back\n  status <task_id> <status>                   Set pending|working|completed|skipped\n  stats                                       Show overall progress\n  load [subjects]                             Hours per day (or per subject)\n  save json <path>                            Write subjects and plan to a snapshot\n  open json <path>                            Replace state from a snapshot\n  export csv <path>                           Write the plan as CSV\n  import csv <path>                           Replace the plan from CSV\n  config                                      Show planner configuration\n  quit|exit                                   Exit"
    );
}

fn print_subjects(planner: &Planner) {
    if planner.subjects().is_empty() {
        println!("No subjects yet. Use 'add' to create one.");
        return;
    }
    for subject in planner.subjects() {
        println!(
            "{:<16} {:<24} priority={:<6} difficulty={:<6} exam={} ({} days)",
            subject.id,
            subject.name,
            subject.priority,
            subject.difficulty,
            subject.exam_date,
            planner.days_until_exam(subject)
        );
    }
}

fn print_frame(result: polars::prelude::PolarsResult<DataFrame>) {
    match result {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error building table: {}", e),
    }
}

fn print_view(planner: &Planner, mode: ViewMode, reference: NaiveDate) {
    let range = resolve_range(mode, reference);
    println!(
        "{} view {} .. {}",
        mode,
        range.first_day(),
        range.last_day()
    );
    let agenda = planner.agenda(mode, reference);
    if agenda.iter().all(|day| day.tasks.is_empty()) {
        println!("No study tasks scheduled for this period.");
        return;
    }
    for day in agenda {
        let marker = if day.is_today { " (today)" } else { "" };
        if day.tasks.is_empty() {
            println!("{}{}: no tasks", day.date, marker);
            continue;
        }
        println!("{}{}: total {:.1}h", day.date, marker, day.total_hours);
        for task in &day.tasks {
            let carried = task
                .original_date
                .map(|d| format!(" (rescheduled from {d})"))
                .unwrap_or_default();
            println!(
                "  {:<36} {:<20} {:>5.1}h {:<9}{}",
                task.id, task.subject_name, task.hours, task.status, carried
            );
        }
    }
}

fn print_stats(planner: &Planner) {
    let summary = planner.progress();
    println!("Overall completion : {:.1}%", summary.completion_percent());
    println!("Completed          : {}", summary.completed);
    println!("Working            : {}", summary.working);
    println!("Pending            : {}", summary.pending);
    println!("Skipped            : {}", summary.skipped);
    println!(
        "Hours done         : {:.1} of {:.1}",
        summary.completed_hours, summary.total_hours
    );
}

fn open_planner() -> Result<Planner, Box<dyn std::error::Error>> {
    let config = match std::env::var("STUDY_PLANNER_CONFIG") {
        Ok(path) => PlannerConfig::from_json_file(path)?,
        Err(_) => PlannerConfig::default(),
    };
    let store = open_store();
    Ok(StudyPlanner::open(store, config, SystemClock)?)
}

#[cfg(feature = "sqlite")]
fn open_store() -> DynStore {
    use study_planner::SqliteStore;

    if let Ok(path) = std::env::var("STUDY_PLANNER_SQLITE") {
        match SqliteStore::new(&path) {
            Ok(store) => return Box::new(store),
            Err(e) => eprintln!("Could not open sqlite store {}: {}; using files", path, e),
        }
    }
    Box::new(FileStore::new(data_dir()))
}

#[cfg(not(feature = "sqlite"))]
fn open_store() -> DynStore {
    Box::new(FileStore::new(data_dir()))
}

fn data_dir() -> String {
    std::env::var("STUDY_PLANNER_DATA_DIR").unwrap_or_else(|_| ".study-planner".to_string())
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let mut planner = match open_planner() {
        Ok(planner) => planner,
        Err(e) => {
            eprintln!("Failed to open planner: {}", e);
            std::process::exit(1);
        }
    };
    let mut view_mode = ViewMode::Daily;
    let mut view_date = planner.today();

    println!("Study Planner (CLI) - type 'help' for commands\n");
    print_subjects(&planner);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "subjects" => print_subjects(&planner),
            "add" => {
                let priority_s = parts.next();
                let difficulty_s = parts.next();
                let date_s = parts.next();
                let name = parts.collect::<Vec<_>>().join(" ");
                match (priority_s, difficulty_s, date_s) {
                    (Some(priority_s), Some(difficulty_s), Some(date_s)) if !name.is_empty() => {
                        let priority = match priority_s.parse::<Priority>() {
                            Ok(v) => v,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        let difficulty = match difficulty_s.parse::<Difficulty>() {
                            Ok(v) => v,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        let Some(exam_date) = parse_date(date_s) else {
                            println!("Invalid exam date (YYYY-MM-DD)");
                            continue;
                        };
                        let input = NewSubject::new(name, priority, difficulty, exam_date);
                        match planner.add_subject(input) {
                            Ok(subject) => println!(
                                "Added subject {} ({}). Plan now has {} tasks.",
                                subject.name,
                                subject.id,
                                planner.plan().task_count()
                            ),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: add <priority> <difficulty> <YYYY-MM-DD> <name...>"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => match planner.delete_subject(id) {
                    Ok(true) => println!(
                        "Deleted subject {}. Plan now has {} tasks.",
                        id,
                        planner.plan().task_count()
                    ),
                    Ok(false) => println!("Subject {} not found.", id),
                    Err(e) => println!("Error deleting subject: {}", e),
                },
                None => println!("Usage: delete <id>"),
            },
            "plan" => print_frame(plan_frame(planner.plan())),
            "view" => {
                for arg in parts {
                    if let Ok(mode) = arg.parse::<ViewMode>() {
                        view_mode = mode;
                    } else if let Some(date) = parse_date(arg) {
                        view_date = date;
                    } else {
                        println!("Ignoring '{}': expected a view mode or YYYY-MM-DD", arg);
                    }
                }
                print_view(&planner, view_mode, view_date);
            }
            "next" | "prev" => {
                let direction = if cmd == "next" {
                    Direction::Next
                } else {
                    Direction::Prev
                };
                view_date = navigate(view_mode, view_date, direction);
                print_view(&planner, view_mode, view_date);
            }
            "status" => {
                let task_id = parts.next();
                let status_s = parts.next();
                match (task_id, status_s) {
                    (Some(task_id), Some(status_s)) => {
                        let status = match status_s.parse::<TaskStatus>() {
                            Ok(v) => v,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        match planner.set_task_status(task_id, status) {
                            Ok(update) if !update.found => {
                                println!("Task {} not found.", task_id)
                            }
                            Ok(update) => match update.rescheduled {
                                Some(report) => println!(
                                    "Task {} marked {} ({}).",
                                    task_id,
                                    status,
                                    report.to_cli_summary()
                                ),
                                None => println!("Task {} marked {}.", task_id, status),
                            },
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: status <task_id> <pending|working|completed|skipped>"),
                }
            }
            "stats" => print_stats(&planner),
            "load" => match parts.next() {
                Some("subjects") => print_frame(subject_load(planner.plan())),
                _ => print_frame(daily_load(planner.plan())),
            },
            "config" => match serde_json::to_string_pretty(planner.config()) {
                Ok(json) => println!("{}", json),
                Err(e) => println!("Error serializing config: {}", e),
            },
            "save" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => {
                    let snapshot =
                        PlannerSnapshot::new(planner.subjects().to_vec(), planner.plan().clone());
                    match save_state_to_json(&snapshot, path) {
                        Ok(_) => println!("State saved to {}.", path),
                        Err(e) => println!("Error saving state: {}", e),
                    }
                }
                _ => println!("Usage: save json <path>"),
            },
            "open" => match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => match load_state_from_json(path) {
                    Ok(snapshot) => match planner.replace_state(snapshot.subjects, snapshot.plan) {
                        Ok(_) => {
                            println!("State loaded from {}.", path);
                            print_subjects(&planner);
                        }
                        Err(e) => println!("Error applying state: {}", e),
                    },
                    Err(e) => println!("Error loading state: {}", e),
                },
                _ => println!("Usage: open json <path>"),
            },
            "export" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => match export_plan_to_csv(planner.plan(), path) {
                    Ok(_) => println!("Plan exported to {}.", path),
                    Err(e) => println!("Error exporting plan: {}", e),
                },
                _ => println!("Usage: export csv <path>"),
            },
            "import" => match (parts.next(), parts.next()) {
                (Some("csv"), Some(path)) => match import_plan_from_csv(path) {
                    Ok(plan) => match planner.replace_plan(plan) {
                        Ok(_) => println!(
                            "Plan imported from {} ({} tasks).",
                            path,
                            planner.plan().task_count()
                        ),
                        Err(e) => println!("Error applying plan: {}", e),
                    },
                    Err(e) => println!("Error importing plan: {}", e),
                },
                _ => println!("Usage: import csv <path>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
