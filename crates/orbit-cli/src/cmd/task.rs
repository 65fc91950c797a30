//! `orbit task`: the session's work items.

use clap::{Args, Subcommand};
use orbit_core::model::{Priority, Task, TaskStatus};
use std::io::{self, Write};

use super::Context;
use crate::output::{
    Renderable, format_time, pretty_kv, pretty_section, render_item, render_list, render_success,
};

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Create a task.
    Add(AddArgs),
    /// List tasks by priority.
    List(ListArgs),
    /// Show one task.
    Show(IdArg),
    /// Move a task to a new status.
    Status(StatusArgs),
    /// Change a task's priority.
    Priority(PriorityArgs),
    /// Edit a task's title or description.
    Update(UpdateArgs),
    /// Delete a task.
    Delete(IdArg),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub title: String,

    #[arg(short, long, default_value = "")]
    pub description: String,

    /// critical, high, medium, or low.
    #[arg(short, long, default_value = "medium")]
    pub priority: Priority,

    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show tasks in this status.
    #[arg(short, long)]
    pub status: Option<TaskStatus>,
}

#[derive(Args, Debug)]
pub struct IdArg {
    /// Task ID, e.g. TSK-2.
    pub id: String,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub id: String,
    /// open, in_progress, completed, or blocked.
    pub status: TaskStatus,
    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

#[derive(Args, Debug)]
pub struct PriorityArgs {
    pub id: String,
    pub priority: Priority,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
}

impl Renderable for Task {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("{} {}", self.id, self.title))?;
        pretty_kv(w, "Status", self.status.as_str())?;
        pretty_kv(w, "Priority", self.priority.as_str())?;
        pretty_kv(w, "Iteration", self.iteration.to_string())?;
        pretty_kv(w, "Updated", format_time(self.updated_at))?;
        if !self.description.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", self.description)?;
        }
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}",
            self.id, self.status, self.priority, self.title
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "status", "priority", "title"]
    }
}

pub fn run_task(command: &TaskCommand, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store()?;
    match command {
        TaskCommand::Add(args) => {
            let task = store.task_add(&args.title, &args.description, args.priority, args.iteration)?;
            render_item(&task, ctx.output)
        }
        TaskCommand::List(args) => {
            let tasks = store.task_list(args.status)?;
            render_list(&tasks, ctx.output, "no tasks")
        }
        TaskCommand::Show(args) => render_item(&store.task_get(&args.id)?, ctx.output),
        TaskCommand::Status(args) => {
            let task = store.task_status(&args.id, args.status, args.iteration)?;
            render_item(&task, ctx.output)
        }
        TaskCommand::Priority(args) => {
            let task = store.task_priority(&args.id, args.priority)?;
            render_item(&task, ctx.output)
        }
        TaskCommand::Update(args) => {
            let task = store.task_update(
                &args.id,
                args.title.as_deref(),
                args.description.as_deref(),
            )?;
            render_item(&task, ctx.output)
        }
        TaskCommand::Delete(args) => {
            store.task_delete(&args.id)?;
            render_success(ctx.output, &format!("Deleted {}", args.id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(subcommand)]
        command: TaskCommand,
    }

    #[test]
    fn add_defaults_to_medium_priority() {
        let w = Wrapper::parse_from(["test", "add", "Write parser"]);
        match w.command {
            TaskCommand::Add(args) => {
                assert_eq!(args.priority, Priority::Medium);
                assert!(args.description.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn status_accepts_both_spellings() {
        for raw in ["in_progress", "in-progress"] {
            let w = Wrapper::parse_from(["test", "status", "TSK-1", raw]);
            assert!(matches!(
                w.command,
                TaskCommand::Status(StatusArgs {
                    status: TaskStatus::InProgress,
                    ..
                })
            ));
        }
    }

    #[test]
    fn unknown_priority_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "add", "x", "--priority", "urgent"]).is_err());
    }
}
