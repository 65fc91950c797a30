//! `orbit iteration`: numbered work rounds within a session.

use clap::{Args, Subcommand};
use orbit_core::model::Iteration;
use std::io::{self, Write};

use super::Context;
use crate::output::{Renderable, format_time, pretty_kv, pretty_section, render_list, render_success};

#[derive(Subcommand, Debug)]
pub enum IterationCommand {
    /// Start iteration N.
    Start(NumberArg),
    /// Mark iteration N complete.
    Complete(NumberArg),
    /// Attach a summary and the tasks worked to iteration N.
    Summary(SummaryArgs),
    /// List iterations in start order.
    List,
}

#[derive(Args, Debug)]
pub struct NumberArg {
    pub number: u32,
}

#[derive(Args, Debug)]
pub struct SummaryArgs {
    pub number: u32,
    pub summary: String,
    /// Task worked during the iteration. Repeatable.
    #[arg(long = "task")]
    pub tasks: Vec<String>,
}

impl Renderable for Iteration {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let state = if self.complete { "complete" } else { "running" };
        pretty_section(w, &format!("Iteration {} ({state})", self.number))?;
        pretty_kv(w, "Started", format_time(self.started_at))?;
        if let Some(ended) = self.ended_at {
            pretty_kv(w, "Ended", format_time(ended))?;
        }
        if let Some(took) = self.duration() {
            pretty_kv(w, "Duration", format!("{}m", took.num_minutes()))?;
        }
        if !self.tasks_worked.is_empty() {
            pretty_kv(w, "Tasks", self.tasks_worked.join(", "))?;
        }
        if !self.summary.is_empty() {
            writeln!(w)?;
            writeln!(w, "{}", self.summary)?;
        }
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}",
            self.number,
            self.complete,
            format_time(self.started_at),
            self.tasks_worked.join(",")
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["number", "complete", "started", "tasks"]
    }
}

pub fn run_iteration(command: &IterationCommand, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store()?;
    match command {
        IterationCommand::Start(args) => {
            store.iteration_start(args.number)?;
            render_success(ctx.output, &format!("Started iteration {}", args.number))
        }
        IterationCommand::Complete(args) => {
            store.iteration_complete(args.number)?;
            render_success(ctx.output, &format!("Completed iteration {}", args.number))
        }
        IterationCommand::Summary(args) => {
            store.iteration_summary(args.number, &args.summary, args.tasks.clone())?;
            render_success(
                ctx.output,
                &format!("Recorded summary for iteration {}", args.number),
            )
        }
        IterationCommand::List => {
            render_list(&store.iteration_list()?, ctx.output, "no iterations")
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
        command: IterationCommand,
    }

    #[test]
    fn summary_collects_repeated_tasks() {
        let w = Wrapper::parse_from([
            "test", "summary", "2", "wired replay", "--task", "TSK-1", "--task", "TSK-4",
        ]);
        match w.command {
            IterationCommand::Summary(args) => {
                assert_eq!(args.number, 2);
                assert_eq!(args.tasks, vec!["TSK-1", "TSK-4"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn negative_number_is_rejected() {
        assert!(Wrapper::try_parse_from(["test", "start", "-1"]).is_err());
    }
}
