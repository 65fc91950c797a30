//! `orbit session`: lifecycle and inspection of whole sessions.

use clap::{Args, Subcommand};
use orbit_core::event::Event;
use orbit_core::state::State;
use orbit_core::store::{SessionSummary, list_sessions, reset_session};
use std::io::{self, Write};

use super::Context;
use crate::output::{
    Renderable, format_time, pretty_kv, pretty_section, render_item, render_list, render_success,
};

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Mark the selected session complete.
    Complete,
    /// Clear the completion flag so work can resume.
    Restart,
    /// Permanently delete a session's history.
    Reset(ResetArgs),
    /// List every session with its progress.
    List,
    /// Print the replayed state of the selected session.
    State,
    /// Print the raw event history of the selected session.
    Events,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Session to delete. Defaults to the selected session.
    pub name: Option<String>,

    /// Required: resetting cannot be undone.
    #[arg(long)]
    pub yes: bool,
}

impl Renderable for SessionSummary {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let status = if self.complete { "complete" } else { "active" };
        let last = self
            .last_activity
            .map_or_else(|| "never".to_string(), format_time);
        writeln!(
            w,
            "{:<24} {:<9} {}/{} tasks  last {last}",
            self.name, status, self.tasks_completed, self.tasks_total
        )
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let last = self
            .last_activity
            .map_or_else(|| "-".to_string(), |at| at.to_rfc3339());
        writeln!(
            w,
            "{}  {}  {}/{}  {last}",
            self.name, self.complete, self.tasks_completed, self.tasks_total
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["name", "complete", "tasks", "last_activity"]
    }
}

impl Renderable for State {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let (done, total) = self.task_progress();
        pretty_section(w, "Session state")?;
        pretty_kv(w, "Complete", self.complete.to_string())?;
        pretty_kv(w, "Tasks", format!("{done}/{total} completed"))?;
        pretty_kv(w, "Notes", self.notes.len().to_string())?;
        pretty_kv(w, "Iterations", self.iterations.len().to_string())?;
        pretty_kv(w, "Unread", self.unread().count().to_string())?;
        pretty_kv(
            w,
            "Events",
            format!("{} applied, {} skipped", self.events_applied, self.events_skipped),
        )?;
        if let Some(at) = self.last_activity {
            pretty_kv(w, "Last", format_time(at))?;
        }
        Ok(())
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let (done, total) = self.task_progress();
        writeln!(
            w,
            "complete={} tasks={done}/{total} notes={} iterations={} unread={} applied={} skipped={}",
            self.complete,
            self.notes.len(),
            self.iterations.len(),
            self.unread().count(),
            self.events_applied,
            self.events_skipped
        )
    }
}

impl Renderable for Event {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{self}")
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{self}")
    }
}

pub fn run_session(command: &SessionCommand, ctx: &Context) -> anyhow::Result<()> {
    match command {
        SessionCommand::Complete => {
            ctx.store()?.session_complete()?;
            render_success(ctx.output, &format!("Session {} complete", ctx.session))
        }
        SessionCommand::Restart => {
            ctx.store()?.session_restart()?;
            render_success(ctx.output, &format!("Session {} restarted", ctx.session))
        }
        SessionCommand::Reset(args) => {
            let name = args.name.as_deref().unwrap_or(&ctx.session);
            if !args.yes {
                anyhow::bail!("refusing to reset session {name} without --yes");
            }
            reset_session(ctx.log(), name)?;
            render_success(ctx.output, &format!("Reset session {name}"))
        }
        SessionCommand::List => {
            let sessions = list_sessions(ctx.log(), ctx.list_timeout)?;
            render_list(&sessions, ctx.output, "no sessions")
        }
        SessionCommand::State => render_item(&ctx.store()?.load_state()?, ctx.output),
        SessionCommand::Events => {
            let events = ctx.log().replay(&ctx.session).map_err(orbit_core::StoreError::from)?;
            render_list(&events, ctx.output, "no events")
        }
    }
}
