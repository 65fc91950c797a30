//! `orbit note`: learnings, blockers, tips and decisions.

use clap::{Args, Subcommand};
use orbit_core::model::Note;
use std::io::{self, Write};

use super::Context;
use crate::output::{Renderable, format_time, pretty_kv, render_item, render_list, render_success};

#[derive(Subcommand, Debug)]
pub enum NoteCommand {
    /// Record a new note.
    Add(AddArgs),
    /// List notes, optionally by type.
    List(ListArgs),
    /// Replace a note's content.
    Edit(EditArgs),
    /// Change a note's type.
    Retype(RetypeArgs),
    /// Delete a note.
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Note text.
    pub content: String,

    /// Note type: learning, stuck, tip, or decision.
    #[arg(short = 't', long = "type", default_value = "learning")]
    pub note_type: String,

    /// Iteration the note was written in.
    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show notes of this type.
    #[arg(short = 't', long = "type")]
    pub note_type: Option<String>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Note ID, e.g. NOT-3.
    pub id: String,
    /// Replacement text.
    pub content: String,
    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

#[derive(Args, Debug)]
pub struct RetypeArgs {
    pub id: String,
    /// New type: learning, stuck, tip, or decision.
    pub note_type: String,
    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub id: String,
    #[arg(short, long, default_value_t = 0)]
    pub iteration: u32,
}

impl Renderable for Note {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{} [{}] {}", self.id, self.note_type, self.content)?;
        pretty_kv(w, "  iteration", self.iteration.to_string())?;
        pretty_kv(w, "  updated", format_time(self.updated_at))
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(
            w,
            "{}  {}  {}  {}",
            self.id, self.note_type, self.iteration, self.content
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "type", "iteration", "content"]
    }
}

pub fn run_note(command: &NoteCommand, ctx: &Context) -> anyhow::Result<()> {
    let store = ctx.store()?;
    match command {
        NoteCommand::Add(args) => {
            let note = store.note_add(&args.content, &args.note_type, args.iteration)?;
            render_item(&note, ctx.output)
        }
        NoteCommand::List(args) => {
            let notes = store.note_list(args.note_type.as_deref())?;
            render_list(&notes, ctx.output, "no notes")
        }
        NoteCommand::Edit(args) => {
            store.note_content(&args.id, &args.content, args.iteration)?;
            render_success(ctx.output, &format!("Updated {}", args.id))
        }
        NoteCommand::Retype(args) => {
            store.note_type(&args.id, &args.note_type, args.iteration)?;
            render_success(
                ctx.output,
                &format!("Changed {} to {}", args.id, args.note_type),
            )
        }
        NoteCommand::Delete(args) => {
            store.note_delete(&args.id, args.iteration)?;
            render_success(ctx.output, &format!("Deleted {}", args.id))
        }
    }
}
